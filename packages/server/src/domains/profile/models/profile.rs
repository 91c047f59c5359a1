use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ProfileId;
use crate::domains::auth::models::PhoneIdentity;

/// Profile - the durable user record, one per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub phone: String,
    pub country_code: String,
    pub first_name: String,
    pub last_name: String,

    // Optional demographics
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub occupation: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
    pub profile_photo: Option<String>,

    pub has_completed_tutorial: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when a profile is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// Partial update. `None` (absent or null) leaves the stored value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub has_completed_tutorial: Option<bool>,
}

/// What other users get to see when they look someone up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub country_code: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_photo: Option<String>,
}

impl Profile {
    pub fn new(identity: &PhoneIdentity, fields: NewProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: ProfileId::new(),
            phone: identity.phone().to_string(),
            country_code: identity.country_code().to_string(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            date_of_birth: fields.date_of_birth,
            gender: fields.gender,
            city: fields.city,
            country: fields.country,
            occupation: fields.occupation,
            language: fields.language,
            currency: fields.currency,
            profile_photo: fields.profile_photo,
            has_completed_tutorial: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn identity(&self) -> PhoneIdentity {
        PhoneIdentity::normalize(&self.phone, &self.country_code)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Merge the provided fields and stamp `updated_at`.
    pub fn apply(&mut self, changes: ProfileChanges, now: DateTime<Utc>) {
        fn merge<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        merge(&mut self.first_name, changes.first_name);
        merge(&mut self.last_name, changes.last_name);
        merge_opt(&mut self.date_of_birth, changes.date_of_birth);
        merge_opt(&mut self.gender, changes.gender);
        merge_opt(&mut self.city, changes.city);
        merge_opt(&mut self.country, changes.country);
        merge_opt(&mut self.occupation, changes.occupation);
        merge_opt(&mut self.language, changes.language);
        merge_opt(&mut self.currency, changes.currency);
        merge_opt(&mut self.profile_photo, changes.profile_photo);
        merge(&mut self.has_completed_tutorial, changes.has_completed_tutorial);
        self.updated_at = now;
    }

    pub fn public_view(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            country_code: self.country_code.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            profile_photo: self.profile_photo.clone(),
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Profile {
    pub async fn find_by_identity(identity: &PhoneIdentity, pool: &PgPool) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE phone = $1 AND country_code = $2",
        )
        .bind(identity.phone())
        .bind(identity.country_code())
        .fetch_optional(pool)
        .await?;
        Ok(profile)
    }

    /// Insert unless the identity already has a profile.
    ///
    /// Returns `None` when the unique `(phone, country_code)` index rejected
    /// the row.
    pub async fn insert(&self, pool: &PgPool) -> Result<Option<Self>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (
                id, phone, country_code, first_name, last_name, date_of_birth, gender,
                city, country, occupation, language, currency, profile_photo,
                has_completed_tutorial, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (phone, country_code) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.phone)
        .bind(&self.country_code)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.date_of_birth)
        .bind(&self.gender)
        .bind(&self.city)
        .bind(&self.country)
        .bind(&self.occupation)
        .bind(&self.language)
        .bind(&self.currency)
        .bind(&self.profile_photo)
        .bind(self.has_completed_tutorial)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_optional(pool)
        .await?;
        Ok(profile)
    }

    pub async fn update(&self, pool: &PgPool) -> Result<Self> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                first_name = $2,
                last_name = $3,
                date_of_birth = $4,
                gender = $5,
                city = $6,
                country = $7,
                occupation = $8,
                language = $9,
                currency = $10,
                profile_photo = $11,
                has_completed_tutorial = $12,
                updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.date_of_birth)
        .bind(&self.gender)
        .bind(&self.city)
        .bind(&self.country)
        .bind(&self.occupation)
        .bind(&self.language)
        .bind(&self.currency)
        .bind(&self.profile_photo)
        .bind(self.has_completed_tutorial)
        .bind(self.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(profile)
    }
}
