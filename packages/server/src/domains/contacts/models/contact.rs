use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ContactId, ProfileId};
use crate::domains::profile::models::Profile;

/// Directed edge "`user_id` has `contact_id` in their contacts".
///
/// Display fields are copied from the contact's profile when the edge is
/// created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: ProfileId,
    pub contact_id: ProfileId,
    pub name: String,
    pub phone: String,
    pub country_code: String,
    pub added_at: DateTime<Utc>,
}

/// A contact as its owner sees it. `user_id` is the contact's profile id,
/// which is what chat channels are keyed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactView {
    pub id: ContactId,
    pub user_id: ProfileId,
    pub name: String,
    pub phone: String,
    pub country_code: String,
    pub added_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(owner: &Profile, contact: &Profile, now: DateTime<Utc>) -> Self {
        Self {
            id: ContactId::new(),
            user_id: owner.id,
            contact_id: contact.id,
            name: contact.display_name(),
            phone: contact.phone.clone(),
            country_code: contact.country_code.clone(),
            added_at: now,
        }
    }

    pub fn view(&self) -> ContactView {
        ContactView {
            id: self.id,
            user_id: self.contact_id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            country_code: self.country_code.clone(),
            added_at: self.added_at,
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Contact {
    pub async fn find(user_id: ProfileId, contact_id: ProfileId, pool: &PgPool) -> Result<Option<Self>> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE user_id = $1 AND contact_id = $2",
        )
        .bind(user_id)
        .bind(contact_id)
        .fetch_optional(pool)
        .await?;
        Ok(contact)
    }

    /// Insert the edge, or return the one already stored for the pair.
    pub async fn insert_or_existing(&self, pool: &PgPool) -> Result<Self> {
        let inserted = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, user_id, contact_id, name, phone, country_code, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, contact_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.contact_id)
        .bind(&self.name)
        .bind(&self.phone)
        .bind(&self.country_code)
        .bind(self.added_at)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(contact) => Ok(contact),
            None => Self::find(self.user_id, self.contact_id, pool)
                .await?
                .ok_or_else(|| anyhow::anyhow!("contact edge vanished after conflict")),
        }
    }

    pub async fn find_for_user(user_id: ProfileId, pool: &PgPool) -> Result<Vec<Self>> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE user_id = $1 ORDER BY added_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(contacts)
    }
}
