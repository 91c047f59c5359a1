use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::PhoneIdentity;

/// How long a pending code can be redeemed.
pub const CODE_TTL_MINUTES: i64 = 5;

/// How long a verified session stays usable, counted from creation.
pub const VERIFIED_TTL_HOURS: i64 = 24;

/// Verification session for one identity.
///
/// `PENDING` while `is_verified` is false, `VERIFIED` afterwards. Expiry is
/// never stored; it is derived from the timestamps at read time and the row
/// is deleted by whichever check observes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub phone: String,
    pub country_code: String,
    pub verification_code: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Fresh pending session with `expires_at = now + 5 min`.
    pub fn new_pending(identity: &PhoneIdentity, verification_code: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            phone: identity.phone().to_string(),
            country_code: identity.country_code().to_string(),
            verification_code,
            is_verified: false,
            created_at: now,
            expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
        }
    }

    pub fn identity(&self) -> PhoneIdentity {
        PhoneIdentity::normalize(&self.phone, &self.country_code)
    }

    pub fn is_code_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_verified_window_over(&self, now: DateTime<Utc>) -> bool {
        now > self.created_at + Duration::hours(VERIFIED_TTL_HOURS)
    }
}

/// Uniform 6-digit code, leading zeros allowed.
pub fn generate_verification_code() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", value)
}

/// Exactly six ASCII decimal digits.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Session {
    /// Store this session as the only one for its identity.
    ///
    /// Single statement against the `(phone, country_code)` unique index, so
    /// two concurrent "send code" requests cannot leave two rows behind.
    pub async fn replace_for_identity(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, phone, country_code, verification_code, is_verified, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (phone, country_code) DO UPDATE SET
                id = EXCLUDED.id,
                verification_code = EXCLUDED.verification_code,
                is_verified = EXCLUDED.is_verified,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&self.id)
        .bind(&self.phone)
        .bind(&self.country_code)
        .bind(&self.verification_code)
        .bind(self.is_verified)
        .bind(self.created_at)
        .bind(self.expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_pending(identity: &PhoneIdentity, pool: &PgPool) -> Result<Option<Self>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE phone = $1 AND country_code = $2 AND is_verified = false",
        )
        .bind(identity.phone())
        .bind(identity.country_code())
        .fetch_optional(pool)
        .await?;
        Ok(session)
    }

    pub async fn find_verified(id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE id = $1 AND is_verified = true",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(session)
    }

    /// Returns false if no pending row with this id was left to update.
    pub async fn mark_verified(id: &str, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET is_verified = true WHERE id = $1 AND is_verified = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(id: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
