//! Verify code action

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::domains::auth::models::{is_well_formed_code, PhoneIdentity};
use crate::kernel::ServerDeps;

/// Result of verifying a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyCodeResult {
    Verified { session_id: String },
    /// Not exactly six digits. Decided before the store is touched.
    InvalidFormat,
    SessionNotFound,
    /// The pending session was older than five minutes and has been deleted.
    SessionExpired,
    /// Only produced by verifiers that compare the stored code.
    InvalidCode,
}

pub async fn verify_code(
    identity: PhoneIdentity,
    code: &str,
    deps: &ServerDeps,
) -> Result<VerifyCodeResult> {
    if !is_well_formed_code(code) {
        return Ok(VerifyCodeResult::InvalidFormat);
    }

    let Some(session) = deps.store.find_pending_session(&identity).await? else {
        info!(identity = %identity, "No pending session");
        return Ok(VerifyCodeResult::SessionNotFound);
    };

    if session.is_code_expired(Utc::now()) {
        deps.store.delete_session(&session.id).await?;
        info!(identity = %identity, session_id = %session.id, "Pending session expired, deleted");
        return Ok(VerifyCodeResult::SessionExpired);
    }

    if !deps.verifier.accepts(&session, code) {
        warn!(identity = %identity, session_id = %session.id, "Code mismatch");
        return Ok(VerifyCodeResult::InvalidCode);
    }

    // A concurrent send_code may have replaced the session since it was read.
    if !deps.store.mark_session_verified(&session.id).await? {
        info!(
            identity = %identity,
            session_id = %session.id,
            "Session replaced before verification"
        );
        return Ok(VerifyCodeResult::SessionNotFound);
    }
    info!(identity = %identity, session_id = %session.id, "Session verified");

    Ok(VerifyCodeResult::Verified {
        session_id: session.id,
    })
}
