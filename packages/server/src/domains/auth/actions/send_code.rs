//! Send verification code action

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::domains::auth::models::{generate_verification_code, PhoneIdentity, Session};
use crate::kernel::ServerDeps;

/// Result of starting a verification
pub struct CodeSent {
    pub session_id: String,
}

/// Start verification for `identity`.
///
/// Replaces any session the identity already had (pending or verified),
/// then hands the new code to the configured verifier. If the code cannot be
/// delivered the new session is removed again.
pub async fn send_code(identity: PhoneIdentity, deps: &ServerDeps) -> Result<CodeSent> {
    let code = generate_verification_code();
    let session = Session::new_pending(&identity, code, Utc::now());

    deps.store.replace_session(&session).await?;
    if let Err(e) = deps
        .verifier
        .dispatch(&identity, &session.verification_code)
        .await
    {
        warn!(
            identity = %identity,
            session_id = %session.id,
            error = %e,
            "Code dispatch failed"
        );
        if let Err(cleanup) = deps.store.delete_session(&session.id).await {
            warn!(
                session_id = %session.id,
                error = %cleanup,
                "Failed to remove undelivered session"
            );
        }
        return Err(e);
    }

    info!(
        identity = %identity,
        session_id = %session.id,
        verifier = deps.verifier.name(),
        "Verification code issued"
    );

    Ok(CodeSent {
        session_id: session.id,
    })
}
