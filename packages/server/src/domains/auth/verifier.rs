//! Code verification strategies.
//!
//! The session manager never decides how a code reaches the user or whether
//! the submitted value has to match; it asks the configured [`CodeVerifier`].

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use super::models::{PhoneIdentity, Session};
use crate::kernel::BaseSmsService;

#[async_trait]
pub trait CodeVerifier: Send + Sync {
    /// Deliver `code` to the owner of `identity`.
    async fn dispatch(&self, identity: &PhoneIdentity, code: &str) -> Result<()>;

    /// Whether `submitted` (already known to be 6 digits) redeems `session`.
    fn accepts(&self, session: &Session, submitted: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Demo behavior: nothing is sent and any well-formed code is accepted.
pub struct SimulatedVerifier;

#[async_trait]
impl CodeVerifier for SimulatedVerifier {
    async fn dispatch(&self, identity: &PhoneIdentity, code: &str) -> Result<()> {
        debug!(identity = %identity, code, "Simulated SMS, nothing sent");
        Ok(())
    }

    fn accepts(&self, _session: &Session, _submitted: &str) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

/// Sends the code by SMS and requires the exact stored code back.
pub struct RealVerifier {
    sms: Arc<dyn BaseSmsService>,
}

impl RealVerifier {
    pub fn new(sms: Arc<dyn BaseSmsService>) -> Self {
        Self { sms }
    }
}

#[async_trait]
impl CodeVerifier for RealVerifier {
    async fn dispatch(&self, identity: &PhoneIdentity, code: &str) -> Result<()> {
        let body = format!("Votre code de vérification est {}", code);
        self.sms.send_sms(&identity.e164(), &body).await?;
        info!(identity = %identity, "Verification SMS dispatched");
        Ok(())
    }

    fn accepts(&self, session: &Session, submitted: &str) -> bool {
        session.verification_code == submitted
    }

    fn name(&self) -> &'static str {
        "sms"
    }
}
