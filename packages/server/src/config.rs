use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// How verification codes are delivered and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationMode {
    /// No SMS; any well-formed code is accepted.
    #[default]
    Simulated,
    /// Codes go out over Twilio and must match.
    Sms,
}

impl FromStr for VerificationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "simulated" => Ok(Self::Simulated),
            "sms" => Ok(Self::Sms),
            other => bail!("unknown VERIFICATION_MODE '{}' (expected simulated or sms)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub verification_mode: VerificationMode,
    /// Present whenever `verification_mode` is `Sms`.
    pub twilio: Option<TwilioConfig>,
    pub stream_api_key: String,
    pub stream_api_secret: String,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let verification_mode: VerificationMode = env::var("VERIFICATION_MODE")
            .unwrap_or_default()
            .parse()?;

        let twilio = match verification_mode {
            VerificationMode::Simulated => None,
            VerificationMode::Sms => Some(TwilioConfig {
                account_sid: env::var("TWILIO_ACCOUNT_SID")
                    .context("TWILIO_ACCOUNT_SID must be set when VERIFICATION_MODE=sms")?,
                auth_token: env::var("TWILIO_AUTH_TOKEN")
                    .context("TWILIO_AUTH_TOKEN must be set when VERIFICATION_MODE=sms")?,
                from_number: env::var("TWILIO_FROM_NUMBER")
                    .context("TWILIO_FROM_NUMBER must be set when VERIFICATION_MODE=sms")?,
            }),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            verification_mode,
            twilio,
            stream_api_key: env::var("STREAM_API_KEY").context("STREAM_API_KEY must be set")?,
            stream_api_secret: env::var("STREAM_API_SECRET")
                .context("STREAM_API_SECRET must be set")?,
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            rate_limit_per_second: env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("RATE_LIMIT_PER_SECOND must be a valid number")?,
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("RATE_LIMIT_BURST must be a valid number")?,
        })
    }
}

/// Comma-separated list; `*` or nothing means any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if origins.iter().any(|o| o == "*") {
        return Vec::new();
    }
    origins
}
