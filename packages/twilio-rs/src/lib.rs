// Minimal Twilio REST client: programmable SMS only.

use std::collections::HashMap;

pub mod models;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::models::{ApiErrorBody, MessageResponse};

const DEFAULT_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("request to Twilio failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Twilio returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Twilio rejected message {sid}: {message}")]
    Rejected { sid: String, message: String },
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 form, or a messaging service SID (`MG...`).
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
    base_url: String,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (local mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a plain SMS to `recipient` (E.164).
    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse, TwilioError> {
        let url = format!(
            "{base}/Accounts/{sid}/Messages.json",
            base = self.base_url,
            sid = self.options.account_sid
        );

        let sender_key = if self.options.from.starts_with("MG") {
            "MessagingServiceSid"
        } else {
            "From"
        };

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert(sender_key, &self.options.from);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or(raw);
            error!(status = status.as_u16(), %message, "Twilio returned an error");
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let message = response.json::<MessageResponse>().await?;
        if message.status == "failed" || message.status == "undelivered" {
            return Err(TwilioError::Rejected {
                sid: message.sid,
                message: message
                    .error_message
                    .unwrap_or_else(|| "message was not accepted".to_string()),
            });
        }

        info!(sid = %message.sid, status = %message.status, "SMS queued");
        Ok(message)
    }
}
