use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Country code applied when the client sends none.
pub const DEFAULT_COUNTRY_CODE: &str = "+33";

/// Normalized `(phone, country_code)` pair - the only key sessions and
/// profiles are looked up by.
///
/// The fields are private: the only way to build one is through
/// [`PhoneIdentity::normalize`], so every store read and write goes through
/// the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneIdentity {
    phone: String,
    country_code: String,
}

impl PhoneIdentity {
    pub fn normalize(raw_phone: &str, raw_country_code: &str) -> Self {
        Self {
            phone: normalize_phone(raw_phone),
            country_code: normalize_country_code(raw_country_code),
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Dialable form used for SMS dispatch.
    pub fn e164(&self) -> String {
        format!("{}{}", self.country_code, self.phone)
    }

    /// Short SHA-256 digest of the identity, for log lines.
    ///
    /// Raw phone numbers never go to the logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.country_code.as_bytes());
        hasher.update(b":");
        hasher.update(self.phone.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..12].to_string()
    }
}

impl std::fmt::Display for PhoneIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id:{}", self.fingerprint())
    }
}

/// Keep only ASCII digits. Leading zeros are significant.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Trim, then make sure the code starts with `+`.
pub fn normalize_country_code(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_COUNTRY_CODE.to_string();
    }
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{}", trimmed)
    }
}
