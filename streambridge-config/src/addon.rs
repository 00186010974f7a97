//! Per-install addon configuration carried in the request path.
//!
//! The token is base64url-encoded JSON: `{"serverUrl","userId","accessToken"}`.
//! Clients in the wild send it both with and without `=` padding, and some
//! use the standard alphabet, so decoding accepts all of those.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use streambridge_core::SourceCredentials;

#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonConfig {
    pub server_url: String,
    pub user_id: String,
    pub access_token: String,
}

#[derive(Debug, Error)]
pub enum AddonConfigError {
    #[error("configuration is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration is missing {0}")]
    MissingField(&'static str),
}

impl AddonConfig {
    pub fn new(
        server_url: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Decode a path token, normalizing the server URL and requiring every
    /// field to be present and non-blank.
    pub fn decode(token: &str) -> Result<Self, AddonConfigError> {
        let normalized: String = token
            .trim()
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();
        let bytes = URL_SAFE_NO_PAD.decode(normalized.as_bytes())?;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Partial {
            server_url: Option<String>,
            user_id: Option<String>,
            access_token: Option<String>,
        }

        let partial: Partial = serde_json::from_slice(&bytes)?;
        let server_url = required(partial.server_url, "serverUrl")?
            .trim_end_matches('/')
            .to_string();
        if server_url.is_empty() {
            return Err(AddonConfigError::MissingField("serverUrl"));
        }

        Ok(Self {
            server_url,
            user_id: required(partial.user_id, "userId")?,
            access_token: required(partial.access_token, "accessToken")?,
        })
    }

    /// Unpadded base64url form, as generated by the configuration page.
    pub fn encode(&self) -> Result<String, AddonConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn to_credentials(&self) -> SourceCredentials {
        SourceCredentials {
            server_url: self.server_url.clone(),
            user_id: self.user_id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AddonConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AddonConfigError::MissingField(field))
}

impl std::fmt::Debug for AddonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonConfig")
            .field("server_url", &self.server_url)
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
