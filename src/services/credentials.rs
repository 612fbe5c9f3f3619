use crate::constants::{env as env_keys, network};
use crate::errors::NodeError;
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Bot credentials: API base URL plus the bot token that scopes every path.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramCredentials {
    #[serde(default = "default_base_url")]
    base_url: String,
    access_token: String,
}

fn default_base_url() -> String {
    network::DEFAULT_API_BASE_URL.to_string()
}

impl TelegramCredentials {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, NodeError> {
        let creds = Self {
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
        };
        creds.validate()
    }

    pub fn from_env() -> Result<Self, NodeError> {
        let token = std::env::var(env_keys::ACCESS_TOKEN).map_err(|_| {
            NodeError::configuration("Telegram access token is not configured").with_hint(
                format!(
                    "Set {} or pass credentials with the execution.",
                    env_keys::ACCESS_TOKEN
                ),
            )
        })?;
        let base_url = std::env::var(env_keys::API_BASE_URL)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(default_base_url);
        Self::new(&base_url, &token)
    }

    /// Normalises the base URL and rejects empty tokens or non-http schemes.
    pub fn validate(mut self) -> Result<Self, NodeError> {
        self.access_token = self.access_token.trim().to_string();
        if self.access_token.is_empty() {
            return Err(NodeError::configuration(
                "Telegram access token must be a non-empty string",
            ));
        }
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&trimmed).map_err(|err| {
            NodeError::configuration(format!("Invalid Telegram base URL: {}", err))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NodeError::configuration(format!(
                "Telegram base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }
        self.base_url = trimmed;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bot_url(&self, endpoint: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.access_token, endpoint)
    }

    pub fn file_url(&self, file_path: &str) -> String {
        format!(
            "{}/file/bot{}/{}",
            self.base_url,
            self.access_token,
            file_path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .finish()
    }
}
