//! Session/profile collaborator: the external identity and credits store.
//!
//! Consulted by the pipeline's caller, never by the pipeline itself. The
//! interface is deliberately narrow: read a profile row, bump a usage
//! counter. Sign-up, sessions, and the persistence schema belong to the
//! external service.

use crate::config::ProfileStoreConfig;
use crate::error::ProfileError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Free-tier runs before a profile must upgrade.
pub const FREE_TIER_LIMIT: u32 = 3;

/// A profile row from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub credits_used: u32,
    pub is_pro: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl Profile {
    /// Free-tier policy, enforced by the caller before starting a run.
    pub fn has_free_run(&self) -> bool {
        self.is_pro || self.credits_used < FREE_TIER_LIMIT
    }
}

/// Narrow interface to the external profile/credits store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile. `None` means no row exists yet - not an error.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ProfileError>;

    /// Increment the usage counter, best-effort. Failures are logged and
    /// swallowed; a lost credit tick never fails the caller's run.
    async fn increment_credits(&self, user_id: &str);
}

/// PostgREST-style HTTP implementation of [`ProfileStore`].
#[derive(Debug)]
pub struct HttpProfileStore {
    client: Client,
    base_url: String,
    access_key: String,
}

impl HttpProfileStore {
    /// Build from configuration. Fails when the endpoint URL or access key
    /// is missing or a placeholder.
    pub fn new(config: &ProfileStoreConfig) -> Result<Self, ProfileError> {
        let base_url = config
            .resolved_url()
            .ok_or_else(|| ProfileError::Configuration {
                what: config.url_env.clone(),
            })?;
        let access_key =
            config
                .resolved_access_key()
                .ok_or_else(|| ProfileError::Configuration {
                    what: config.access_key_env.clone(),
                })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProfileError::Request {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
        })
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.access_key)
            .header("Authorization", format!("Bearer {}", self.access_key))
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ProfileError> {
        let url = format!("{}/rest/v1/profiles?id=eq.{user_id}", self.base_url);
        let response = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| ProfileError::Request {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ProfileError::Request {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ProfileError::Api {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }

        // PostgREST returns a row array; an empty array means no row yet.
        let mut rows: Vec<Profile> = serde_json::from_str(&body)?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn increment_credits(&self, user_id: &str) {
        let url = format!("{}/rest/v1/rpc/increment_credits", self.base_url);
        let result = self
            .authed(self.client.post(&url))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(user_id, "credit recorded");
            }
            Ok(response) => {
                warn!(
                    user_id,
                    status = response.status().as_u16(),
                    "failed to record credit"
                );
            }
            Err(e) => {
                warn!(user_id, error = %e, "failed to record credit");
            }
        }
    }
}
