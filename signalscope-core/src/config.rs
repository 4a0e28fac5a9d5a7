//! Configuration system for Signalscope.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment. Configuration is loaded from
//! `~/.config/signalscope/config.toml` and/or `signalscope.toml` in the
//! working directory, with `SIGNALSCOPE_`-prefixed environment variables on
//! top (double underscore splits nesting, e.g. `SIGNALSCOPE_LLM__MODEL`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The placeholder value shipped in config templates. Treated the same as a
/// missing credential: it means setup never happened.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub profile_store: ProfileStoreConfig,
}

/// Configuration for the generative-text backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Explicit API key. Usually left unset in favor of `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model identifier passed to the backend.
    pub model: String,
    /// Override for the backend base URL (tests point this at a stub server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum output tokens per call.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
            timeout_secs: 120,
            connect_timeout_secs: 10,
            max_output_tokens: 8192,
            temperature: 0.7,
        }
    }
}

/// Configuration for the external profile/credits store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStoreConfig {
    /// Endpoint URL. Falls back to the `url_env` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Environment variable holding the endpoint URL.
    pub url_env: String,
    /// Explicit access key. Usually left unset in favor of `access_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    /// Environment variable holding the access key.
    pub access_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProfileStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_env: "PROFILE_STORE_URL".to_string(),
            access_key: None,
            access_key_env: "PROFILE_STORE_KEY".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Whether a configured secret value is usable.
///
/// Empty strings, whitespace, the template placeholder, and the literal
/// string "undefined" all count as unset - they are pre-deployment
/// misconfiguration, not distinct auth failures.
pub fn is_usable_secret(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != PLACEHOLDER_API_KEY && trimmed != "undefined"
}

impl LlmConfig {
    /// Resolve the API key from explicit config or the configured env var.
    /// `None` means the backend is unconfigured.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| is_usable_secret(k))
    }
}

impl ProfileStoreConfig {
    /// Resolve the endpoint URL from explicit config or the env var.
    pub fn resolved_url(&self) -> Option<String> {
        self.url
            .clone()
            .or_else(|| std::env::var(&self.url_env).ok())
            .filter(|u| is_usable_secret(u))
    }

    /// Resolve the access key from explicit config or the env var.
    pub fn resolved_access_key(&self) -> Option<String> {
        self.access_key
            .clone()
            .or_else(|| std::env::var(&self.access_key_env).ok())
            .filter(|k| is_usable_secret(k))
    }
}

impl AppConfig {
    /// Names of the required secrets that are currently absent.
    ///
    /// Three secrets are required at process start; missing any one degrades
    /// the system to a visibly "not configured" state. Presenting that state
    /// is the caller's concern, not the pipeline's.
    pub fn missing_secrets(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.llm.resolved_api_key().is_none() {
            missing.push(self.llm.api_key_env.clone());
        }
        if self.profile_store.resolved_url().is_none() {
            missing.push(self.profile_store.url_env.clone());
        }
        if self.profile_store.resolved_access_key().is_none() {
            missing.push(self.profile_store.access_key_env.clone());
        }
        missing
    }
}

/// Path to the user-level config file, if a home directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "signalscope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration with figment layering.
///
/// `config_path` overrides the file search entirely when given.
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    } else {
        if let Some(user_config) = user_config_path() {
            if user_config.exists() {
                figment = figment.merge(Toml::file(&user_config));
            }
        }
        let ws_config = Path::new("signalscope.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(ws_config));
        }
    }

    figment = figment.merge(Env::prefixed("SIGNALSCOPE_").split("__"));
    figment.extract().map_err(Box::new)
}
