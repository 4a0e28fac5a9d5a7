//! Model gateway: a thin client over a generative-text backend.
//!
//! Exposes two capability calls behind the [`ModelGateway`] trait:
//! schema-constrained structured generation and search-augmented
//! generation. Use [`GeminiGateway`] for the real backend and
//! [`MockGateway`] in tests.

pub mod gemini;
pub mod mock;

use crate::config::LlmConfig;
use crate::error::GatewayError;
use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiGateway;
pub use mock::MockGateway;

/// The text substituted for an empty search-augmented response.
///
/// Absence of evidence is itself informative and flows into analysis
/// instead of aborting the run, so the search call never hard-fails on
/// emptiness.
pub const NO_RESEARCH_DATA: &str = "No research data found.";

/// Capability interface to the generative-text backend.
///
/// Every call crosses a network boundary to an external paid service.
/// Implementations re-resolve the credential on each call entry so key
/// rotation takes effect without a restart.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Request JSON-shaped output conforming to `schema`.
    ///
    /// An empty response is [`GatewayError::EmptyResponse`] - a blocked
    /// prompt and a softly-unreachable backend are indistinguishable here
    /// and collapse to the same error kind.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, GatewayError>;

    /// Request free-text output with open web-search augmentation.
    ///
    /// An empty response yields the literal [`NO_RESEARCH_DATA`] sentinel,
    /// never an error.
    async fn generate_with_search(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[async_trait]
impl<T: ModelGateway + ?Sized> ModelGateway for std::sync::Arc<T> {
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, GatewayError> {
        (**self).generate_structured(prompt, schema).await
    }

    async fn generate_with_search(&self, prompt: &str) -> Result<String, GatewayError> {
        (**self).generate_with_search(prompt).await
    }
}

/// Resolve the backend credential, failing before any network I/O when it
/// is absent or a placeholder.
pub fn resolve_api_key(config: &LlmConfig) -> Result<String, GatewayError> {
    config
        .resolved_api_key()
        .ok_or_else(|| GatewayError::Configuration {
            var: config.api_key_env.clone(),
        })
}
