//! # Signalscope Core
//!
//! Core library for the Signalscope market-research assistant.
//! Provides the three-stage research pipeline (plan -> research -> analyze),
//! the model gateway, schema contracts, the profile-store collaborator,
//! configuration, and error types.

pub mod config;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod schema;

// Re-export commonly used types at the crate root.
pub use config::{load_config, AppConfig, LlmConfig, ProfileStoreConfig};
pub use error::{ErrorCategory, GatewayError, PipelineError, ProfileError, Result, StageError};
pub use gateway::{GeminiGateway, MockGateway, ModelGateway, NO_RESEARCH_DATA};
pub use pipeline::{ResearchPipeline, RunState};
pub use profile::{HttpProfileStore, Profile, ProfileStore, FREE_TIER_LIMIT};
pub use report::{
    Classification, PatternScores, ProblemPattern, Quote, ResearchPlan, SignalReport,
    SubredditTarget,
};
