//! Error types for the Signalscope core library.
//!
//! Uses `thiserror` for public API error types. The gateway reports failures
//! with structured variants (status category, not raw HTTP text), so the
//! pipeline never has to pattern-match substrings to know what went wrong.
//! Substring classification survives only as a fallback for error text that
//! arrives without structure (see [`ErrorCategory::classify`]).

/// Errors from the model gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("model backend is not configured: set the '{var}' environment variable")]
    Configuration { var: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("invalid API key: the model backend rejected the credential")]
    Unauthorized,

    #[error("rate limit exceeded by the model backend")]
    RateLimited,

    #[error("request to model backend timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("connection to model backend failed: {message}")]
    Connection { message: String },

    #[error("HTTP {status} from model backend: {message}")]
    Api { status: u16, message: String },

    #[error("malformed model backend response: {message}")]
    ResponseParse { message: String },
}

/// Errors from the profile store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile store is not configured: missing {what}")]
    Configuration { what: String },

    #[error("profile store request failed: {message}")]
    Request { message: String },

    #[error("profile store returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed profile payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// What a single pipeline stage can trip on: a gateway failure, a parse
/// failure of the structured output, or a post-parse schema violation.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to parse structured output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("structured output violates schema at {path}: {message}")]
    SchemaViolation { path: String, message: String },
}

/// Stage-tagged pipeline failures. Every stage-local failure is wrapped with
/// its stage and re-raised; nothing is retried and nothing is recovered.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("planning failed: {0}")]
    Planning(#[source] StageError),

    #[error("research execution failed: {0}")]
    Research(#[source] StageError),

    #[error("signal analysis failed: {0}")]
    Analysis(#[source] StageError),

    #[error("research run was cancelled")]
    Cancelled,
}

/// Coarse failure category used to pick the most specific user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required secret is missing or a placeholder.
    Configuration,
    /// The backend rejected the credential (401/403).
    Unauthorized,
    /// The backend throttled the request (429).
    RateLimited,
    /// The backend returned no text on a structured call.
    Empty,
    /// Anything else.
    Unknown,
}

impl ErrorCategory {
    /// Fallback classification from raw error text.
    ///
    /// Some collaborators surface failures as opaque strings; a "401"/"403"
    /// marker means a rejected credential and "429" means throttling. Only
    /// consulted when no structured variant already answered the question.
    pub fn classify(text: &str) -> Self {
        if text.contains("401") || text.contains("403") {
            ErrorCategory::Unauthorized
        } else if text.contains("429") {
            ErrorCategory::RateLimited
        } else {
            ErrorCategory::Unknown
        }
    }
}

impl StageError {
    fn category(&self) -> ErrorCategory {
        match self {
            StageError::Gateway(GatewayError::Configuration { .. }) => {
                ErrorCategory::Configuration
            }
            StageError::Gateway(GatewayError::Unauthorized) => ErrorCategory::Unauthorized,
            StageError::Gateway(GatewayError::RateLimited) => ErrorCategory::RateLimited,
            StageError::Gateway(GatewayError::EmptyResponse) => ErrorCategory::Empty,
            other => ErrorCategory::classify(&other.to_string()),
        }
    }
}

impl PipelineError {
    /// The human name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Planning(_) => "planning",
            PipelineError::Research(_) => "research",
            PipelineError::Analysis(_) => "analysis",
            PipelineError::Cancelled => "run",
        }
    }

    /// Structured category first, substring fallback second.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Planning(e)
            | PipelineError::Research(e)
            | PipelineError::Analysis(e) => e.category(),
            PipelineError::Cancelled => ErrorCategory::Unknown,
        }
    }

    /// The most specific actionable message available, always naming the
    /// stage that failed.
    pub fn user_message(&self) -> String {
        if matches!(self, PipelineError::Cancelled) {
            return self.to_string();
        }
        match self.category() {
            ErrorCategory::Unauthorized => {
                format!("{} failed: invalid API key", self.stage())
            }
            ErrorCategory::RateLimited => format!(
                "{} failed: rate limit exceeded - wait a moment and retry",
                self.stage()
            ),
            ErrorCategory::Empty => format!(
                "{} failed: the model returned an empty response",
                self.stage()
            ),
            // Configuration errors already name the missing secret.
            ErrorCategory::Configuration | ErrorCategory::Unknown => self.to_string(),
        }
    }
}

/// A type alias for results using [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Configuration {
            var: "GEMINI_API_KEY".into(),
        };
        assert_eq!(
            err.to_string(),
            "model backend is not configured: set the 'GEMINI_API_KEY' environment variable"
        );

        let err = GatewayError::Api {
            status: 500,
            message: "internal".into(),
        };
        assert_eq!(err.to_string(), "HTTP 500 from model backend: internal");
    }

    #[test]
    fn test_pipeline_error_carries_stage_context() {
        let err = PipelineError::Planning(StageError::Gateway(GatewayError::EmptyResponse));
        assert_eq!(
            err.to_string(),
            "planning failed: model returned an empty response"
        );
        assert_eq!(err.stage(), "planning");
    }

    #[test]
    fn test_structured_category_beats_substring() {
        // Unauthorized is recognized without any "401" in the text.
        let err = PipelineError::Analysis(StageError::Gateway(GatewayError::Unauthorized));
        assert_eq!(err.category(), ErrorCategory::Unauthorized);
        assert_eq!(err.user_message(), "analysis failed: invalid API key");
    }

    #[test]
    fn test_substring_fallback_401_403() {
        for marker in ["401", "403"] {
            let err = PipelineError::Research(StageError::Gateway(GatewayError::Connection {
                message: format!("upstream said {marker} Forbidden"),
            }));
            assert_eq!(err.category(), ErrorCategory::Unauthorized);
            assert_eq!(err.user_message(), "research failed: invalid API key");
        }
    }

    #[test]
    fn test_substring_fallback_429() {
        let err = PipelineError::Planning(StageError::Gateway(GatewayError::Connection {
            message: "got 429 Too Many Requests".into(),
        }));
        assert_eq!(err.category(), ErrorCategory::RateLimited);
        assert!(err.user_message().contains("rate limit exceeded"));
    }

    #[test]
    fn test_parse_failure_wrapped_with_stage() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = PipelineError::Analysis(StageError::Parse(parse_err));
        assert!(err.to_string().starts_with("signal analysis failed:"));
        assert_eq!(err.category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_schema_violation_display() {
        let err = StageError::SchemaViolation {
            path: "$.patterns[0].scores".into(),
            message: "missing required field 'trend'".into(),
        };
        assert_eq!(
            err.to_string(),
            "structured output violates schema at $.patterns[0].scores: missing required field 'trend'"
        );
    }
}
