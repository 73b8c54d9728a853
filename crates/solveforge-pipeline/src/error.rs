//! Pipeline error taxonomy
//!
//! Every failure crossing the pipeline boundary is one of four kinds, each
//! carrying a non-empty user-facing message. Classification inspects the
//! transport's structured error first and falls back to substring matching
//! only for opaque errors.

use thiserror::Error;

use crate::client::ModelError;

/// Startup-time configuration errors
///
/// Surfaced at client construction, never from a pipeline operation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),
}

/// Classified pipeline failure
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The model service signalled rate-limiting or quota exhaustion
    #[error("{message}")]
    QuotaExceeded { message: String },

    /// Generic network or invocation failure
    #[error("{message}")]
    TransportFailure { message: String },

    /// Sanitized text could not be parsed, or a count invariant could not
    /// be satisfied even after permitted repairs
    #[error("{message}")]
    MalformedOutput { message: String },

    /// Parsed data violates a required field, enumeration, or range
    /// invariant not repairable by truncation
    #[error("{message}")]
    SchemaViolation { message: String },
}

impl PipelineError {
    /// Quota failure with the billing-facing message
    pub fn quota() -> Self {
        Self::QuotaExceeded {
            message: "You've exceeded your API quota. Please check your plan and billing \
                      details. You might need to wait a bit before trying again."
                .to_string(),
        }
    }

    /// Transport failure for the named operation
    pub fn transport(context: &str) -> Self {
        Self::TransportFailure {
            message: format!(
                "Failed to {}. Please check your network connection and try again.",
                context
            ),
        }
    }

    /// Unparseable or structurally unrepairable model output
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedOutput {
            message: detail.into(),
        }
    }

    /// Contract violation in otherwise well-formed output
    pub fn schema(detail: impl Into<String>) -> Self {
        Self::SchemaViolation {
            message: detail.into(),
        }
    }

    /// Stable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::TransportFailure { .. } => "TRANSPORT_FAILURE",
            Self::MalformedOutput { .. } => "MALFORMED_OUTPUT",
            Self::SchemaViolation { .. } => "SCHEMA_VIOLATION",
        }
    }

    /// Classify a transport-layer failure for the named operation
    ///
    /// `context` reads as a verb phrase ("analyze the problem") and lands in
    /// the user-facing message.
    pub fn classify(error: ModelError, context: &str) -> Self {
        match error {
            ModelError::RateLimited(_) => Self::quota(),
            ModelError::Api { status: 429, .. } => Self::quota(),
            ModelError::Api { ref body, .. } if body.contains("RESOURCE_EXHAUSTED") => {
                Self::quota()
            }
            // Opaque transports: substring matching as a last resort
            ModelError::Other(ref message)
                if message.contains("429") || message.contains("RESOURCE_EXHAUSTED") =>
            {
                Self::quota()
            }
            other => {
                tracing::error!(error = %other, "Model invocation failed");
                Self::transport(context)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_classifies_as_quota() {
        let err = PipelineError::classify(
            ModelError::RateLimited("RESOURCE_EXHAUSTED".to_string()),
            "analyze the problem",
        );
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
        assert!(err.to_string().contains("billing"));
    }

    #[test]
    fn test_opaque_quota_substring_classifies_as_quota() {
        let err = PipelineError::classify(
            ModelError::Other("upstream said: 429 Too Many Requests".to_string()),
            "discover opportunities",
        );
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_api_error_classifies_as_transport() {
        let err = PipelineError::classify(
            ModelError::Api {
                status: 500,
                body: "internal".to_string(),
            },
            "compose the action plan",
        );
        assert_eq!(err.code(), "TRANSPORT_FAILURE");
        assert!(err.to_string().contains("compose the action plan"));
        assert!(err.to_string().contains("network connection"));
    }

    #[test]
    fn test_empty_response_classifies_as_transport() {
        let err = PipelineError::classify(ModelError::EmptyResponse, "analyze the problem");
        assert_eq!(err.code(), "TRANSPORT_FAILURE");
    }

    #[test]
    fn test_messages_never_empty() {
        for err in [
            PipelineError::quota(),
            PipelineError::transport("analyze the problem"),
            PipelineError::malformed("bad json"),
            PipelineError::schema("missing field"),
        ] {
            assert!(!err.to_string().is_empty());
        }
    }
}
