//! Model Client Trait
//!
//! Unified interface for the external generative-model capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Which model tier a request should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTier {
    /// Deep-reasoning model (analysis, composition)
    Pro,
    /// Fast model (discovery scans)
    Flash,
}

/// A fully assembled model request
///
/// Built by the request builders; carries everything the capability needs
/// for one invocation. Builders are pure, so two identical inputs always
/// produce an identical request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Binding directive for the call (persona, process, constraints)
    pub system_instruction: String,

    /// The user-facing payload for this invocation
    pub user_prompt: String,

    /// Model tier to run on
    pub tier: ModelTier,

    /// Whether external web grounding is requested
    pub grounding: bool,

    /// Decoder-level output schema, when the contract is enforced at
    /// generation time rather than post-hoc
    pub output_contract: Option<Value>,

    /// Reasoning token budget, when the tier supports it
    pub thinking_budget: Option<u32>,
}

/// Web anchor inside a grounding chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAnchor {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One citation entry from the model's provenance metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebAnchor>,
}

/// Provenance metadata attached to a grounded response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingMetadata {
    #[serde(default)]
    pub chunks: Vec<GroundingChunk>,
}

/// Raw result of one model invocation
///
/// `grounding` is `None` when the response carried no provenance structure
/// at all - distinct from an empty chunk list.
#[derive(Debug, Clone)]
pub struct ModelEnvelope {
    /// Raw generated text, possibly fence-wrapped
    pub text: String,

    /// Provenance metadata, when the call was grounded
    pub grounding: Option<GroundingMetadata>,
}

/// Transport-layer errors from a model invocation
///
/// Kept structured so the pipeline can classify without string matching;
/// `Other` is the opaque-transport escape hatch.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Rate limit or quota exhausted: {0}")]
    RateLimited(String),

    #[error("Model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model returned no candidates")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}

/// Unified interface to the external model capability
///
/// One call per pipeline invocation; no retries at this seam - the caller
/// surfaces failures verbatim for classification.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one generation request to completion
    async fn generate(&self, request: &ModelRequest) -> Result<ModelEnvelope, ModelError>;

    /// Resolved model id for the given tier, for logging
    fn model_name(&self, tier: ModelTier) -> &str;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
