//! Structured generation pipeline for SolveForge
//!
//! Turns free-text problem statements into structured, cited analyses,
//! opportunity lists, and fused execution plans by orchestrating calls to
//! an external generative-model service.
//!
//! ## Architecture
//!
//! ```text
//! Typed inputs → Request Builder → Model Client → Sanitize → Parse
//!              → Schema Contract → Provenance → Typed result
//! ```
//!
//! Every operation returns either a fully validated object or one of four
//! classified errors - never a partial result. The model client is injected
//! at construction; credentials are a startup-time configuration concern,
//! not a pipeline concern.

// Model client abstraction
pub mod client;
pub mod gemini;

// Pipeline stages
pub mod contracts;
pub mod provenance;
pub mod request;
pub mod sanitize;

// Orchestration and error taxonomy
pub mod error;
pub mod pipeline;


// Re-exports for convenience
pub use client::{ModelClient, ModelEnvelope, ModelError, ModelRequest, ModelTier};
pub use error::{ConfigError, PipelineError};
pub use gemini::{GeminiClient, GeminiConfig};
pub use pipeline::Pipeline;
