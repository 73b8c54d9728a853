//! Pipeline operations
//!
//! The three orchestration entry points. Each call runs the same linear
//! sequence - build request, invoke model, sanitize, parse, validate,
//! enrich provenance - and returns either a fully validated typed object
//! or a classified error, never a partial result. No retries here; retry
//! policy belongs to the transport collaborator.

use std::sync::Arc;

use solveforge_types::{
    ComposedActionPlan, FounderProfile, LiveData, Priority, ProactiveDiscoveryResponse, Problem,
    UserDrivenResponse,
};

use crate::client::ModelClient;
use crate::contracts::{enforce_discovery, validate_analysis, validate_composition};
use crate::error::PipelineError;
use crate::gemini::{GeminiClient, GeminiConfig};
use crate::provenance::extract_sources;
use crate::request::{analysis_request, composition_request, discovery_request};
use crate::sanitize::sanitize;

/// Structured generation pipeline over an injected model client
///
/// Stateless between calls; each invocation owns its request/response
/// lifecycle end to end, so concurrent calls need no coordination.
pub struct Pipeline {
    client: Arc<dyn ModelClient>,
}

impl Pipeline {
    /// Create a pipeline with a specific model client
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Create a pipeline backed by the Gemini client
    pub fn with_gemini(config: GeminiConfig) -> Self {
        Self::new(Arc::new(GeminiClient::new(config)))
    }

    /// Analyze a free-text problem statement for the given founder
    pub async fn analyze(
        &self,
        problem: &str,
        profile: &FounderProfile,
    ) -> Result<UserDrivenResponse, PipelineError> {
        const CONTEXT: &str = "analyze the problem";

        if problem.trim().is_empty() {
            return Err(PipelineError::schema("problem statement must not be empty"));
        }
        profile.validate().map_err(PipelineError::schema)?;

        let request = analysis_request(problem, profile);
        tracing::debug!(
            model = self.client.model_name(request.tier),
            "Invoking model for analysis"
        );

        let envelope = self
            .client
            .generate(&request)
            .await
            .map_err(|e| PipelineError::classify(e, CONTEXT))?;

        let mut response: UserDrivenResponse = parse_payload(&sanitize(&envelope.text), "analysis")?;
        validate_analysis(&response)?;
        response.sources = extract_sources(&envelope);

        tracing::info!(
            chunks = response.chunks.len(),
            grounded = response.sources.is_some(),
            "Analysis complete"
        );
        Ok(response)
    }

    /// Scan a sector for problems viable for the given founder
    pub async fn discover(
        &self,
        sector: &str,
        profile: &FounderProfile,
    ) -> Result<ProactiveDiscoveryResponse, PipelineError> {
        const CONTEXT: &str = "discover opportunities";

        if sector.trim().is_empty() {
            return Err(PipelineError::schema("sector must not be empty"));
        }
        profile.validate().map_err(PipelineError::schema)?;

        let request = discovery_request(sector, profile);
        tracing::debug!(
            model = self.client.model_name(request.tier),
            "Invoking model for discovery"
        );

        let envelope = self
            .client
            .generate(&request)
            .await
            .map_err(|e| PipelineError::classify(e, CONTEXT))?;

        let mut response: ProactiveDiscoveryResponse =
            parse_payload(&sanitize(&envelope.text), "discovery")?;
        enforce_discovery(&mut response)?;
        response.sources = extract_sources(&envelope);

        tracing::info!(
            problems = response.problems.len(),
            grounded = response.sources.is_some(),
            "Discovery complete"
        );
        Ok(response)
    }

    /// Fuse prior analysis and discovery results into an action plan
    ///
    /// `analysis` and `opportunities` must come from prior successful
    /// analyze/discover calls; they are trusted here, not re-validated.
    pub async fn compose(
        &self,
        analysis: &UserDrivenResponse,
        opportunities: &[Problem],
        live_data: &[LiveData],
        profile: &FounderProfile,
        priority: Priority,
    ) -> Result<ComposedActionPlan, PipelineError> {
        const CONTEXT: &str = "compose the action plan";

        let request = composition_request(analysis, opportunities, live_data, profile, priority);
        tracing::debug!(
            model = self.client.model_name(request.tier),
            "Invoking model for composition"
        );

        let envelope = self
            .client
            .generate(&request)
            .await
            .map_err(|e| PipelineError::classify(e, CONTEXT))?;

        let mut plan: ComposedActionPlan = parse_payload(&sanitize(&envelope.text), "composition")?;
        validate_composition(&mut plan)?;

        tracing::info!(
            cap_id = %plan.cap_id,
            tasks = plan.action_plan.len(),
            "Composition complete"
        );
        Ok(plan)
    }
}

/// Deserialize sanitized model text, classifying failures as malformed
fn parse_payload<T: serde::de::DeserializeOwned>(
    text: &str,
    what: &str,
) -> Result<T, PipelineError> {
    serde_json::from_str(text).map_err(|e| {
        let snippet: String = text.chars().take(200).collect();
        PipelineError::malformed(format!(
            "{} output is not valid structured data: {}. Output was: {}",
            what, e, snippet
        ))
    })
}
