//! Gemini Client
//!
//! Model client implementation for the Google generative-language API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{
    GroundingChunk, GroundingMetadata, ModelClient, ModelEnvelope, ModelError, ModelRequest,
    ModelTier,
};
use crate::error::ConfigError;

/// Default deep-reasoning model
const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";

/// Default fast model for discovery scans
const DEFAULT_FLASH_MODEL: &str = "gemini-2.5-flash";

/// Default reasoning token budget for pro-tier calls
pub const DEFAULT_THINKING_BUDGET: u32 = 32768;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Configuration for the Gemini client
///
/// Constructed explicitly and passed in at client construction - there is no
/// process-wide singleton. A missing credential is a configuration error at
/// startup, never a pipeline error.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the generative-language service
    pub api_key: String,

    /// Model id used for [`ModelTier::Pro`] requests
    pub pro_model: String,

    /// Model id used for [`ModelTier::Flash`] requests
    pub flash_model: String,
}

impl GeminiConfig {
    /// Create a config with the default model ids
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            pro_model: DEFAULT_PRO_MODEL.to_string(),
            flash_model: DEFAULT_FLASH_MODEL.to_string(),
        }
    }

    /// Load from environment variables
    ///
    /// `GEMINI_API_KEY` is required; `GEMINI_PRO_MODEL` and
    /// `GEMINI_FLASH_MODEL` override the default model ids.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingCredential("GEMINI_API_KEY"))?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_PRO_MODEL") {
            config.pro_model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_FLASH_MODEL") {
            config.flash_model = model;
        }
        Ok(config)
    }
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client from an explicit configuration
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    fn build_body(&self, request: &ModelRequest) -> Value {
        let mut body = json!({
            "system_instruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.user_prompt }] }],
        });

        if request.grounding {
            body["tools"] = json!([{ "google_search": {} }]);
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(contract) = &request.output_contract {
            generation_config.insert("responseMimeType".into(), json!("application/json"));
            generation_config.insert("responseSchema".into(), contract.clone());
        }
        if let Some(budget) = request.thinking_budget {
            generation_config.insert("thinkingConfig".into(), json!({ "thinkingBudget": budget }));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelEnvelope, ModelError> {
        let model = self.model_name(request.tier);
        let url = format!("{}/{}:generateContent", API_BASE, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&self.build_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
                return Err(ModelError::RateLimited(body));
            }
            return Err(ModelError::Api { status, body });
        }

        // Wire format: candidates[0].content.parts[].text plus optional
        // groundingMetadata.groundingChunks[].web.{uri,title}
        #[derive(Deserialize)]
        struct Part {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct Content {
            #[serde(default)]
            parts: Vec<Part>,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct WireGroundingMetadata {
            #[serde(default)]
            grounding_chunks: Vec<GroundingChunk>,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Candidate {
            content: Option<Content>,
            grounding_metadata: Option<WireGroundingMetadata>,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        let response_text = response.text().await?;
        tracing::debug!(
            "Gemini raw response: {}",
            response_text.chars().take(1000).collect::<String>()
        );

        let api_response: ApiResponse = serde_json::from_str(&response_text)
            .map_err(|e| ModelError::Other(format!("Failed to parse Gemini response: {}", e)))?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        let grounding = candidate.grounding_metadata.map(|m| GroundingMetadata {
            chunks: m.grounding_chunks,
        });

        Ok(ModelEnvelope { text, grounding })
    }

    fn model_name(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Pro => &self.config.pro_model,
            ModelTier::Flash => &self.config.flash_model,
        }
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client() {
        let client = GeminiClient::new(GeminiConfig::new("test-key".to_string()));
        assert_eq!(client.model_name(ModelTier::Pro), DEFAULT_PRO_MODEL);
        assert_eq!(client.model_name(ModelTier::Flash), DEFAULT_FLASH_MODEL);
        assert_eq!(client.provider_name(), "Gemini");
    }

    #[test]
    fn test_grounded_request_body() {
        let client = GeminiClient::new(GeminiConfig::new("test-key".to_string()));
        let request = ModelRequest {
            system_instruction: "directive".to_string(),
            user_prompt: "prompt".to_string(),
            tier: ModelTier::Flash,
            grounding: true,
            output_contract: None,
            thinking_budget: None,
        };

        let body = client.build_body(&request);
        assert_eq!(body["tools"][0]["google_search"], serde_json::json!({}));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_contract_request_body() {
        let client = GeminiClient::new(GeminiConfig::new("test-key".to_string()));
        let request = ModelRequest {
            system_instruction: "directive".to_string(),
            user_prompt: "prompt".to_string(),
            tier: ModelTier::Pro,
            grounding: false,
            output_contract: Some(serde_json::json!({ "type": "OBJECT" })),
            thinking_budget: Some(DEFAULT_THINKING_BUDGET),
        };

        let body = client.build_body(&request);
        assert!(body.get("tools").is_none());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            DEFAULT_THINKING_BUDGET
        );
    }
}
