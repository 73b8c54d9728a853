//! Shared Domain Types for SolveForge
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing the
//! pipeline boundary.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────┐
//! │  Calling context │  typed  │  Generation      │
//! │  (UI / session)  │ ◄─────► │  pipeline        │
//! └──────────────────┘         └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. All boundary types live here - no inline struct definitions in the
//!    pipeline operations
//! 2. Wire names are exact: enums carry explicit `#[serde(rename)]` where
//!    the model contract demands it
//! 3. UUIDs and timestamps as strings for JSON compatibility; format
//!    validation happens in the pipeline's schema contracts

use serde::{Deserialize, Serialize};

// ============================================================================
// FOUNDER PROFILE
// ============================================================================

/// Funding stage of the requesting founder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingStage {
    #[serde(rename = "pre-seed")]
    PreSeed,
    #[serde(rename = "seed")]
    Seed,
    #[serde(rename = "pre-series-a")]
    PreSeriesA,
    #[serde(rename = "series-a+")]
    SeriesAPlus,
}

/// Constraints describing the requester
///
/// Embedded verbatim (as JSON) into every model directive; the model must
/// treat these as binding constraints, not suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FounderProfile {
    /// Years of professional experience
    pub experience_years: u32,

    /// Current team headcount (at least 1)
    pub team_size: u32,

    /// Months of runway remaining
    pub runway_months: u32,

    /// Preferred technologies, in priority order
    pub tech_stack: Vec<String>,

    /// Operating location
    pub location: String,

    /// Current funding stage
    pub funding_stage: FundingStage,
}

impl FounderProfile {
    /// MVP budget band implied by remaining runway
    ///
    /// Fixed business rule: the analysis directive must encode these bands
    /// verbatim.
    pub fn budget_band(&self) -> &'static str {
        if self.runway_months <= 3 {
            "< ₹50,000"
        } else if self.runway_months <= 6 {
            "₹50K - ₹2 Lakh"
        } else {
            "₹2L - ₹10L"
        }
    }

    /// MVP timeline band implied by remaining runway
    pub fn timeline_band(&self) -> &'static str {
        if self.runway_months <= 3 {
            "2-3 weeks"
        } else if self.runway_months <= 6 {
            "4-6 weeks"
        } else {
            "2-3 months"
        }
    }

    /// Check the profile invariants: team of at least one, no blank
    /// tech-stack entries
    pub fn validate(&self) -> Result<(), String> {
        if self.team_size < 1 {
            return Err("team_size must be at least 1".to_string());
        }
        if self.tech_stack.iter().any(|t| t.trim().is_empty()) {
            return Err("tech_stack must not contain blank entries".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// GROUNDING
// ============================================================================

/// A citation backing a claim in generated text
///
/// `uri` is always a well-formed absolute URI; `title` is already resolved
/// (falls back to the URI host during extraction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

// ============================================================================
// ANALYSIS (user-driven mode)
// ============================================================================

/// The five fixed analysis section titles, in contract order
pub const ANALYSIS_SECTION_TITLES: [&str; 5] = [
    "Existing Solutions & Gaps",
    "Feasibility & Scalability",
    "Market & Edge",
    "Resources & Timeline",
    "Ethics & Risks",
];

/// One dimension of problem analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisChunk {
    /// Sequence number, 1 through 5
    pub id: u32,

    /// One of [`ANALYSIS_SECTION_TITLES`], at the matching position
    pub title: String,

    /// Narrative analysis for this dimension
    pub analysis: String,

    /// Ordered takeaways for this dimension
    pub key_insights: Vec<String>,
}

/// Synthesis across all five analysis chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    /// 5-7 concrete, immediately actionable steps
    pub solution_guide: Vec<String>,
}

/// Full analysis result (`mode == "user_driven"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDrivenResponse {
    pub mode: String,
    pub input_problem: String,
    pub refined_problem: String,
    pub founder_profile: FounderProfile,
    /// Exactly 5 chunks, fixed titles in fixed order
    pub chunks: Vec<AnalysisChunk>,
    pub synthesis: Synthesis,
    /// `None` when grounding was not attempted for this response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
}

// ============================================================================
// DISCOVERY (proactive mode)
// ============================================================================

/// One discovered market problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: u32,
    pub problem_statement: String,
    /// Why this problem fits this specific founder
    pub personalization_note: String,
    /// The kind of source the problem was surfaced from
    pub simulated_source: String,
    /// ISO-8601 timestamp
    pub freshness_timestamp: String,
}

/// Discovery result: exactly 5 problems for a scanned sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProactiveDiscoveryResponse {
    pub sector: String,
    pub problems: Vec<Problem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
}

// ============================================================================
// COMPOSITION (fused action plan)
// ============================================================================

/// Requested urgency for a composed plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

/// A labeled external data point fed into composition
///
/// The composer accepts these alongside the analysis and opportunity inputs;
/// an empty list is the common case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveData {
    /// Where the data point came from
    pub source: String,
    /// The observation itself
    pub summary: String,
    /// ISO-8601 capture time
    pub captured_at: String,
}

/// A cross-source synthesized claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedInsight {
    /// Labels of the inputs this insight was fused from
    pub from_sources: Vec<String>,
    pub insight: String,
    /// Support strength in [0, 1]
    pub confidence: f64,
}

/// Who carries out an action task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOwner {
    Founder,
    Ai,
    Tool,
}

/// Lifecycle state of an action task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

/// One actionable step in a composed plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTask {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub owner: TaskOwner,
    /// Only permitted when `owner == Tool` and `command` is present
    pub executable: bool,
    pub command: Option<String>,
    pub status: TaskStatus,
    pub due_in_hours: u32,
}

/// Fused output of analysis + discovery (`mode == "compose"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedActionPlan {
    pub mode: String,
    /// UUIDv4, as a string
    pub cap_id: String,
    /// ISO-8601 UTC timestamp
    pub generated_at: String,
    pub founder_profile: FounderProfile,
    pub priority: Priority,
    /// 2-3 sentence statement of the primary strategic insight
    pub fusion_summary: String,
    /// 3-5 insights
    pub fused_insights: Vec<FusedInsight>,
    /// 5-7 tasks
    pub action_plan: Vec<ActionTask>,
    /// Starts with exactly one bootstrap entry
    pub execution_log: Vec<String>,
    pub next_heartbeat_in_seconds: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(runway_months: u32) -> FounderProfile {
        FounderProfile {
            experience_years: 4,
            team_size: 2,
            runway_months,
            tech_stack: vec!["Python".to_string(), "React".to_string()],
            location: "Bengaluru".to_string(),
            funding_stage: FundingStage::PreSeed,
        }
    }

    #[test]
    fn test_budget_bands() {
        assert_eq!(profile(3).budget_band(), "< ₹50,000");
        assert_eq!(profile(6).budget_band(), "₹50K - ₹2 Lakh");
        assert_eq!(profile(12).budget_band(), "₹2L - ₹10L");
    }

    #[test]
    fn test_timeline_bands() {
        assert_eq!(profile(2).timeline_band(), "2-3 weeks");
        assert_eq!(profile(5).timeline_band(), "4-6 weeks");
        assert_eq!(profile(9).timeline_band(), "2-3 months");
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile(3).validate().is_ok());

        let mut no_team = profile(3);
        no_team.team_size = 0;
        assert!(no_team.validate().is_err());

        let mut blank_stack = profile(3);
        blank_stack.tech_stack.push("  ".to_string());
        assert!(blank_stack.validate().is_err());
    }

    #[test]
    fn test_funding_stage_wire_names() {
        let json = serde_json::to_string(&FundingStage::SeriesAPlus).unwrap();
        assert_eq!(json, "\"series-a+\"");
        let stage: FundingStage = serde_json::from_str("\"pre-series-a\"").unwrap();
        assert_eq!(stage, FundingStage::PreSeriesA);
    }

    #[test]
    fn test_task_enums_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&TaskOwner::Tool).unwrap(), "\"tool\"");
        assert_eq!(
            serde_json::to_string(&Priority::Urgent).unwrap(),
            "\"urgent\""
        );
    }

    #[test]
    fn test_analysis_round_trip() {
        let response = UserDrivenResponse {
            mode: "user_driven".to_string(),
            input_problem: "farmers lack cold storage".to_string(),
            refined_problem: "smallholder farmers in Karnataka lack affordable cold storage"
                .to_string(),
            founder_profile: profile(3),
            chunks: ANALYSIS_SECTION_TITLES
                .iter()
                .enumerate()
                .map(|(i, title)| AnalysisChunk {
                    id: (i + 1) as u32,
                    title: title.to_string(),
                    analysis: "analysis".to_string(),
                    key_insights: vec!["insight".to_string()],
                })
                .collect(),
            synthesis: Synthesis {
                solution_guide: (0..5).map(|i| format!("step {}", i)).collect(),
            },
            sources: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        // Absent sources must not appear on the wire
        assert!(!json.contains("sources"));
        let back: UserDrivenResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chunks.len(), 5);
        assert_eq!(back.chunks[2].title, "Market & Edge");
    }
}
