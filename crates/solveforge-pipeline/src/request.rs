//! Request builders
//!
//! One builder per pipeline operation. Each assembles the grounded
//! directive plus the typed payload for the model call. Builders are pure:
//! the same inputs always produce the same request, and no I/O happens
//! here.

use serde::Serialize;

use solveforge_types::{FounderProfile, LiveData, Priority, Problem, UserDrivenResponse};

use crate::client::{ModelRequest, ModelTier};
use crate::contracts::{composition_output_contract, DISCOVERY_PROBLEM_COUNT};
use crate::gemini::DEFAULT_THINKING_BUDGET;

fn profile_json(profile: &FounderProfile) -> String {
    serde_json::to_string(profile).unwrap_or_default()
}

/// Shared banding rules the model must treat as binding constraints
fn constraint_block(profile: &FounderProfile) -> String {
    format!(
        r#"Founder profile (binding constraints, not suggestions): {profile}

Fixed business rules, apply exactly:
- MVP budget: runway <= 3 months -> '< ₹50,000'; runway <= 6 months -> '₹50K - ₹2 Lakh'; otherwise -> '₹2L - ₹10L'
- MVP timeline: runway <= 3 months -> '2-3 weeks'; runway <= 6 months -> '4-6 weeks'; otherwise -> '2-3 months'
- For this founder ({runway} months of runway) that means a budget of {budget} and a timeline of {timeline}."#,
        profile = profile_json(profile),
        runway = profile.runway_months,
        budget = profile.budget_band(),
        timeline = profile.timeline_band(),
    )
}

/// Build the Analyze request
///
/// Grounding on; the Analysis contract is enforced by instruction plus
/// post-hoc validation.
pub fn analysis_request(problem: &str, profile: &FounderProfile) -> ModelRequest {
    let system_instruction = format!(
        r#"# Problem Analysis

You are SolveForge, a personalized co-pilot for founders. Analyze a
user-submitted problem and produce a structured JSON report deeply
personalized to the founder profile below.

You have web search available. Use it for every factual claim - competitors,
market size (TAM), technology trends, government schemes. Do not fabricate
data; ground the analysis in verifiable sources.

{constraints}

## Process

1. Refine the user's input into a precise, actionable problem statement
   incorporating the founder's context.
2. Chunk 1, titled exactly "Existing Solutions & Gaps": find 3-5 real
   competitors or existing solutions via search, analyze them against the
   founder's runway and team size, and note exploitable gaps.
3. Chunk 2, titled exactly "Feasibility & Scalability": base the analysis on
   the founder's runway and team size. Apply the budget rule above for MVP
   cost. Recommend a stack aligned with the founder's tech_stack, and rate
   scalability Low, Medium, or High with justification.
4. Chunk 3, titled exactly "Market & Edge": find a credible TAM via search,
   narrowed to the founder's location where possible, citing the source in
   the analysis text. Define a specific target persona for the location and
   check for relevant government schemes.
5. Chunk 4, titled exactly "Resources & Timeline": team composition must
   match the founder's team_size; apply the timeline rule above for the MVP
   timeline.
6. Chunk 5, titled exactly "Ethics & Risks": identify 1-2 risks tied
   directly to the founder's context.
7. Synthesis: a solution_guide of 5-7 concrete steps the founder can take
   immediately.

## Output

A single valid JSON object, no markdown fences, shaped as:
{{ "mode": "user_driven", "input_problem": string, "refined_problem": string,
"founder_profile": {{ ...the profile above... }},
"chunks": [ {{ "id": number, "title": string, "analysis": string,
"key_insights": [string] }} ],
"synthesis": {{ "solution_guide": [string] }} }}"#,
        constraints = constraint_block(profile),
    );

    ModelRequest {
        system_instruction,
        user_prompt: format!("Analyze this problem: \"{}\"", problem),
        tier: ModelTier::Pro,
        grounding: true,
        output_contract: None,
        thinking_budget: Some(DEFAULT_THINKING_BUDGET),
    }
}

/// Build the Discover request
///
/// Grounding on; flash tier - discovery scans trade depth for speed.
pub fn discovery_request(sector: &str, profile: &FounderProfile) -> ModelRequest {
    let system_instruction = format!(
        r#"# Opportunity Discovery

You are SolveForge, a personalized co-pilot for founders. Scan the given
sector and produce a JSON report of exactly {count} current problems that are
viable for the founder profile below.

You have web search available. Use it to find real, emerging pain points
from tech news, forums, and market reports. Do not invent problems.

{constraints}

## Process

1. The user's input names the sector to scan.
2. Search for recent, real-world pain points, challenges, or gaps in that
   sector.
3. Select exactly {count} diverse problems, each filtered and framed for this
   founder:
   - Viability: solvable as an MVP within the founder's runway_months by a
     team of team_size. No capital-intensive or large-team ideas.
   - Stack alignment: prefer problems addressable with the founder's
     tech_stack.
   - Location: prefer problems particularly acute, or advantaged, in the
     founder's location.
   - For each problem write a concise personalization_note explaining why
     it fits this founder (e.g. "Fits your 3-month runway: solvable in 10
     days with under ₹30K").
   - simulated_source names the real kind of source found (e.g.
     "TechCrunch Article", "HackerNews Comment").
   - freshness_timestamp is a recent ISO 8601 timestamp.
4. Output a single valid JSON object with exactly {count} problems, no
   markdown fences, shaped as:
   {{ "sector": string, "problems": [ {{ "id": number,
   "problem_statement": string, "personalization_note": string,
   "simulated_source": string, "freshness_timestamp": string }} ] }}"#,
        count = DISCOVERY_PROBLEM_COUNT,
        constraints = constraint_block(profile),
    );

    ModelRequest {
        system_instruction,
        user_prompt: format!("Scan this sector: \"{}\"", sector),
        tier: ModelTier::Flash,
        grounding: true,
        output_contract: None,
        thinking_budget: None,
    }
}

/// Build the Compose request
///
/// Grounding off - composition synthesizes only from the already-grounded
/// prior results. The Composition contract is attached for decoder-level
/// enforcement.
pub fn composition_request(
    analysis: &UserDrivenResponse,
    opportunities: &[Problem],
    live_data: &[LiveData],
    profile: &FounderProfile,
    priority: Priority,
) -> ModelRequest {
    #[derive(Serialize)]
    struct ComposerPayload<'a> {
        analysis: &'a UserDrivenResponse,
        opportunities: &'a [Problem],
        live_data: &'a [LiveData],
        founder_profile: &'a FounderProfile,
        priority: Priority,
    }

    let payload = serde_json::to_string(&ComposerPayload {
        analysis,
        opportunities,
        live_data,
        founder_profile: profile,
        priority,
    })
    .unwrap_or_default();

    let system_instruction = r#"# Plan Composition

You are the SolveForge Composer. Synthesize the provided problem analysis,
discovered opportunities, and founder profile into a single executable,
cross-domain action plan.

## Process

1. Fuse: analyze the 'analysis' object and the 'opportunities' array for
   critical connections, contradictions, and synergies; converge on one
   coherent strategic direction.
2. fusion_summary: 2-3 sentences stating the primary strategic insight
   derived from the fusion.
3. fused_insights: 3-5 insights. Each references its from_sources (e.g.
   "Analysis: Market & Edge", "Opportunity ID: 2"), states an actionable
   insight, and carries a confidence score between 0.0 and 1.0 reflecting
   how well the sources support it.
4. action_plan: 5-7 tasks derived from the insights. Each task has a title
   and description; an owner of 'founder' for strategic or manual work,
   'ai' for analysis or research work, or 'tool' for automatable work;
   executable true only for 'tool' tasks with a concrete command; a
   realistic due_in_hours that respects the founder's limited runway; and
   status 'pending'.
5. Metadata: mode is 'compose'; cap_id is a freshly generated UUID v4;
   generated_at is the current ISO 8601 UTC timestamp; founder_profile
   echoes the provided profile; priority echoes the input;
   execution_log contains the single entry "CAP Initiated. Awaiting execution.";
   next_heartbeat_in_seconds is 86400.

## Output

A single valid JSON object strictly matching the response schema. No
commentary, no markdown fences."#
        .to_string();

    ModelRequest {
        system_instruction,
        user_prompt: format!("Generate a Composed Action Plan based on this data: {}", payload),
        tier: ModelTier::Pro,
        grounding: false,
        output_contract: Some(composition_output_contract()),
        thinking_budget: Some(DEFAULT_THINKING_BUDGET),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solveforge_types::FundingStage;

    fn profile(runway_months: u32) -> FounderProfile {
        FounderProfile {
            experience_years: 4,
            team_size: 2,
            runway_months,
            tech_stack: vec!["Python".to_string()],
            location: "Bengaluru".to_string(),
            funding_stage: FundingStage::Seed,
        }
    }

    #[test]
    fn test_analysis_request_shape() {
        let request = analysis_request("farmers lack cold storage", &profile(3));
        assert_eq!(request.tier, ModelTier::Pro);
        assert!(request.grounding);
        assert!(request.output_contract.is_none());
        assert_eq!(request.thinking_budget, Some(DEFAULT_THINKING_BUDGET));
        assert!(request.user_prompt.contains("farmers lack cold storage"));
    }

    #[test]
    fn test_analysis_directive_encodes_bands_and_titles() {
        let request = analysis_request("problem", &profile(3));
        // All three bands stated as rules, plus the resolved band
        assert!(request.system_instruction.contains("< ₹50,000"));
        assert!(request.system_instruction.contains("₹50K - ₹2 Lakh"));
        assert!(request.system_instruction.contains("₹2L - ₹10L"));
        assert!(request.system_instruction.contains("2-3 weeks"));
        assert!(request.system_instruction.contains("Existing Solutions & Gaps"));
        assert!(request.system_instruction.contains("Ethics & Risks"));
        // Profile embedded as structured context
        assert!(request.system_instruction.contains("\"runway_months\":3"));
    }

    #[test]
    fn test_discovery_request_shape() {
        let request = discovery_request("agritech", &profile(6));
        assert_eq!(request.tier, ModelTier::Flash);
        assert!(request.grounding);
        assert!(request.thinking_budget.is_none());
        assert!(request.system_instruction.contains("exactly 5"));
        assert!(request.user_prompt.contains("agritech"));
    }

    #[test]
    fn test_composition_request_shape() {
        let analysis = UserDrivenResponse {
            mode: "user_driven".to_string(),
            input_problem: "p".to_string(),
            refined_problem: "r".to_string(),
            founder_profile: profile(3),
            chunks: vec![],
            synthesis: solveforge_types::Synthesis {
                solution_guide: vec![],
            },
            sources: None,
        };
        let request = composition_request(&analysis, &[], &[], &profile(3), Priority::High);
        assert_eq!(request.tier, ModelTier::Pro);
        assert!(!request.grounding);
        assert!(request.output_contract.is_some());
        assert!(request.user_prompt.contains("\"priority\":\"high\""));
        assert!(request
            .system_instruction
            .contains("CAP Initiated. Awaiting execution."));
        assert!(request.system_instruction.contains("86400"));
    }

    #[test]
    fn test_builders_are_pure() {
        let a = analysis_request("same problem", &profile(4));
        let b = analysis_request("same problem", &profile(4));
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }
}
