//! Schema contracts
//!
//! Three structured-output contracts constrain what the model must return.
//! Composition is the strictest: its shape is also enforced at decode time
//! via [`composition_output_contract`], because its downstream consumers
//! have no tolerance for missing fields. Analysis and Discovery rely on
//! instruction plus the post-hoc validation here, since they also request
//! web grounding, which is incompatible with decoder-level schemas.
//!
//! Validation rejects; it never coerces. The two permitted repairs are
//! discovery truncation (over-production) and confidence clamping.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{json, Value};
use uuid::Uuid;

use solveforge_types::{
    ComposedActionPlan, ProactiveDiscoveryResponse, TaskOwner, UserDrivenResponse,
    ANALYSIS_SECTION_TITLES,
};

use crate::error::PipelineError;

/// Exact number of problems a discovery call must yield
pub const DISCOVERY_PROBLEM_COUNT: usize = 5;

const SOLUTION_GUIDE_RANGE: (usize, usize) = (5, 7);
const FUSED_INSIGHT_RANGE: (usize, usize) = (3, 5);
const ACTION_PLAN_RANGE: (usize, usize) = (5, 7);

/// Accepts RFC 3339 or a naive ISO-8601 datetime
fn is_iso_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// Validate an analysis result against the Analysis contract
pub fn validate_analysis(response: &UserDrivenResponse) -> Result<(), PipelineError> {
    if response.mode != "user_driven" {
        return Err(PipelineError::schema(format!(
            "analysis mode must be \"user_driven\", got \"{}\"",
            response.mode
        )));
    }

    // The five-chunk shape is the load-bearing count invariant; a wrong
    // count means the output cannot be safely repaired.
    if response.chunks.len() != ANALYSIS_SECTION_TITLES.len() {
        return Err(PipelineError::malformed(format!(
            "analysis must contain exactly {} chunks, got {}",
            ANALYSIS_SECTION_TITLES.len(),
            response.chunks.len()
        )));
    }

    for (index, chunk) in response.chunks.iter().enumerate() {
        let expected_title = ANALYSIS_SECTION_TITLES[index];
        if chunk.title != expected_title {
            return Err(PipelineError::schema(format!(
                "chunk {} must be titled \"{}\", got \"{}\"",
                index + 1,
                expected_title,
                chunk.title
            )));
        }
        if chunk.id != (index + 1) as u32 {
            return Err(PipelineError::schema(format!(
                "chunk \"{}\" must have id {}, got {}",
                chunk.title,
                index + 1,
                chunk.id
            )));
        }
    }

    let guide_len = response.synthesis.solution_guide.len();
    if guide_len < SOLUTION_GUIDE_RANGE.0 || guide_len > SOLUTION_GUIDE_RANGE.1 {
        return Err(PipelineError::schema(format!(
            "solution_guide must contain {}-{} steps, got {}",
            SOLUTION_GUIDE_RANGE.0, SOLUTION_GUIDE_RANGE.1, guide_len
        )));
    }

    response
        .founder_profile
        .validate()
        .map_err(PipelineError::schema)?;

    Ok(())
}

/// Enforce the Discovery contract, repairing over-production
///
/// More than five problems: truncate to the first five, order preserved.
/// Fewer than five: the count invariant is violated and unrepairable.
pub fn enforce_discovery(response: &mut ProactiveDiscoveryResponse) -> Result<(), PipelineError> {
    if response.problems.len() > DISCOVERY_PROBLEM_COUNT {
        tracing::warn!(
            produced = response.problems.len(),
            kept = DISCOVERY_PROBLEM_COUNT,
            "Discovery over-produced problems, truncating"
        );
        response.problems.truncate(DISCOVERY_PROBLEM_COUNT);
    }

    if response.problems.len() < DISCOVERY_PROBLEM_COUNT {
        return Err(PipelineError::malformed(format!(
            "discovery must yield exactly {} problems, got {}",
            DISCOVERY_PROBLEM_COUNT,
            response.problems.len()
        )));
    }

    for problem in &response.problems {
        if problem.problem_statement.trim().is_empty() {
            return Err(PipelineError::schema(format!(
                "problem {} has an empty problem_statement",
                problem.id
            )));
        }
        if !is_iso_timestamp(&problem.freshness_timestamp) {
            return Err(PipelineError::schema(format!(
                "problem {} has a non-ISO-8601 freshness_timestamp: \"{}\"",
                problem.id, problem.freshness_timestamp
            )));
        }
    }

    Ok(())
}

/// Validate a composed plan against the Composition contract
///
/// The one permitted repair is clamping insight confidence into `[0, 1]`.
pub fn validate_composition(plan: &mut ComposedActionPlan) -> Result<(), PipelineError> {
    if plan.mode != "compose" {
        return Err(PipelineError::schema(format!(
            "plan mode must be \"compose\", got \"{}\"",
            plan.mode
        )));
    }

    match Uuid::parse_str(&plan.cap_id) {
        Ok(id) if id.get_version() == Some(uuid::Version::Random) => {}
        _ => {
            return Err(PipelineError::schema(format!(
                "cap_id must be a UUIDv4, got \"{}\"",
                plan.cap_id
            )))
        }
    }

    if !is_iso_timestamp(&plan.generated_at) {
        return Err(PipelineError::schema(format!(
            "generated_at must be an ISO-8601 timestamp, got \"{}\"",
            plan.generated_at
        )));
    }

    let insights = plan.fused_insights.len();
    if insights < FUSED_INSIGHT_RANGE.0 || insights > FUSED_INSIGHT_RANGE.1 {
        return Err(PipelineError::schema(format!(
            "plan must carry {}-{} fused insights, got {}",
            FUSED_INSIGHT_RANGE.0, FUSED_INSIGHT_RANGE.1, insights
        )));
    }
    for insight in &mut plan.fused_insights {
        insight.confidence = insight.confidence.clamp(0.0, 1.0);
    }

    let tasks = plan.action_plan.len();
    if tasks < ACTION_PLAN_RANGE.0 || tasks > ACTION_PLAN_RANGE.1 {
        return Err(PipelineError::schema(format!(
            "action plan must contain {}-{} tasks, got {}",
            ACTION_PLAN_RANGE.0, ACTION_PLAN_RANGE.1, tasks
        )));
    }

    for task in &plan.action_plan {
        let has_command = task
            .command
            .as_deref()
            .map(str::trim)
            .is_some_and(|c| !c.is_empty());
        if task.executable && !(task.owner == TaskOwner::Tool && has_command) {
            return Err(PipelineError::schema(format!(
                "task {} is executable but is not a tool task with a command",
                task.id
            )));
        }
    }

    if plan.execution_log.len() != 1 {
        return Err(PipelineError::schema(format!(
            "execution_log must start with exactly one bootstrap entry, got {}",
            plan.execution_log.len()
        )));
    }
    if plan.execution_log[0].trim().is_empty() {
        return Err(PipelineError::schema(
            "execution_log bootstrap entry must not be empty",
        ));
    }

    Ok(())
}

/// Decoder-level output schema for the Compose call
///
/// Uppercase type names per the generative-language structured-output
/// format. Attached to the request so the shape is enforced at generation
/// time; [`validate_composition`] still runs afterwards.
pub fn composition_output_contract() -> Value {
    let founder_profile = json!({
        "type": "OBJECT",
        "properties": {
            "experience_years": { "type": "INTEGER" },
            "team_size": { "type": "INTEGER" },
            "runway_months": { "type": "INTEGER" },
            "tech_stack": { "type": "ARRAY", "items": { "type": "STRING" } },
            "location": { "type": "STRING" },
            "funding_stage": {
                "type": "STRING",
                "enum": ["pre-seed", "seed", "pre-series-a", "series-a+"]
            }
        },
        "required": [
            "experience_years", "team_size", "runway_months",
            "tech_stack", "location", "funding_stage"
        ]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "mode": { "type": "STRING", "enum": ["compose"] },
            "cap_id": { "type": "STRING", "description": "UUID v4" },
            "generated_at": { "type": "STRING", "description": "ISO 8601 UTC" },
            "founder_profile": founder_profile,
            "priority": { "type": "STRING", "enum": ["urgent", "high", "medium", "low"] },
            "fusion_summary": { "type": "STRING" },
            "fused_insights": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "from_sources": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "insight": { "type": "STRING" },
                        "confidence": { "type": "NUMBER" }
                    },
                    "required": ["from_sources", "insight", "confidence"]
                }
            },
            "action_plan": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "INTEGER" },
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "owner": { "type": "STRING", "enum": ["founder", "ai", "tool"] },
                        "executable": { "type": "BOOLEAN" },
                        "command": { "type": "STRING", "nullable": true },
                        "status": {
                            "type": "STRING",
                            "enum": ["pending", "in_progress", "done"]
                        },
                        "due_in_hours": { "type": "INTEGER" }
                    },
                    "required": [
                        "id", "title", "description", "owner",
                        "executable", "command", "status", "due_in_hours"
                    ]
                }
            },
            "execution_log": { "type": "ARRAY", "items": { "type": "STRING" } },
            "next_heartbeat_in_seconds": { "type": "INTEGER" }
        },
        "required": [
            "mode", "cap_id", "generated_at", "founder_profile", "priority",
            "fusion_summary", "fused_insights", "action_plan", "execution_log",
            "next_heartbeat_in_seconds"
        ]
    })
}
