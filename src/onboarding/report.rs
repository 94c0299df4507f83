//! Human-readable summaries of onboarding state and batch results.

use super::batch::BatchOutcome;
use super::state::{OnboardingPhase, OnboardingState};

/// Summary returned by `resume`.
pub fn render_resume(state: &OnboardingState) -> String {
    let progress: Vec<String> = state
        .checkpoints
        .iter()
        .filter(|(_, c)| c.completed)
        .map(|(phase, c)| format!("  {phase}: {} entities created", c.entity_ids.len()))
        .collect();

    let mut parts = vec![
        format!("Onboarding session for company {}", state.tenant_id),
        format!("Current phase: {}", state.phase),
        format!("Started: {}", state.started_at.to_rfc3339()),
        format!("Last updated: {}", state.updated_at.to_rfc3339()),
        "Progress:".to_string(),
    ];
    if progress.is_empty() {
        parts.push("  (none yet)".to_string());
    } else {
        parts.extend(progress);
    }
    parts.push(format!("Next step: {}", state.phase.next_step_hint()));
    parts.join("\n")
}

/// Summary returned by `status`.
pub fn render_status(state: &OnboardingState) -> String {
    [
        format!("Company {}", state.tenant_id),
        format!("Current phase: {}", state.phase),
        format!("Total entities created: {}", state.total_entities()),
        format!("Phases with checkpoints: {}", state.checkpoints.len()),
    ]
    .join("\n")
}

/// Summary of one batch phase call.
pub fn render_batch(
    entity: &str,
    tenant_id: u64,
    outcome: &BatchOutcome,
    next_phase: OnboardingPhase,
) -> String {
    let mut parts = vec![format!(
        "{entity} batch for company {tenant_id}: {} succeeded, {} failed",
        outcome.succeeded.len(),
        outcome.failed.len()
    )];

    if !outcome.succeeded.is_empty() {
        let ids: Vec<String> = outcome.succeeded.iter().map(u64::to_string).collect();
        parts.push(format!("Created ids: {}", ids.join(", ")));
    }

    if !outcome.failed.is_empty() {
        parts.push("Failures:".to_string());
        for failure in &outcome.failed {
            parts.push(format!("  - {}: {}", failure.label, failure.message));
        }
    }

    parts.push(format!("Next step: {}", next_phase.next_step_hint()));
    parts.join("\n")
}

/// Summary of the final test-booking phase.
pub fn render_test_bookings(state: &OnboardingState, requested: u32, created: usize) -> String {
    [
        format!(
            "Created {created} of {requested} test bookings for company {}",
            state.tenant_id
        ),
        format!(
            "Staff: {}",
            state.entity_ids(OnboardingPhase::Staff).len()
        ),
        format!(
            "Services: {}",
            state.entity_ids(OnboardingPhase::Services).len()
        ),
        format!(
            "Bookings: {}",
            state.entity_ids(OnboardingPhase::TestBookings).len()
        ),
        format!("Onboarding complete for company {}.", state.tenant_id),
    ]
    .join("\n")
}
