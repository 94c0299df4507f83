//! Onboarding state machine: which step a tenant is on and what each step created.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The phases of a tenant onboarding.
///
/// Declared order is Init → Staff → Categories → Services → Schedules →
/// Clients → TestBookings → Complete. The batch handlers do not walk this
/// order; see [`OnboardingPhase::successor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    Init,
    Staff,
    Categories,
    Services,
    Schedules,
    Clients,
    TestBookings,
    Complete,
}

impl OnboardingPhase {
    pub const ALL: [OnboardingPhase; 8] = [
        Self::Init,
        Self::Staff,
        Self::Categories,
        Self::Services,
        Self::Schedules,
        Self::Clients,
        Self::TestBookings,
        Self::Complete,
    ];

    /// The phase a batch handler advances to after recording this phase's checkpoint.
    ///
    /// Staff advances to Categories and Categories to Services, so the two are
    /// transposed relative to the declared order. Init has no handler and
    /// Schedules is never a target.
    pub fn successor(&self) -> Option<OnboardingPhase> {
        use OnboardingPhase::*;
        match self {
            Init => None,
            Staff => Some(Categories),
            Categories => Some(Services),
            Services => Some(Clients),
            Schedules => None,
            Clients => Some(TestBookings),
            TestBookings => Some(Complete),
            Complete => None,
        }
    }

    /// Operator guidance for what to run while the tenant sits in this phase.
    pub fn next_step_hint(&self) -> &'static str {
        use OnboardingPhase::*;
        match self {
            Init => "Add staff with add_staff_batch, or service categories with add_categories_batch.",
            Staff => "Add staff with add_staff_batch.",
            Categories => "Add service categories with add_categories_batch.",
            Services => "Add services with add_services_batch (needs category ids).",
            Schedules => "Schedules are not managed by this tool; continue with import_clients.",
            Clients => "Import clients with import_clients.",
            TestBookings => "Create test bookings with create_test_bookings.",
            Complete => "Onboarding is complete. Nothing left to do.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Staff => "staff",
            Self::Categories => "categories",
            Self::Services => "services",
            Self::Schedules => "schedules",
            Self::Clients => "clients",
            Self::TestBookings => "test_bookings",
            Self::Complete => "complete",
        }
    }
}

impl Default for OnboardingPhase {
    fn default() -> Self {
        Self::Init
    }
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnboardingPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown onboarding phase: {s}"))
    }
}

/// Durable record of one phase's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub completed: bool,
    /// Remote ids of entities created in this phase, in creation order.
    pub entity_ids: Vec<u64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Checkpoint {
    pub fn new(entity_ids: Vec<u64>) -> Self {
        Self {
            completed: true,
            entity_ids,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Persisted onboarding state for one tenant.
///
/// Stored as `<state_dir>/<tenant_id>/state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingState {
    pub tenant_id: u64,
    pub phase: OnboardingPhase,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub checkpoints: BTreeMap<OnboardingPhase, Checkpoint>,
    /// Auxiliary data; not interpreted by the engine.
    #[serde(default = "empty_context")]
    pub context: serde_json::Value,
}

fn empty_context() -> serde_json::Value {
    serde_json::json!({})
}

impl OnboardingState {
    /// A fresh session in phase `init` with no checkpoints.
    pub fn new(tenant_id: u64) -> Self {
        let now = Utc::now();
        Self {
            tenant_id,
            phase: OnboardingPhase::Init,
            started_at: now,
            updated_at: now,
            checkpoints: BTreeMap::new(),
            context: empty_context(),
        }
    }

    /// Replace the checkpoint for `phase` wholesale and move to that phase.
    pub fn record_checkpoint(&mut self, phase: OnboardingPhase, checkpoint: Checkpoint) {
        self.checkpoints.insert(phase, checkpoint);
        self.set_phase(phase);
    }

    /// Record `phase`'s checkpoint and move on to `next` in one update.
    pub fn complete_phase(
        &mut self,
        phase: OnboardingPhase,
        checkpoint: Checkpoint,
        next: OnboardingPhase,
    ) {
        self.checkpoints.insert(phase, checkpoint);
        self.set_phase(next);
    }

    pub fn set_phase(&mut self, phase: OnboardingPhase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }

    /// Entity ids recorded for `phase`, empty if the phase has no checkpoint.
    pub fn entity_ids(&self, phase: OnboardingPhase) -> &[u64] {
        self.checkpoints
            .get(&phase)
            .map(|c| c.entity_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Sum of recorded entity ids across all checkpoints.
    pub fn total_entities(&self) -> usize {
        self.checkpoints.values().map(|c| c.entity_ids.len()).sum()
    }
}
