//! OnboardingEngine: runs each onboarding step and records its checkpoint.
//!
//! Every public operation checks authentication first. Batch operations then
//! validate their whole payload, confirm a session exists, create entities one
//! by one, and persist whatever succeeded before advancing the phase.

use std::sync::Arc;

use chrono::Local;

use crate::config::BookingDefaults;
use crate::error::{Error, Result};
use crate::input::validate::{FieldError, ValidationErrors};
use crate::input::{BatchInput, CsvTokenizer, RowTokenizer, resolve_batch};
use crate::platform::{NewClient, NewService, NewServiceCategory, NewStaff, PlatformApi};

use super::batch::{BatchOutcome, run_batch};
use super::bookings::{MAX_TEST_BOOKINGS, plan_test_bookings};
use super::report;
use super::state::{Checkpoint, OnboardingPhase, OnboardingState};
use super::store::StateStore;

/// Drives onboarding for any number of tenants against one platform.
pub struct OnboardingEngine {
    store: StateStore,
    api: Arc<dyn PlatformApi>,
    tokenizer: Arc<dyn RowTokenizer>,
    bookings: BookingDefaults,
}

impl OnboardingEngine {
    pub fn new(store: StateStore, api: Arc<dyn PlatformApi>) -> Self {
        Self {
            store,
            api,
            tokenizer: Arc::new(CsvTokenizer::default()),
            bookings: BookingDefaults::default(),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn RowTokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_booking_defaults(mut self, bookings: BookingDefaults) -> Self {
        self.bookings = bookings;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Fail with [`Error::AuthenticationRequired`] unless the operator is logged in.
    pub fn require_auth(&self) -> Result<()> {
        if self.api.is_authenticated() {
            Ok(())
        } else {
            Err(Error::AuthenticationRequired)
        }
    }

    /// Load a tenant's state, treating absence as an error.
    pub async fn load_state(&self, tenant_id: u64) -> Result<OnboardingState> {
        self.store
            .load(tenant_id)
            .await?
            .ok_or(Error::NoSessionFound { tenant_id })
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Begin (or restart) onboarding for a tenant.
    pub async fn start(&self, tenant_id: u64) -> Result<String> {
        self.require_auth()?;
        let state = self.store.start(tenant_id).await?;
        tracing::info!(tenant_id, "Onboarding session started");
        Ok(format!(
            "Onboarding session started for company {tenant_id}\nCurrent phase: {}\nStarted: {}\nNext step: {}",
            state.phase,
            state.started_at.to_rfc3339(),
            state.phase.next_step_hint()
        ))
    }

    pub async fn resume(&self, tenant_id: u64) -> Result<String> {
        self.require_auth()?;
        let state = self.load_state(tenant_id).await?;
        Ok(report::render_resume(&state))
    }

    pub async fn status(&self, tenant_id: u64) -> Result<String> {
        self.require_auth()?;
        let state = self.load_state(tenant_id).await?;
        Ok(report::render_status(&state))
    }

    // ── Checkpoints ─────────────────────────────────────────────────

    /// Record a phase's created ids, replacing any earlier checkpoint for it.
    pub async fn checkpoint(
        &self,
        tenant_id: u64,
        phase: OnboardingPhase,
        entity_ids: Vec<u64>,
        metadata: Option<serde_json::Value>,
    ) -> Result<OnboardingState> {
        let mut state = self.load_state(tenant_id).await?;
        let count = entity_ids.len();
        let mut checkpoint = Checkpoint::new(entity_ids);
        checkpoint.metadata = metadata;
        state.record_checkpoint(phase, checkpoint);
        self.store.save(&state).await?;
        tracing::info!(tenant_id, %phase, entities = count, "Checkpoint recorded");
        Ok(state)
    }

    pub async fn update_phase(
        &self,
        tenant_id: u64,
        phase: OnboardingPhase,
    ) -> Result<OnboardingState> {
        let mut state = self.load_state(tenant_id).await?;
        state.set_phase(phase);
        self.store.save(&state).await?;
        tracing::debug!(tenant_id, %phase, "Phase updated");
        Ok(state)
    }

    /// Record a phase's checkpoint and advance to `next` with a single save.
    async fn commit_phase(
        &self,
        tenant_id: u64,
        phase: OnboardingPhase,
        entity_ids: Vec<u64>,
        metadata: serde_json::Value,
        next: OnboardingPhase,
    ) -> Result<OnboardingState> {
        let mut state = self.load_state(tenant_id).await?;
        let count = entity_ids.len();
        state.complete_phase(phase, Checkpoint::new(entity_ids).with_metadata(metadata), next);
        self.store.save(&state).await?;
        tracing::info!(tenant_id, %phase, %next, entities = count, "Checkpoint recorded");
        Ok(state)
    }

    /// Checkpoint a finished batch, advance to the phase's successor, summarize.
    async fn finish_batch(
        &self,
        tenant_id: u64,
        phase: OnboardingPhase,
        entity: &str,
        outcome: &BatchOutcome,
    ) -> Result<String> {
        let failed: Vec<&str> = outcome.failed.iter().map(|f| f.label.as_str()).collect();
        let metadata = serde_json::json!({
            "attempted": outcome.attempted(),
            "failed": failed,
        });
        let next = phase.successor().unwrap_or(phase);
        self.commit_phase(tenant_id, phase, outcome.succeeded.clone(), metadata, next)
            .await?;

        tracing::info!(
            tenant_id,
            %phase,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Batch finished"
        );
        Ok(report::render_batch(entity, tenant_id, outcome, next))
    }

    // ── Batch phases ────────────────────────────────────────────────

    pub async fn add_categories_batch(
        &self,
        tenant_id: u64,
        input: BatchInput<NewServiceCategory>,
    ) -> Result<String> {
        self.require_auth()?;
        let categories = resolve_batch(input, self.tokenizer.as_ref())?;
        self.load_state(tenant_id).await?;

        let outcome = run_batch(
            &categories,
            |c| c.title.clone(),
            |c| self.api.create_service_category(tenant_id, c),
        )
        .await;
        self.finish_batch(tenant_id, OnboardingPhase::Categories, "Category", &outcome)
            .await
    }

    pub async fn add_staff_batch(
        &self,
        tenant_id: u64,
        input: BatchInput<NewStaff>,
    ) -> Result<String> {
        self.require_auth()?;
        let staff = resolve_batch(input, self.tokenizer.as_ref())?;
        self.load_state(tenant_id).await?;

        let outcome = run_batch(
            &staff,
            |s| s.name.clone(),
            |s| self.api.create_staff(tenant_id, s),
        )
        .await;
        self.finish_batch(tenant_id, OnboardingPhase::Staff, "Staff", &outcome)
            .await
    }

    pub async fn add_services_batch(
        &self,
        tenant_id: u64,
        input: BatchInput<NewService>,
    ) -> Result<String> {
        self.require_auth()?;
        let services = resolve_batch(input, self.tokenizer.as_ref())?;
        self.load_state(tenant_id).await?;

        let outcome = run_batch(
            &services,
            |s| s.title.clone(),
            |s| self.api.create_service(tenant_id, s),
        )
        .await;
        self.finish_batch(tenant_id, OnboardingPhase::Services, "Service", &outcome)
            .await
    }

    pub async fn import_clients(
        &self,
        tenant_id: u64,
        input: BatchInput<NewClient>,
    ) -> Result<String> {
        self.require_auth()?;
        let clients = resolve_batch(input, self.tokenizer.as_ref())?;
        self.load_state(tenant_id).await?;

        let outcome = run_batch(
            &clients,
            |c| c.name.clone(),
            |c| self.api.create_client(tenant_id, c),
        )
        .await;
        self.finish_batch(tenant_id, OnboardingPhase::Clients, "Client", &outcome)
            .await
    }

    // ── Final phase ─────────────────────────────────────────────────

    /// Create `count` (1–10) synthetic bookings rotating over created staff and services.
    ///
    /// Failed bookings are logged and left out of the checkpoint.
    pub async fn create_test_bookings(&self, tenant_id: u64, count: u32) -> Result<String> {
        self.require_auth()?;
        if !(1..=MAX_TEST_BOOKINGS).contains(&count) {
            return Err(ValidationErrors(vec![FieldError::new(
                None,
                "count",
                format!("must be between 1 and {MAX_TEST_BOOKINGS}, got {count}"),
            )])
            .into());
        }

        let state = self.load_state(tenant_id).await?;
        let staff_ids = state.entity_ids(OnboardingPhase::Staff);
        let service_ids = state.entity_ids(OnboardingPhase::Services);

        let missing: Vec<&str> = [("staff", staff_ids), ("services", service_ids)]
            .into_iter()
            .filter(|(_, ids)| ids.is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(Error::PrerequisiteMissing(format!(
                "test bookings need created staff and services; no ids recorded for: {}",
                missing.join(", ")
            )));
        }

        let plan = plan_test_bookings(
            staff_ids,
            service_ids,
            count,
            Local::now().date_naive(),
            self.bookings,
        );
        let outcome = run_batch(
            &plan,
            |b| b.client.name.clone(),
            |b| self.api.create_booking(tenant_id, b),
        )
        .await;
        let created = outcome.succeeded.len();

        let state = self
            .commit_phase(
                tenant_id,
                OnboardingPhase::TestBookings,
                outcome.succeeded,
                serde_json::json!({ "requested": count }),
                OnboardingPhase::Complete,
            )
            .await?;

        tracing::info!(tenant_id, requested = count, created, "Test bookings finished");
        Ok(report::render_test_bookings(&state, count, created))
    }

    /// Advertised by the tool surface but intentionally unimplemented: deleting
    /// remote entities and resetting checkpoints has no defined behavior yet.
    pub async fn rollback_phase(&self, tenant_id: u64, phase: OnboardingPhase) -> Result<String> {
        self.require_auth()?;
        tracing::warn!(tenant_id, %phase, "rollback_phase requested but not implemented");
        Err(Error::Unsupported(format!(
            "rollback_phase is not implemented; checkpoint '{phase}' for company {tenant_id} was left unchanged"
        )))
    }
}
