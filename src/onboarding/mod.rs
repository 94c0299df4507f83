//! Onboarding orchestration, provisioning a company step by step.
//!
//! A session moves through fixed phases (staff, categories, services,
//! clients, test bookings). Each batch step creates entities on the remote
//! platform one at a time, tolerates per-item failures, and durably records
//! what it created so the workflow can resume after a restart.

pub mod batch;
pub mod bookings;
pub mod engine;
pub mod report;
pub mod state;
pub mod store;

pub use batch::{BatchOutcome, ItemFailure, run_batch};
pub use engine::OnboardingEngine;
pub use state::{Checkpoint, OnboardingPhase, OnboardingState};
pub use store::StateStore;
