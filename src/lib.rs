//! Tenant onboarding: resumable, checkpointed provisioning of a company.

pub mod config;
pub mod error;
pub mod input;
pub mod onboarding;
pub mod platform;
pub mod rpc;
pub mod tools;
