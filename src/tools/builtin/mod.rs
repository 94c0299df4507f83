//! Built-in tools exposing the onboarding operations.

pub mod onboarding;
