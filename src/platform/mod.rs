//! Remote platform API: the entity-creation calls the engine drives.
//!
//! The engine only ever talks to [`PlatformApi`]. `http` holds the reqwest
//! implementation used by the binary; tests substitute scripted stubs.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub use http::HttpPlatformClient;

/// The part of a created entity the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEntity {
    pub id: u64,
}

/// A service category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceCategory {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

/// A staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub specialization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

/// A bookable service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    pub title: String,
    pub category_id: u64,
    pub price_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    /// Duration in minutes.
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A client record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The walk-in client attached to a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingClient {
    pub name: String,
    pub phone: String,
}

/// A booking (record) for one staff member and one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub staff_id: u64,
    pub service_id: u64,
    /// Local date-time, `YYYY-MM-DDTHH:MM:SS`.
    pub datetime: String,
    /// Length in seconds.
    pub seance_length: u32,
    pub client: BookingClient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Entity-creation operations against the remote admin API.
///
/// Every call is scoped to one tenant (company) and either returns the
/// created entity's id or an error carrying a human-readable message.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Whether the operator holds a valid user session.
    fn is_authenticated(&self) -> bool;

    async fn create_service_category(
        &self,
        tenant_id: u64,
        category: &NewServiceCategory,
    ) -> Result<CreatedEntity, ApiError>;

    async fn create_staff(&self, tenant_id: u64, staff: &NewStaff)
    -> Result<CreatedEntity, ApiError>;

    async fn create_service(
        &self,
        tenant_id: u64,
        service: &NewService,
    ) -> Result<CreatedEntity, ApiError>;

    async fn create_client(
        &self,
        tenant_id: u64,
        client: &NewClient,
    ) -> Result<CreatedEntity, ApiError>;

    async fn create_booking(
        &self,
        tenant_id: u64,
        booking: &NewBooking,
    ) -> Result<CreatedEntity, ApiError>;
}
