//! HTTP client for the platform's REST admin API.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::ApiError;

use super::{
    CreatedEntity, NewBooking, NewClient, NewService, NewServiceCategory, NewStaff, PlatformApi,
};

const ACCEPT: &str = "application/vnd.api.v2+json";

/// reqwest-backed [`PlatformApi`].
pub struct HttpPlatformClient {
    http: reqwest::Client,
    base_url: String,
    partner_token: SecretString,
    user_token: Option<SecretString>,
}

impl HttpPlatformClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            partner_token: config.partner_token.clone(),
            user_token: config.user_token.clone(),
        })
    }

    fn authorization(&self) -> String {
        match &self.user_token {
            Some(user) => format!(
                "Bearer {}, User {}",
                self.partner_token.expose_secret(),
                user.expose_secret()
            ),
            None => format!("Bearer {}", self.partner_token.expose_secret()),
        }
    }

    async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<CreatedEntity, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        parse_envelope(path, status, &text)
    }
}

/// Interpret a `{"success": .., "data": {"id": ..}, "meta": {"message": ..}}` envelope.
pub(crate) fn parse_envelope(
    endpoint: &str,
    status: u16,
    body: &str,
) -> Result<CreatedEntity, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: format!("not JSON ({e})"),
        })?;

    let success = value
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or((200..300).contains(&status));

    if !success || !(200..300).contains(&status) {
        let message = value
            .pointer("/meta/message")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("no error message returned")
            .to_string();
        return Err(ApiError::Rejected { status, message });
    }

    // Some endpoints wrap a single entity in a one-element array.
    let data = match value.get("data") {
        Some(serde_json::Value::Array(items)) => items.first(),
        other => other,
    };

    data.and_then(|d| d.get("id"))
        .and_then(|id| id.as_u64())
        .map(|id| CreatedEntity { id })
        .ok_or_else(|| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: "response has no numeric data.id".to_string(),
        })
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    fn is_authenticated(&self) -> bool {
        self.user_token.is_some()
    }

    async fn create_service_category(
        &self,
        tenant_id: u64,
        category: &NewServiceCategory,
    ) -> Result<CreatedEntity, ApiError> {
        self.post(&format!("/service_categories/{tenant_id}"), category)
            .await
    }

    async fn create_staff(
        &self,
        tenant_id: u64,
        staff: &NewStaff,
    ) -> Result<CreatedEntity, ApiError> {
        self.post(&format!("/company/{tenant_id}/staff/quick"), staff)
            .await
    }

    async fn create_service(
        &self,
        tenant_id: u64,
        service: &NewService,
    ) -> Result<CreatedEntity, ApiError> {
        let endpoint = format!("/company/{tenant_id}/services");
        // The API takes seconds; records carry minutes.
        let duration_secs = service.duration.checked_mul(60).ok_or_else(|| {
            ApiError::RequestFailed {
                endpoint: endpoint.clone(),
                reason: format!("duration of {} minutes is out of range", service.duration),
            }
        })?;
        let body = serde_json::json!({
            "title": service.title,
            "category_id": service.category_id,
            "price_min": service.price_min,
            "price_max": service.price_max.unwrap_or(service.price_min),
            "duration": duration_secs,
            "comment": service.comment,
        });
        self.post(&endpoint, &body).await
    }

    async fn create_client(
        &self,
        tenant_id: u64,
        client: &NewClient,
    ) -> Result<CreatedEntity, ApiError> {
        self.post(&format!("/clients/{tenant_id}"), client).await
    }

    async fn create_booking(
        &self,
        tenant_id: u64,
        booking: &NewBooking,
    ) -> Result<CreatedEntity, ApiError> {
        let body = serde_json::json!({
            "staff_id": booking.staff_id,
            "services": [{ "id": booking.service_id }],
            "client": booking.client,
            "datetime": booking.datetime,
            "seance_length": booking.seance_length,
            "comment": booking.comment,
        });
        self.post(&format!("/records/{tenant_id}"), &body).await
    }
}
