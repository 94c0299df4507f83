//! Onboarding tools: one tool per engine operation.
//!
//! Batch tools take `company_id` plus either `records` (a JSON array of typed
//! rows) or `csv` (text with a header row). Every tool answers with a single
//! text block.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::input::BatchInput;
use crate::onboarding::{OnboardingEngine, OnboardingPhase};
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str, require_u64};

/// Test bookings created when `count` is omitted.
const DEFAULT_TEST_BOOKINGS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Start,
    Resume,
    Status,
    AddCategories,
    AddStaff,
    AddServices,
    ImportClients,
    CreateTestBookings,
    RollbackPhase,
}

const ALL_OPERATIONS: [Operation; 9] = [
    Operation::Start,
    Operation::Resume,
    Operation::Status,
    Operation::AddCategories,
    Operation::AddStaff,
    Operation::AddServices,
    Operation::ImportClients,
    Operation::CreateTestBookings,
    Operation::RollbackPhase,
];

/// Build every onboarding tool over a shared engine.
pub fn onboarding_tools(engine: Arc<OnboardingEngine>) -> Vec<Arc<dyn Tool>> {
    ALL_OPERATIONS
        .into_iter()
        .map(|op| {
            Arc::new(OnboardingTool {
                engine: Arc::clone(&engine),
                op,
            }) as Arc<dyn Tool>
        })
        .collect()
}

/// A single onboarding operation exposed as a tool.
pub struct OnboardingTool {
    engine: Arc<OnboardingEngine>,
    op: Operation,
}

fn company_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "description": "Platform company (tenant) id"
    })
}

fn batch_schema(record_fields: serde_json::Value, required: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "company_id": company_schema(),
            "records": {
                "type": "array",
                "description": "Structured records to create",
                "items": {
                    "type": "object",
                    "properties": record_fields,
                    "required": required
                }
            },
            "csv": {
                "type": "string",
                "description": "Comma-separated text with a header row, used when 'records' is absent"
            }
        },
        "required": ["company_id"]
    })
}

/// Read `records` or `csv` into a batch payload.
fn batch_input<T: DeserializeOwned>(params: &serde_json::Value) -> Result<BatchInput<T>, ToolError> {
    if let Some(records) = params.get("records") {
        let records: Vec<T> = serde_json::from_value(records.clone())
            .map_err(|e| ToolError::InvalidParameters(format!("invalid records: {e}")))?;
        return Ok(BatchInput::Records(records));
    }
    match params.get("csv").and_then(|v| v.as_str()) {
        Some(text) => Ok(BatchInput::Text(text.to_string())),
        None => Err(ToolError::InvalidParameters(
            "provide either 'records' or 'csv'".to_string(),
        )),
    }
}

#[async_trait]
impl Tool for OnboardingTool {
    fn name(&self) -> &str {
        match self.op {
            Operation::Start => "onboarding_start",
            Operation::Resume => "onboarding_resume",
            Operation::Status => "onboarding_status",
            Operation::AddCategories => "add_categories_batch",
            Operation::AddStaff => "add_staff_batch",
            Operation::AddServices => "add_services_batch",
            Operation::ImportClients => "import_clients",
            Operation::CreateTestBookings => "create_test_bookings",
            Operation::RollbackPhase => "rollback_phase",
        }
    }

    fn description(&self) -> &str {
        match self.op {
            Operation::Start => {
                "Start a new onboarding session for a company. Replaces any existing \
                 session state for that company."
            }
            Operation::Resume => {
                "Show where an onboarding session left off: current phase, what each \
                 completed step created, and the next step."
            }
            Operation::Status => {
                "Short status of an onboarding session: phase, total entities created, \
                 number of phases with checkpoints."
            }
            Operation::AddCategories => {
                "Create service categories in bulk. Failed items are reported and \
                 skipped; created ids are checkpointed."
            }
            Operation::AddStaff => {
                "Create staff members in bulk. Failed items are reported and skipped; \
                 created ids are checkpointed."
            }
            Operation::AddServices => {
                "Create services in bulk under existing categories. Failed items are \
                 reported and skipped; created ids are checkpointed."
            }
            Operation::ImportClients => {
                "Import clients in bulk. Each client needs a phone or an email. Failed \
                 items are reported and skipped."
            }
            Operation::CreateTestBookings => {
                "Create 1-10 test bookings rotating over the created staff and services, \
                 then mark onboarding complete."
            }
            Operation::RollbackPhase => {
                "Delete the entities created in a phase and reset its checkpoint. \
                 Not implemented yet; always returns an error."
            }
        }
    }

    fn parameters_schema(&self) -> serde_json::Value {
        match self.op {
            Operation::Start | Operation::Resume | Operation::Status => serde_json::json!({
                "type": "object",
                "properties": { "company_id": company_schema() },
                "required": ["company_id"]
            }),
            Operation::AddCategories => batch_schema(
                serde_json::json!({
                    "title": { "type": "string" },
                    "weight": { "type": "integer" }
                }),
                &["title"],
            ),
            Operation::AddStaff => batch_schema(
                serde_json::json!({
                    "name": { "type": "string" },
                    "specialization": { "type": "string" },
                    "phone": { "type": "string" },
                    "email": { "type": "string" },
                    "weight": { "type": "integer" }
                }),
                &["name", "specialization"],
            ),
            Operation::AddServices => batch_schema(
                serde_json::json!({
                    "title": { "type": "string" },
                    "category_id": { "type": "integer" },
                    "price_min": { "type": "number" },
                    "price_max": { "type": "number" },
                    "duration": { "type": "integer", "description": "Minutes" },
                    "comment": { "type": "string" }
                }),
                &["title", "category_id", "price_min", "duration"],
            ),
            Operation::ImportClients => batch_schema(
                serde_json::json!({
                    "name": { "type": "string" },
                    "phone": { "type": "string" },
                    "email": { "type": "string" },
                    "comment": { "type": "string" }
                }),
                &["name"],
            ),
            Operation::CreateTestBookings => serde_json::json!({
                "type": "object",
                "properties": {
                    "company_id": company_schema(),
                    "count": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 10,
                        "default": DEFAULT_TEST_BOOKINGS
                    }
                },
                "required": ["company_id"]
            }),
            Operation::RollbackPhase => serde_json::json!({
                "type": "object",
                "properties": {
                    "company_id": company_schema(),
                    "phase": {
                        "type": "string",
                        "enum": ["staff", "categories", "services", "clients", "test_bookings"]
                    }
                },
                "required": ["company_id", "phase"]
            }),
        }
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let engine = &self.engine;
        engine.require_auth()?;
        let company_id = require_u64(&params, "company_id")?;

        let text = match self.op {
            Operation::Start => engine.start(company_id).await?,
            Operation::Resume => engine.resume(company_id).await?,
            Operation::Status => engine.status(company_id).await?,
            Operation::AddCategories => {
                engine
                    .add_categories_batch(company_id, batch_input(&params)?)
                    .await?
            }
            Operation::AddStaff => engine.add_staff_batch(company_id, batch_input(&params)?).await?,
            Operation::AddServices => {
                engine
                    .add_services_batch(company_id, batch_input(&params)?)
                    .await?
            }
            Operation::ImportClients => engine.import_clients(company_id, batch_input(&params)?).await?,
            Operation::CreateTestBookings => {
                let count = match params.get("count") {
                    None | Some(serde_json::Value::Null) => DEFAULT_TEST_BOOKINGS,
                    Some(_) => require_u64(&params, "count")?,
                };
                let count = u32::try_from(count).map_err(|_| {
                    ToolError::InvalidParameters(format!("count {count} is out of range"))
                })?;
                engine.create_test_bookings(company_id, count).await?
            }
            Operation::RollbackPhase => {
                let phase: OnboardingPhase = require_str(&params, "phase")?
                    .parse()
                    .map_err(ToolError::InvalidParameters)?;
                engine.rollback_phase(company_id, phase).await?
            }
        };

        Ok(ToolOutput::text(text, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::onboarding::StateStore;
    use crate::platform::{
        CreatedEntity, NewBooking, NewClient, NewService, NewServiceCategory, NewStaff, PlatformApi,
    };
    use tempfile::TempDir;

    /// Platform with no user session; any creation call is a test failure.
    struct LoggedOut;

    #[async_trait]
    impl PlatformApi for LoggedOut {
        fn is_authenticated(&self) -> bool {
            false
        }
        async fn create_service_category(
            &self,
            _: u64,
            _: &NewServiceCategory,
        ) -> Result<CreatedEntity, ApiError> {
            unreachable!("logged out")
        }
        async fn create_staff(&self, _: u64, _: &NewStaff) -> Result<CreatedEntity, ApiError> {
            unreachable!("logged out")
        }
        async fn create_service(&self, _: u64, _: &NewService) -> Result<CreatedEntity, ApiError> {
            unreachable!("logged out")
        }
        async fn create_client(&self, _: u64, _: &NewClient) -> Result<CreatedEntity, ApiError> {
            unreachable!("logged out")
        }
        async fn create_booking(&self, _: u64, _: &NewBooking) -> Result<CreatedEntity, ApiError> {
            unreachable!("logged out")
        }
    }

    #[tokio::test]
    async fn logged_out_call_is_not_authorized_even_with_bad_params() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(OnboardingEngine::new(
            StateStore::new(dir.path()),
            Arc::new(LoggedOut),
        ));
        for tool in onboarding_tools(engine) {
            let err = tool
                .execute(serde_json::json!({"company_id": "not a number", "count": -1}))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ToolError::NotAuthorized(_)),
                "{} returned {err:?}",
                tool.name()
            );
        }
    }

    #[test]
    fn batch_input_prefers_records() {
        let params = serde_json::json!({
            "records": [{"title": "Hair"}],
            "csv": "title\nNails"
        });
        let input: BatchInput<NewServiceCategory> = batch_input(&params).unwrap();
        assert!(matches!(input, BatchInput::Records(ref r) if r[0].title == "Hair"));
    }

    #[test]
    fn batch_input_falls_back_to_csv() {
        let params = serde_json::json!({"csv": "name,specialization\nAnn,Barber"});
        let input: BatchInput<NewStaff> = batch_input(&params).unwrap();
        assert!(matches!(input, BatchInput::Text(_)));
    }

    #[test]
    fn batch_input_requires_payload() {
        let err = batch_input::<NewStaff>(&serde_json::json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }

    #[test]
    fn batch_input_rejects_mistyped_records() {
        let params = serde_json::json!({"records": [{"name": "Ann"}]});
        let err = batch_input::<NewStaff>(&params).unwrap_err();
        assert!(err.to_string().contains("invalid records"));
    }
}
