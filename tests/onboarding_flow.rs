//! End-to-end onboarding runs against a scripted platform.
//!
//! Each test uses its own temporary state directory and a stub
//! `PlatformApi` that hands out sequential ids and rejects chosen labels.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use tenant_onboard::error::{ApiError, Error};
use tenant_onboard::input::BatchInput;
use tenant_onboard::onboarding::{OnboardingEngine, OnboardingPhase, StateStore};
use tenant_onboard::platform::{
    CreatedEntity, NewBooking, NewClient, NewService, NewServiceCategory, NewStaff, PlatformApi,
};
use tenant_onboard::rpc;
use tenant_onboard::tools::ToolRegistry;

/// Records every call; rejects labels listed in `reject`.
struct ScriptedPlatform {
    next_id: AtomicU64,
    reject: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedPlatform {
    fn new(reject: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            reject,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn create(&self, kind: &str, label: &str) -> Result<CreatedEntity, ApiError> {
        self.calls.lock().unwrap().push(format!("{kind}:{label}"));
        if self.reject.iter().any(|r| *r == label) {
            return Err(ApiError::Rejected {
                status: 422,
                message: format!("{label} is already registered"),
            });
        }
        Ok(CreatedEntity {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformApi for ScriptedPlatform {
    fn is_authenticated(&self) -> bool {
        true
    }
    async fn create_service_category(
        &self,
        _tenant_id: u64,
        category: &NewServiceCategory,
    ) -> Result<CreatedEntity, ApiError> {
        self.create("category", &category.title)
    }
    async fn create_staff(&self, _tenant_id: u64, staff: &NewStaff) -> Result<CreatedEntity, ApiError> {
        self.create("staff", &staff.name)
    }
    async fn create_service(
        &self,
        _tenant_id: u64,
        service: &NewService,
    ) -> Result<CreatedEntity, ApiError> {
        self.create("service", &service.title)
    }
    async fn create_client(&self, _tenant_id: u64, client: &NewClient) -> Result<CreatedEntity, ApiError> {
        self.create("client", &client.name)
    }
    async fn create_booking(
        &self,
        _tenant_id: u64,
        booking: &NewBooking,
    ) -> Result<CreatedEntity, ApiError> {
        self.create(
            "booking",
            &format!("{}/{}", booking.staff_id, booking.service_id),
        )
    }
}

fn category(title: &str) -> NewServiceCategory {
    NewServiceCategory {
        title: title.to_string(),
        weight: None,
    }
}

fn staff(name: &str) -> NewStaff {
    NewStaff {
        name: name.to_string(),
        specialization: "Barber".to_string(),
        phone: None,
        email: None,
        weight: None,
    }
}

#[tokio::test]
async fn full_onboarding_scenario() {
    let dir = TempDir::new().unwrap();
    let api = ScriptedPlatform::new(vec!["Y"]);
    let engine = OnboardingEngine::new(StateStore::new(dir.path()), api.clone());

    engine.start(123).await.unwrap();

    engine
        .add_categories_batch(123, BatchInput::Records(vec![category("A"), category("B")]))
        .await
        .unwrap();
    let state = engine.load_state(123).await.unwrap();
    assert_eq!(state.phase, OnboardingPhase::Services);
    assert_eq!(state.entity_ids(OnboardingPhase::Categories).len(), 2);

    let summary = engine
        .add_staff_batch(
            123,
            BatchInput::Records(vec![staff("X"), staff("Y"), staff("Z")]),
        )
        .await
        .unwrap();
    assert!(summary.contains("1 failed"));
    assert!(summary.contains("Y is already registered"));
    let state = engine.load_state(123).await.unwrap();
    assert_eq!(state.phase, OnboardingPhase::Categories);
    assert_eq!(state.entity_ids(OnboardingPhase::Staff).len(), 2);

    let category_id = state.entity_ids(OnboardingPhase::Categories)[0];
    engine
        .add_services_batch(
            123,
            BatchInput::Text(format!(
                "title,category_id,price_min,price_max,duration\nCut,{category_id},20,30,30\nShave,{category_id},10,,15\n"
            )),
        )
        .await
        .unwrap();
    assert_eq!(
        engine.load_state(123).await.unwrap().phase,
        OnboardingPhase::Clients
    );

    engine
        .import_clients(
            123,
            BatchInput::Text("name,phone,email\nAnn,+15550101,\nBen,,ben@example.com\n".into()),
        )
        .await
        .unwrap();
    assert_eq!(
        engine.load_state(123).await.unwrap().phase,
        OnboardingPhase::TestBookings
    );

    let summary = engine.create_test_bookings(123, 5).await.unwrap();
    assert!(summary.contains("Created 5 of 5"));
    assert!(summary.contains("Staff: 2"));
    assert!(summary.contains("Services: 2"));
    assert!(summary.contains("Bookings: 5"));

    let state = engine.load_state(123).await.unwrap();
    assert_eq!(state.phase, OnboardingPhase::Complete);
    assert_eq!(state.entity_ids(OnboardingPhase::TestBookings).len(), 5);

    // Z was still attempted after Y failed.
    let calls = api.calls();
    let staff_calls: Vec<&String> = calls.iter().filter(|c| c.starts_with("staff:")).collect();
    assert_eq!(staff_calls, vec!["staff:X", "staff:Y", "staff:Z"]);
}

#[tokio::test]
async fn resume_after_restart() {
    let dir = TempDir::new().unwrap();
    {
        let engine = OnboardingEngine::new(StateStore::new(dir.path()), ScriptedPlatform::new(vec![]));
        engine.start(77).await.unwrap();
        engine
            .checkpoint(77, OnboardingPhase::Staff, vec![1, 2, 3], None)
            .await
            .unwrap();
    }

    let fresh = OnboardingEngine::new(StateStore::new(dir.path()), ScriptedPlatform::new(vec![]));
    let text = fresh.resume(77).await.unwrap();
    assert!(text.contains("staff: 3 entities created"));
    assert!(text.contains("Current phase: staff"));

    let status = fresh.status(77).await.unwrap();
    assert!(status.contains("Total entities created: 3"));
    assert!(status.contains("Phases with checkpoints: 1"));
}

#[tokio::test]
async fn missing_session_is_reported_not_defaulted() {
    let dir = TempDir::new().unwrap();
    let engine = OnboardingEngine::new(StateStore::new(dir.path()), ScriptedPlatform::new(vec![]));
    let err = engine.resume(999).await.unwrap_err();
    assert!(matches!(err, Error::NoSessionFound { tenant_id: 999 }));
    assert!(err.to_string().contains("999"));
}

#[tokio::test]
async fn test_bookings_before_prerequisites() {
    let dir = TempDir::new().unwrap();
    let api = ScriptedPlatform::new(vec![]);
    let engine = OnboardingEngine::new(StateStore::new(dir.path()), api.clone());
    engine.start(5).await.unwrap();

    let err = engine.create_test_bookings(5, 3).await.unwrap_err();
    assert!(matches!(err, Error::PrerequisiteMissing(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn tenants_do_not_share_state() {
    let dir = TempDir::new().unwrap();
    let engine = OnboardingEngine::new(StateStore::new(dir.path()), ScriptedPlatform::new(vec![]));
    engine.start(1).await.unwrap();
    engine.start(2).await.unwrap();
    engine
        .add_staff_batch(1, BatchInput::Records(vec![staff("Solo")]))
        .await
        .unwrap();

    let other = engine.load_state(2).await.unwrap();
    assert_eq!(other.phase, OnboardingPhase::Init);
    assert!(other.checkpoints.is_empty());
}

#[tokio::test]
async fn dispatcher_round_trip() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(OnboardingEngine::new(
        StateStore::new(dir.path()),
        ScriptedPlatform::new(vec![]),
    ));
    let tools = ToolRegistry::new();
    tools.register_onboarding_tools(engine);

    let listed: Value = serde_json::from_str(
        &rpc::handle_line(&tools, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await,
    )
    .unwrap();
    let names: Vec<&str> = listed["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 9);
    assert!(names.contains(&"rollback_phase"));
    assert!(names.contains(&"import_clients"));

    let call = |id: u64, name: &str, arguments: Value| {
        json!({"jsonrpc": "2.0", "id": id, "method": "tools/call",
               "params": {"name": name, "arguments": arguments}})
    };

    let v = rpc::handle_request(&tools, call(2, "onboarding_start", json!({"company_id": 42}))).await;
    assert_eq!(v["result"]["isError"], false);

    let v = rpc::handle_request(
        &tools,
        call(3, "add_staff_batch", json!({"company_id": 42, "csv": "name,specialization\nAnn,Colorist\n"})),
    )
    .await;
    let text = v["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("1 succeeded, 0 failed"));

    let v = rpc::handle_request(&tools, call(4, "rollback_phase", json!({"company_id": 42, "phase": "staff"}))).await;
    assert_eq!(v["result"]["isError"], true);
    assert!(v["result"]["content"][0]["text"].as_str().unwrap().contains("not implemented"));

    let v = rpc::handle_request(&tools, call(5, "onboarding_status", json!({"company_id": 43}))).await;
    assert_eq!(v["result"]["isError"], true);
    assert!(v["result"]["content"][0]["text"].as_str().unwrap().contains("43"));
}
