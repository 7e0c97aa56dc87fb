//! Shared fixtures for the integration suite: an in-memory dependency set,
//! a lifecycle engine wired to a raw outbox receiver, and seeding helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use server_core::common::UserId;
use server_core::domains::borrowing::engine::LifecycleEngine;
use server_core::domains::borrowing::events::TransitionEvent;
use server_core::domains::borrowing::models::BorrowRequest;
use server_core::domains::borrowing::store::CreateRequest;
use server_core::domains::tools::models::Tool;
use server_core::domains::tools::store::NewTool;
use server_core::domains::users::models::User;
use server_core::domains::users::store::NewUser;
use server_core::kernel::test_dependencies::MockPushNotificationService;
use server_core::kernel::{ServerDeps, TestDependencies, TransitionOutbox};

pub struct TestContext {
    pub deps: Arc<ServerDeps>,
    pub engine: Arc<LifecycleEngine>,
    pub events: UnboundedReceiver<TransitionEvent>,
    pub push: Arc<MockPushNotificationService>,
}

/// In-memory dependencies plus an engine whose outbox receiver is handed
/// back raw, so tests can assert on emitted events directly.
pub fn context() -> TestContext {
    let test_deps = TestDependencies::new();
    let push = test_deps.push.clone();
    let deps = test_deps.into_deps();
    let (outbox, events) = TransitionOutbox::channel();
    let engine = Arc::new(LifecycleEngine::new(deps.requests.clone(), outbox));
    TestContext {
        deps,
        engine,
        events,
        push,
    }
}

pub async fn seed_user(deps: &ServerDeps, name: &str) -> User {
    deps.users
        .insert(NewUser {
            full_name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            phone_number: Some("+15550100".to_string()),
            latitude: 44.98,
            longitude: -93.27,
            address: None,
            device_token: None,
        })
        .await
        .unwrap()
}

pub async fn seed_user_with_device(deps: &ServerDeps, name: &str, token: &str) -> User {
    deps.users
        .insert(NewUser {
            full_name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            phone_number: Some("+15550100".to_string()),
            latitude: 44.98,
            longitude: -93.27,
            address: None,
            device_token: Some(token.to_string()),
        })
        .await
        .unwrap()
}

pub async fn seed_tool(deps: &ServerDeps, owner: UserId, name: &str) -> Tool {
    deps.tools
        .insert(NewTool {
            owner_id: owner,
            name: name.to_string(),
            description: "A well-kept tool".to_string(),
            category: "Power Tools".to_string(),
            condition: "Good".to_string(),
            image_urls: vec![],
            rental_fee: 0.0,
        })
        .await
        .unwrap()
}

/// Create a PENDING request from `borrower` against `tool`.
pub async fn pending_request(
    ctx: &TestContext,
    borrower: UserId,
    tool: &Tool,
    message: Option<&str>,
) -> BorrowRequest {
    let now = chrono::Utc::now();
    ctx.engine
        .create_request(CreateRequest {
            tool_id: tool.id,
            borrower_id: borrower,
            start_date: now + chrono::Duration::days(1),
            end_date: now + chrono::Duration::days(3),
            message: message.map(|m| m.to_string()),
        })
        .await
        .unwrap()
}

/// Poll until `check` passes or two seconds elapse.
pub async fn wait_until<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if check().await {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("condition not reached within deadline");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
