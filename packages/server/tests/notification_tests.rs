//! Dispatcher behavior: exactly-once emission, template fan-out into the
//! inbox, push delivery, and failure isolation.

mod common;

use std::sync::Arc;

use common::{context, pending_request, seed_tool, seed_user, seed_user_with_device, wait_until};
use server_core::domains::borrowing::engine::LifecycleEngine;
use server_core::domains::borrowing::machine::{RequestStatus, TransitionAction};
use server_core::domains::notifications::models::NotificationKind;
use server_core::kernel::test_dependencies::FailingPushService;
use server_core::kernel::{spawn_dispatcher, TestDependencies, TransitionOutbox};

#[tokio::test]
async fn engine_emits_exactly_one_event_per_committed_transition() {
    let mut ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Drill").await;

    let request = pending_request(&ctx, borrower.id, &tool, None).await;
    for (actor, action) in [
        (owner.id, TransitionAction::Accept),
        (borrower.id, TransitionAction::Collect),
        (borrower.id, TransitionAction::Return),
        (owner.id, TransitionAction::Complete),
    ] {
        ctx.engine.apply(actor, request.id, action, None).await.unwrap();
    }

    // A failed attempt must not emit
    ctx.engine
        .apply(owner.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap_err();

    let expected = [
        (RequestStatus::Pending, borrower.id),
        (RequestStatus::Accepted, owner.id),
        (RequestStatus::Collected, borrower.id),
        (RequestStatus::Returned, borrower.id),
        (RequestStatus::Completed, owner.id),
    ];
    for (status, actor) in expected {
        let event = ctx.events.recv().await.unwrap();
        assert_eq!(event.request_id, request.id);
        assert_eq!(event.status, status);
        assert_eq!(event.actor_id, actor);
    }
    assert!(
        ctx.events.try_recv().is_err(),
        "no extra events may be emitted"
    );
}

#[tokio::test]
async fn fan_out_writes_the_expected_inbox_rows() {
    let test_deps = TestDependencies::new();
    let push = test_deps.push.clone();
    let deps = test_deps.into_deps();
    let (outbox, rx) = TransitionOutbox::channel();
    spawn_dispatcher(rx, deps.clone());
    let engine = Arc::new(LifecycleEngine::new(deps.requests.clone(), outbox));

    let owner = seed_user_with_device(&deps, "Olive", "fcm-token-owner").await;
    let borrower = seed_user(&deps, "Bram").await;
    let tool = seed_tool(&deps, owner.id, "Drill").await;

    let now = chrono::Utc::now();
    let request = engine
        .create_request(server_core::domains::borrowing::store::CreateRequest {
            tool_id: tool.id,
            borrower_id: borrower.id,
            start_date: now + chrono::Duration::days(1),
            end_date: now + chrono::Duration::days(2),
            message: Some("hi".to_string()),
        })
        .await
        .unwrap();

    // New request notifies the owner
    wait_until(|| {
        let deps = deps.clone();
        let owner_id = owner.id;
        async move { !deps.notifications.list_for_user(owner_id).await.unwrap().is_empty() }
    })
    .await;
    let inbox = deps.notifications.list_for_user(owner.id).await.unwrap();
    assert_eq!(inbox[0].kind, NotificationKind::RequestReceived);
    assert!(inbox[0].message.contains("Bram"));
    assert!(inbox[0].message.contains("Drill"));
    assert_eq!(inbox[0].related_request, Some(request.id));

    // Owner has a device token, so the push went out as well
    assert!(push.was_sent_with_title("Request Received"));

    // Accept notifies the borrower with the owner's contact details
    engine
        .apply(owner.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap();
    wait_until(|| {
        let deps = deps.clone();
        let borrower_id = borrower.id;
        async move {
            !deps
                .notifications
                .list_for_user(borrower_id)
                .await
                .unwrap()
                .is_empty()
        }
    })
    .await;
    let inbox = deps.notifications.list_for_user(borrower.id).await.unwrap();
    assert_eq!(inbox[0].kind, NotificationKind::RequestAccepted);
    assert!(inbox[0].message.contains("+15550100"));
    // Borrower has no device token: no push for them
    assert_eq!(push.sent_notifications().len(), 1);

    // Completion notifies both participants plus two review reminders
    engine
        .apply(borrower.id, request.id, TransitionAction::Collect, None)
        .await
        .unwrap();
    engine
        .apply(borrower.id, request.id, TransitionAction::Return, None)
        .await
        .unwrap();
    engine
        .apply(owner.id, request.id, TransitionAction::Complete, None)
        .await
        .unwrap();

    wait_until(|| {
        let deps = deps.clone();
        let borrower_id = borrower.id;
        async move {
            deps.notifications
                .list_unread(borrower_id)
                .await
                .unwrap()
                .iter()
                .any(|n| n.kind == NotificationKind::ReviewReminder)
        }
    })
    .await;

    let owner_kinds: Vec<NotificationKind> = deps
        .notifications
        .list_for_user(owner.id)
        .await
        .unwrap()
        .iter()
        .map(|n| n.kind)
        .collect();
    assert!(owner_kinds.contains(&NotificationKind::ToolCollected));
    assert!(owner_kinds.contains(&NotificationKind::ToolReturned));
    assert!(owner_kinds.contains(&NotificationKind::TransactionCompleted));
    assert!(owner_kinds.contains(&NotificationKind::ReviewReminder));

    let borrower_kinds: Vec<NotificationKind> = deps
        .notifications
        .list_for_user(borrower.id)
        .await
        .unwrap()
        .iter()
        .map(|n| n.kind)
        .collect();
    assert!(borrower_kinds.contains(&NotificationKind::TransactionCompleted));
    assert!(borrower_kinds.contains(&NotificationKind::ReviewReminder));
}

#[tokio::test]
async fn cancellation_notifies_the_other_participant() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.into_deps();
    let (outbox, rx) = TransitionOutbox::channel();
    spawn_dispatcher(rx, deps.clone());
    let engine = Arc::new(LifecycleEngine::new(deps.requests.clone(), outbox));

    let owner = seed_user(&deps, "Olive").await;
    let borrower = seed_user(&deps, "Bram").await;
    let tool = seed_tool(&deps, owner.id, "Ladder").await;

    let now = chrono::Utc::now();
    let request = engine
        .create_request(server_core::domains::borrowing::store::CreateRequest {
            tool_id: tool.id,
            borrower_id: borrower.id,
            start_date: now + chrono::Duration::days(1),
            end_date: now + chrono::Duration::days(2),
            message: None,
        })
        .await
        .unwrap();

    engine
        .apply(
            borrower.id,
            request.id,
            TransitionAction::Cancel,
            Some("changed mind".to_string()),
        )
        .await
        .unwrap();

    wait_until(|| {
        let deps = deps.clone();
        let owner_id = owner.id;
        async move {
            deps.notifications
                .list_for_user(owner_id)
                .await
                .unwrap()
                .iter()
                .any(|n| n.kind == NotificationKind::RequestCancelled)
        }
    })
    .await;

    // The canceller did not get a cancellation notice
    let borrower_inbox = deps.notifications.list_for_user(borrower.id).await.unwrap();
    assert!(borrower_inbox
        .iter()
        .all(|n| n.kind != NotificationKind::RequestCancelled));
}

#[tokio::test]
async fn push_failure_never_reaches_the_lifecycle() {
    let test_deps = TestDependencies::new();
    let deps = test_deps.deps_with_push(Arc::new(FailingPushService));
    let (outbox, rx) = TransitionOutbox::channel();
    spawn_dispatcher(rx, deps.clone());
    let engine = Arc::new(LifecycleEngine::new(deps.requests.clone(), outbox));

    let owner = seed_user_with_device(&deps, "Olive", "fcm-token-owner").await;
    let borrower = seed_user(&deps, "Bram").await;
    let tool = seed_tool(&deps, owner.id, "Drill").await;

    let now = chrono::Utc::now();
    // The transition succeeds even though every push send fails
    let request = engine
        .create_request(server_core::domains::borrowing::store::CreateRequest {
            tool_id: tool.id,
            borrower_id: borrower.id,
            start_date: now + chrono::Duration::days(1),
            end_date: now + chrono::Duration::days(2),
            message: None,
        })
        .await
        .unwrap();
    let accepted = engine
        .apply(owner.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);

    // The inbox row still landed; only the push leg failed
    wait_until(|| {
        let deps = deps.clone();
        let owner_id = owner.id;
        async move { !deps.notifications.list_for_user(owner_id).await.unwrap().is_empty() }
    })
    .await;
}
