//! End-to-end lifecycle behavior: guard order, availability coupling,
//! timestamps, counters and the audit trail.

mod common;

use common::{context, pending_request, seed_tool, seed_user};
use server_core::common::{LendingError, RequestId};
use server_core::domains::borrowing::machine::{RequestStatus, TransitionAction};
use server_core::domains::borrowing::store::CreateRequest;

#[tokio::test]
async fn full_lifecycle_happy_path() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive Owner").await;
    let borrower = seed_user(&ctx.deps, "Bram Borrower").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Cordless Drill").await;

    // PENDING
    let request = pending_request(&ctx, borrower.id, &tool, Some("May I?")).await;
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(ctx.deps.tools.find_by_id(tool.id).await.unwrap().is_available);

    // ACCEPTED: item reserved
    let request = ctx
        .engine
        .apply(owner.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Accepted);
    assert!(!ctx.deps.tools.find_by_id(tool.id).await.unwrap().is_available);

    // COLLECTED: collected_at stamped
    let request = ctx
        .engine
        .apply(borrower.id, request.id, TransitionAction::Collect, None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Collected);
    let collected_at = request.collected_at.expect("collected_at set");

    // RETURNED: returned_at stamped
    let request = ctx
        .engine
        .apply(borrower.id, request.id, TransitionAction::Return, None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Returned);
    assert!(request.returned_at.is_some());

    // COMPLETED: item released, counters bumped, completed_at stamped
    let request = ctx
        .engine
        .apply(owner.id, request.id, TransitionAction::Complete, None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Completed);
    assert!(request.completed_at.is_some());
    // collected_at was set once and never touched again
    assert_eq!(request.collected_at, Some(collected_at));

    let tool_after = ctx.deps.tools.find_by_id(tool.id).await.unwrap();
    assert!(tool_after.is_available);
    assert_eq!(tool_after.total_borrows, 1);

    let owner_after = ctx.deps.users.find_by_id(owner.id).await.unwrap();
    let borrower_after = ctx.deps.users.find_by_id(borrower.id).await.unwrap();
    assert_eq!(owner_after.completed_lends, 1);
    assert_eq!(owner_after.completed_borrows, 0);
    assert_eq!(borrower_after.completed_borrows, 1);
    assert_eq!(borrower_after.completed_lends, 0);

    // Timeline: exactly five ordered records ending in the current status
    let timeline = ctx.engine.timeline(owner.id, request.id).await.unwrap();
    let statuses: Vec<_> = timeline.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Collected,
            RequestStatus::Returned,
            RequestStatus::Completed,
        ]
    );
    assert!(timeline.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(timeline.last().unwrap().status, request.status);
}

#[tokio::test]
async fn cancel_pending_with_reason() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Ladder").await;

    let request = pending_request(&ctx, borrower.id, &tool, None).await;
    let request = ctx
        .engine
        .apply(
            borrower.id,
            request.id,
            TransitionAction::Cancel,
            Some("changed mind".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Cancelled);
    assert_eq!(request.cancellation_reason.as_deref(), Some("changed mind"));
    // The item was never reserved; it stays available
    assert!(ctx.deps.tools.find_by_id(tool.id).await.unwrap().is_available);

    let timeline = ctx.engine.timeline(borrower.id, request.id).await.unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[1].note.as_deref(), Some("changed mind"));
}

#[tokio::test]
async fn collect_on_pending_is_invalid_state_and_leaves_no_trace() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Sander").await;

    let request = pending_request(&ctx, borrower.id, &tool, None).await;
    let err = ctx
        .engine
        .apply(borrower.id, request.id, TransitionAction::Collect, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::InvalidState { .. }));

    // No record appended, no availability change
    let timeline = ctx.engine.timeline(borrower.id, request.id).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert!(ctx.deps.tools.find_by_id(tool.id).await.unwrap().is_available);
    let reloaded = ctx.deps.requests.find_by_id(request.id).await.unwrap();
    assert_eq!(reloaded.status, RequestStatus::Pending);
}

#[tokio::test]
async fn wrong_actor_is_unauthorized_before_state_is_considered() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let stranger = seed_user(&ctx.deps, "Sid Stranger").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Jigsaw").await;

    let request = pending_request(&ctx, borrower.id, &tool, None).await;

    // Borrower cannot accept (owner-only), even though the state matches
    let err = ctx
        .engine
        .apply(borrower.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::Unauthorized(_)));

    // Owner cannot collect (borrower-only); the actor guard fires even
    // though the state guard would fail too
    let err = ctx
        .engine
        .apply(owner.id, request.id, TransitionAction::Collect, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::Unauthorized(_)));

    // A non-participant gets an authorization error for everything
    let err = ctx
        .engine
        .apply(stranger.id, request.id, TransitionAction::Cancel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::Unauthorized(_)));
}

#[tokio::test]
async fn terminal_states_permit_no_further_transitions() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;

    // REJECTED
    let tool = seed_tool(&ctx.deps, owner.id, "Wrench Set").await;
    let rejected = pending_request(&ctx, borrower.id, &tool, None).await;
    ctx.engine
        .apply(owner.id, rejected.id, TransitionAction::Reject, None)
        .await
        .unwrap();

    // CANCELLED
    let cancelled = pending_request(&ctx, borrower.id, &tool, None).await;
    ctx.engine
        .apply(owner.id, cancelled.id, TransitionAction::Cancel, None)
        .await
        .unwrap();

    // COMPLETED
    let completed = pending_request(&ctx, borrower.id, &tool, None).await;
    for (actor, action) in [
        (owner.id, TransitionAction::Accept),
        (borrower.id, TransitionAction::Collect),
        (borrower.id, TransitionAction::Return),
        (owner.id, TransitionAction::Complete),
    ] {
        ctx.engine
            .apply(actor, completed.id, action, None)
            .await
            .unwrap();
    }

    for terminal in [rejected.id, cancelled.id, completed.id] {
        for (actor, action) in [
            (owner.id, TransitionAction::Accept),
            (owner.id, TransitionAction::Reject),
            (borrower.id, TransitionAction::Collect),
            (borrower.id, TransitionAction::Return),
            (owner.id, TransitionAction::Complete),
            (borrower.id, TransitionAction::Cancel),
            (owner.id, TransitionAction::Cancel),
        ] {
            let err = ctx.engine.apply(actor, terminal, action, None).await.unwrap_err();
            assert!(
                matches!(err, LendingError::InvalidState { .. }),
                "{:?} from a terminal state must be InvalidState",
                action
            );
        }
    }
}

#[tokio::test]
async fn creation_guards_reject_unavailable_and_self_borrow() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let other = seed_user(&ctx.deps, "Nia Neighbor").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Tile Cutter").await;

    // Self-borrow
    let now = chrono::Utc::now();
    let err = ctx
        .engine
        .create_request(CreateRequest {
            tool_id: tool.id,
            borrower_id: owner.id,
            start_date: now,
            end_date: now + chrono::Duration::days(1),
            message: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::ResourceConflict(_)));

    // Reserve the tool, then creation must conflict
    let request = pending_request(&ctx, borrower.id, &tool, None).await;
    ctx.engine
        .apply(owner.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap();

    let err = ctx
        .engine
        .create_request(CreateRequest {
            tool_id: tool.id,
            borrower_id: other.id,
            start_date: now,
            end_date: now + chrono::Duration::days(1),
            message: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::ResourceConflict(_)));
}

#[tokio::test]
async fn rejecting_validation_before_any_state_is_touched() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Heat Gun").await;

    let now = chrono::Utc::now();
    let err = ctx
        .engine
        .create_request(CreateRequest {
            tool_id: tool.id,
            borrower_id: borrower.id,
            start_date: now + chrono::Duration::days(3),
            end_date: now + chrono::Duration::days(1),
            message: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::Validation(_)));

    assert!(ctx
        .deps
        .requests
        .list_by_borrower(borrower.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn cancel_after_acceptance_restores_availability() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Chainsaw").await;

    let request = pending_request(&ctx, borrower.id, &tool, None).await;
    ctx.engine
        .apply(owner.id, request.id, TransitionAction::Accept, None)
        .await
        .unwrap();
    assert!(!ctx.deps.tools.find_by_id(tool.id).await.unwrap().is_available);

    // Owner cancels post-acceptance
    let request = ctx
        .engine
        .apply(owner.id, request.id, TransitionAction::Cancel, None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Cancelled);
    assert!(ctx.deps.tools.find_by_id(tool.id).await.unwrap().is_available);
}

#[tokio::test]
async fn timeline_is_participants_only() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let stranger = seed_user(&ctx.deps, "Sid").await;
    let tool = seed_tool(&ctx.deps, owner.id, "Router").await;

    let request = pending_request(&ctx, borrower.id, &tool, None).await;

    assert!(ctx.engine.timeline(owner.id, request.id).await.is_ok());
    assert!(ctx.engine.timeline(borrower.id, request.id).await.is_ok());
    let err = ctx.engine.timeline(stranger.id, request.id).await.unwrap_err();
    assert!(matches!(err, LendingError::Unauthorized(_)));
}

#[tokio::test]
async fn missing_request_is_not_found() {
    let ctx = context();
    let user = seed_user(&ctx.deps, "Olive").await;

    let err = ctx
        .engine
        .apply(user.id, RequestId::new(), TransitionAction::Accept, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::NotFound(_)));

    let err = ctx.engine.timeline(user.id, RequestId::new()).await.unwrap_err();
    assert!(matches!(err, LendingError::NotFound(_)));
}

#[tokio::test]
async fn audit_trail_always_matches_current_status() {
    let ctx = context();
    let owner = seed_user(&ctx.deps, "Olive").await;
    let borrower = seed_user(&ctx.deps, "Bram").await;
    let tool_a = seed_tool(&ctx.deps, owner.id, "Drill").await;
    let tool_b = seed_tool(&ctx.deps, owner.id, "Saw").await;

    let a = pending_request(&ctx, borrower.id, &tool_a, None).await;
    ctx.engine
        .apply(owner.id, a.id, TransitionAction::Accept, None)
        .await
        .unwrap();
    ctx.engine
        .apply(borrower.id, a.id, TransitionAction::Collect, None)
        .await
        .unwrap();

    let b = pending_request(&ctx, borrower.id, &tool_b, None).await;
    ctx.engine
        .apply(owner.id, b.id, TransitionAction::Reject, Some("away".into()))
        .await
        .unwrap();

    for id in [a.id, b.id] {
        let request = ctx.deps.requests.find_by_id(id).await.unwrap();
        let timeline = ctx.deps.requests.timeline(id).await.unwrap();
        assert_eq!(timeline.last().unwrap().status, request.status);
    }
}
