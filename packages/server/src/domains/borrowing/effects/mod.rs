//! Side effects for committed borrow-request transitions.
//!
//! Consumed by the outbox dispatcher, one call per committed transition.
//! Effects are thin orchestrators: load context, fan out to the
//! notification templates for the new status, write inbox rows, attempt a
//! push. A failed delivery is logged and skipped; it never propagates back
//! into the lifecycle.

mod templates;

use anyhow::Context;
use tracing::warn;

use crate::common::UserId;
use crate::domains::borrowing::events::TransitionEvent;
use crate::domains::borrowing::machine::RequestStatus;
use crate::domains::notifications::models::{Notification, NotificationKind};
use crate::kernel::ServerDeps;

use templates::Template;

/// Fan a committed transition out to its notification templates.
///
/// Invoked exactly once per committed transition, after persistence.
pub async fn handle_transition(event: &TransitionEvent, deps: &ServerDeps) -> anyhow::Result<()> {
    let request = deps
        .requests
        .find_by_id(event.request_id)
        .await
        .context("loading request for side effects")?;
    let tool = deps
        .tools
        .find_by_id(request.tool_id)
        .await
        .context("loading tool for side effects")?;
    let owner = deps
        .users
        .find_by_id(request.owner_id)
        .await
        .context("loading owner for side effects")?;
    let borrower = deps
        .users
        .find_by_id(request.borrower_id)
        .await
        .context("loading borrower for side effects")?;

    let templates = match event.status {
        RequestStatus::Pending => vec![Template::request_received(&borrower, &tool, &request)],
        RequestStatus::Accepted => vec![Template::request_accepted(&owner, &tool, &request)],
        RequestStatus::Rejected => vec![Template::request_rejected(&owner, &tool, &request)],
        RequestStatus::Collected => vec![Template::tool_collected(&borrower, &tool, &request)],
        RequestStatus::Returned => vec![Template::tool_returned(&borrower, &tool, &request)],
        RequestStatus::Completed => vec![
            Template::completed(request.owner_id, &borrower, &tool, &request),
            Template::completed(request.borrower_id, &owner, &tool, &request),
            Template::review_reminder(request.owner_id, &borrower, &request),
            Template::review_reminder(request.borrower_id, &owner, &request),
        ],
        RequestStatus::Cancelled => {
            // Notify whichever participant did not cancel.
            match request.counterpart_of(event.actor_id) {
                Some(recipient) => {
                    let actor_name = if event.actor_id == request.owner_id {
                        &owner.full_name
                    } else {
                        &borrower.full_name
                    };
                    vec![Template::request_cancelled(
                        recipient, actor_name, &tool, &request,
                    )]
                }
                None => {
                    warn!(request_id = %event.request_id, "cancel actor is not a participant");
                    vec![]
                }
            }
        }
    };

    for template in templates {
        deliver(template, deps).await;
    }
    Ok(())
}

/// Write the inbox row and attempt a best-effort push.
async fn deliver(template: Template, deps: &ServerDeps) {
    let Template {
        recipient,
        kind,
        message,
        related_request,
    } = template;

    let notification = Notification::new(recipient, kind, message, Some(related_request));
    let title = notification.title.clone();
    let body = notification.message.clone();

    if let Err(e) = deps.notifications.insert(notification).await {
        warn!(user_id = %recipient, error = %e, "failed to store notification");
        return;
    }

    push_to(recipient, kind, &title, &body, deps).await;
}

async fn push_to(
    recipient: UserId,
    kind: NotificationKind,
    title: &str,
    body: &str,
    deps: &ServerDeps,
) {
    let user = match deps.users.find_by_id(recipient).await {
        Ok(user) => user,
        Err(e) => {
            warn!(user_id = %recipient, error = %e, "failed to load push recipient");
            return;
        }
    };

    let Some(device_token) = user.device_token else {
        return;
    };

    let data = serde_json::json!({ "kind": kind.as_str() });
    if let Err(e) = deps
        .push
        .send_notification(&device_token, title, body, data)
        .await
    {
        warn!(user_id = %recipient, error = %e, "push delivery failed");
    }
}
