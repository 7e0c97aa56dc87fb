// TestDependencies - in-memory implementations for testing
//
// Provides an in-memory store set and a recording push service that can be
// wired into ServerDeps for tests. All tables live behind one mutex, so a
// store operation (including the multi-table transition apply) executes as
// a single atomic unit, matching the transactional guarantees of the
// Postgres implementations.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::common::{NotificationId, RequestId, StoreError, ToolId, UserId};
use crate::domains::borrowing::machine::{AvailabilityEffect, ReasonSlot, RequestStatus, TimestampSlot};
use crate::domains::borrowing::models::{BorrowRequest, TransitionRecord};
use crate::domains::borrowing::store::{BorrowStore, CreateRequest, TransitionApply};
use crate::domains::notifications::models::Notification;
use crate::domains::notifications::store::NotificationStore;
use crate::domains::tools::models::Tool;
use crate::domains::tools::store::{NewTool, ToolPatch, ToolStore};
use crate::domains::users::models::User;
use crate::domains::users::store::{NewUser, UserStore};
use crate::kernel::deps::ServerDeps;
use crate::kernel::traits::BasePushNotificationService;

// =============================================================================
// MemoryDb - the shared table set
// =============================================================================

#[derive(Default)]
pub struct MemoryDb {
    users: HashMap<UserId, User>,
    tools: HashMap<ToolId, Tool>,
    requests: HashMap<RequestId, BorrowRequest>,
    records: Vec<TransitionRecord>,
    notifications: Vec<Notification>,
    record_seq: i64,
}

impl MemoryDb {
    fn next_record_id(&mut self) -> i64 {
        self.record_seq += 1;
        self.record_seq
    }
}

type SharedDb = Arc<Mutex<MemoryDb>>;

// =============================================================================
// In-memory UserStore
// =============================================================================

pub struct MemoryUserStore {
    db: SharedDb,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            full_name: user.full_name,
            email: user.email,
            phone_number: user.phone_number,
            latitude: user.latitude,
            longitude: user.longitude,
            address: user.address,
            device_token: user.device_token,
            rating: 0.0,
            completed_borrows: 0,
            completed_lends: 0,
            created_at: now,
            updated_at: now,
        };
        self.db.lock().unwrap().users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.db
            .lock()
            .unwrap()
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserMissing)
    }
}

// =============================================================================
// In-memory ToolStore
// =============================================================================

pub struct MemoryToolStore {
    db: SharedDb,
}

#[async_trait]
impl ToolStore for MemoryToolStore {
    async fn insert(&self, tool: NewTool) -> Result<Tool, StoreError> {
        let now = Utc::now();
        let tool = Tool {
            id: ToolId::new(),
            owner_id: tool.owner_id,
            name: tool.name,
            description: tool.description,
            category: tool.category,
            condition: tool.condition,
            image_urls: tool.image_urls,
            is_available: true,
            rental_fee: tool.rental_fee,
            rating: 0.0,
            total_borrows: 0,
            created_at: now,
            updated_at: now,
        };
        self.db.lock().unwrap().tools.insert(tool.id, tool.clone());
        Ok(tool)
    }

    async fn find_by_id(&self, id: ToolId) -> Result<Tool, StoreError> {
        self.db
            .lock()
            .unwrap()
            .tools
            .get(&id)
            .cloned()
            .ok_or(StoreError::ToolMissing)
    }

    async fn list_available(&self) -> Result<Vec<Tool>, StoreError> {
        let db = self.db.lock().unwrap();
        let mut tools: Vec<Tool> = db
            .tools
            .values()
            .filter(|t| t.is_available)
            .cloned()
            .collect();
        // V7 ids are time-ordered; id desc == newest first
        tools.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tools)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Tool>, StoreError> {
        let db = self.db.lock().unwrap();
        let mut tools: Vec<Tool> = db
            .tools
            .values()
            .filter(|t| t.owner_id == owner)
            .cloned()
            .collect();
        tools.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(tools)
    }

    async fn update(&self, id: ToolId, patch: ToolPatch) -> Result<Tool, StoreError> {
        let mut db = self.db.lock().unwrap();
        let tool = db.tools.get_mut(&id).ok_or(StoreError::ToolMissing)?;
        if let Some(name) = patch.name {
            tool.name = name;
        }
        if let Some(description) = patch.description {
            tool.description = description;
        }
        if let Some(category) = patch.category {
            tool.category = category;
        }
        if let Some(condition) = patch.condition {
            tool.condition = condition;
        }
        if let Some(image_urls) = patch.image_urls {
            tool.image_urls = image_urls;
        }
        if let Some(rental_fee) = patch.rental_fee {
            tool.rental_fee = rental_fee;
        }
        tool.updated_at = Utc::now();
        Ok(tool.clone())
    }
}

// =============================================================================
// In-memory BorrowStore
// =============================================================================

pub struct MemoryBorrowStore {
    db: SharedDb,
}

#[async_trait]
impl BorrowStore for MemoryBorrowStore {
    async fn create_request(&self, cmd: CreateRequest) -> Result<BorrowRequest, StoreError> {
        let mut db = self.db.lock().unwrap();

        let tool = db.tools.get(&cmd.tool_id).ok_or(StoreError::ToolMissing)?;
        if tool.owner_id == cmd.borrower_id {
            return Err(StoreError::SelfBorrow);
        }
        if !tool.is_available {
            return Err(StoreError::ToolUnavailable);
        }
        let owner_id = tool.owner_id;

        let now = Utc::now();
        let request = BorrowRequest {
            id: RequestId::new(),
            tool_id: cmd.tool_id,
            owner_id,
            borrower_id: cmd.borrower_id,
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            status: RequestStatus::Pending,
            message: cmd.message.clone(),
            rejection_reason: None,
            cancellation_reason: None,
            collected_at: None,
            returned_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        db.requests.insert(request.id, request.clone());

        let record_id = db.next_record_id();
        db.records.push(TransitionRecord {
            id: record_id,
            request_id: request.id,
            status: RequestStatus::Pending,
            actor_id: cmd.borrower_id,
            note: cmd.message,
            recorded_at: now,
        });

        Ok(request)
    }

    async fn find_by_id(&self, id: RequestId) -> Result<BorrowRequest, StoreError> {
        self.db
            .lock()
            .unwrap()
            .requests
            .get(&id)
            .cloned()
            .ok_or(StoreError::RequestMissing)
    }

    async fn list_by_borrower(&self, borrower: UserId) -> Result<Vec<BorrowRequest>, StoreError> {
        let db = self.db.lock().unwrap();
        let mut requests: Vec<BorrowRequest> = db
            .requests
            .values()
            .filter(|r| r.borrower_id == borrower)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    async fn list_by_tool_owner(&self, owner: UserId) -> Result<Vec<BorrowRequest>, StoreError> {
        let db = self.db.lock().unwrap();
        let mut requests: Vec<BorrowRequest> = db
            .requests
            .values()
            .filter(|r| r.owner_id == owner)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(requests)
    }

    async fn apply_transition(&self, apply: TransitionApply) -> Result<BorrowRequest, StoreError> {
        let mut db = self.db.lock().unwrap();

        let request = db
            .requests
            .get_mut(&apply.request_id)
            .ok_or(StoreError::RequestMissing)?;
        if request.status != apply.expected_from {
            return Err(StoreError::StaleStatus {
                expected: apply.expected_from.to_string(),
                actual: request.status.to_string(),
            });
        }

        request.status = apply.to;
        request.updated_at = apply.occurred_at;
        match apply.timestamp {
            TimestampSlot::None => {}
            TimestampSlot::CollectedAt => request.collected_at = Some(apply.occurred_at),
            TimestampSlot::ReturnedAt => request.returned_at = Some(apply.occurred_at),
            TimestampSlot::CompletedAt => request.completed_at = Some(apply.occurred_at),
        }
        match apply.reason {
            ReasonSlot::None => {}
            ReasonSlot::Rejection => request.rejection_reason = apply.note.clone(),
            ReasonSlot::Cancellation => request.cancellation_reason = apply.note.clone(),
        }
        let updated = request.clone();

        match apply.availability {
            AvailabilityEffect::Unchanged => {}
            AvailabilityEffect::MarkUnavailable | AvailabilityEffect::MarkAvailable => {
                let tool = db
                    .tools
                    .get_mut(&updated.tool_id)
                    .ok_or(StoreError::ToolMissing)?;
                tool.is_available = apply.availability == AvailabilityEffect::MarkAvailable;
                tool.updated_at = apply.occurred_at;
            }
        }

        if apply.bump_counters {
            if let Some(borrower) = db.users.get_mut(&updated.borrower_id) {
                borrower.completed_borrows += 1;
                borrower.updated_at = apply.occurred_at;
            }
            if let Some(owner) = db.users.get_mut(&updated.owner_id) {
                owner.completed_lends += 1;
                owner.updated_at = apply.occurred_at;
            }
            if let Some(tool) = db.tools.get_mut(&updated.tool_id) {
                tool.total_borrows += 1;
            }
        }

        let record_id = db.next_record_id();
        db.records.push(TransitionRecord {
            id: record_id,
            request_id: apply.request_id,
            status: apply.to,
            actor_id: apply.actor_id,
            note: apply.note,
            recorded_at: apply.occurred_at,
        });

        Ok(updated)
    }

    async fn timeline(&self, id: RequestId) -> Result<Vec<TransitionRecord>, StoreError> {
        let db = self.db.lock().unwrap();
        Ok(db
            .records
            .iter()
            .filter(|r| r.request_id == id)
            .cloned()
            .collect())
    }
}

// =============================================================================
// In-memory NotificationStore
// =============================================================================

pub struct MemoryNotificationStore {
    db: SharedDb,
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        self.db
            .lock()
            .unwrap()
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        let db = self.db.lock().unwrap();
        Ok(db
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user)
            .cloned()
            .collect())
    }

    async fn list_unread(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        let db = self.db.lock().unwrap();
        Ok(db
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user && !n.is_read)
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user: UserId,
    ) -> Result<Notification, StoreError> {
        let mut db = self.db.lock().unwrap();
        let notification = db
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user)
            .ok_or(StoreError::NotificationMissing)?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, user: UserId) -> Result<u64, StoreError> {
        let mut db = self.db.lock().unwrap();
        let mut changed = 0;
        for notification in db
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

// =============================================================================
// Mock Push Notification Service
// =============================================================================

pub struct MockPushNotificationService {
    sent_notifications: Mutex<Vec<(String, String, String, serde_json::Value)>>,
}

impl MockPushNotificationService {
    pub fn new() -> Self {
        Self {
            sent_notifications: Mutex::new(Vec::new()),
        }
    }

    /// Get all notifications that were sent
    pub fn sent_notifications(&self) -> Vec<(String, String, String, serde_json::Value)> {
        self.sent_notifications.lock().unwrap().clone()
    }

    /// Check if a notification was sent with the given title
    pub fn was_sent_with_title(&self, title: &str) -> bool {
        self.sent_notifications
            .lock()
            .unwrap()
            .iter()
            .any(|(_, t, _, _)| t == title)
    }
}

impl Default for MockPushNotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePushNotificationService for MockPushNotificationService {
    async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        self.sent_notifications.lock().unwrap().push((
            device_token.to_string(),
            title.to_string(),
            body.to_string(),
            data,
        ));
        Ok(())
    }
}

/// Push service that fails every send; for exercising failure isolation.
pub struct FailingPushService;

#[async_trait]
impl BasePushNotificationService for FailingPushService {
    async fn send_notification(
        &self,
        _device_token: &str,
        _title: &str,
        _body: &str,
        _data: serde_json::Value,
    ) -> Result<()> {
        Err(anyhow::anyhow!("push gateway unreachable"))
    }
}

// =============================================================================
// TestDependencies - builder for an in-memory ServerDeps
// =============================================================================

pub struct TestDependencies {
    db: SharedDb,
    pub push: Arc<MockPushNotificationService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            db: Arc::new(Mutex::new(MemoryDb::default())),
            push: Arc::new(MockPushNotificationService::new()),
        }
    }

    /// Assemble ServerDeps over the shared in-memory tables.
    pub fn into_deps(self) -> Arc<ServerDeps> {
        self.deps_with_push(self.push.clone())
    }

    /// Same, but with a custom push implementation.
    pub fn deps_with_push(
        &self,
        push: Arc<dyn BasePushNotificationService>,
    ) -> Arc<ServerDeps> {
        Arc::new(ServerDeps {
            users: Arc::new(MemoryUserStore {
                db: self.db.clone(),
            }),
            tools: Arc::new(MemoryToolStore {
                db: self.db.clone(),
            }),
            requests: Arc::new(MemoryBorrowStore {
                db: self.db.clone(),
            }),
            notifications: Arc::new(MemoryNotificationStore {
                db: self.db.clone(),
            }),
            push,
            db_pool: None,
        })
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
