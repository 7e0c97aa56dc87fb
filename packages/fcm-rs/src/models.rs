use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification block of an FCM message (what the device displays).
#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

/// Outgoing FCM downstream message.
#[derive(Debug, Clone, Serialize)]
pub struct FcmMessage {
    pub to: String,
    pub priority: String,
    pub notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Per-registration-token result inside an FCM send response.
#[derive(Debug, Clone, Deserialize)]
pub struct FcmResult {
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// Response body of the FCM legacy HTTP send endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FcmResponse {
    pub multicast_id: Option<i64>,
    pub success: i64,
    pub failure: i64,
    #[serde(default)]
    pub results: Vec<FcmResult>,
}
