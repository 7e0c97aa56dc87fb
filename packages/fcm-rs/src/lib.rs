// https://firebase.google.com/docs/cloud-messaging/http-server-ref

pub mod models;

use reqwest::{header, Client};
use serde_json::Value;

use crate::models::{FcmMessage, FcmNotification, FcmResponse};

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

#[derive(Debug, Clone)]
pub struct FcmOptions {
    pub server_key: String,
}

#[derive(Debug, Clone)]
pub struct FcmService {
    options: FcmOptions,
}

impl FcmService {
    pub fn new(options: FcmOptions) -> Self {
        Self { options }
    }

    /// Send a push notification to a single device registration token.
    ///
    /// `data` is an optional payload handed to the app alongside the
    /// displayed notification (click actions, related ids, ...).
    pub async fn send_notification(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: Option<Value>,
    ) -> Result<FcmResponse, &'static str> {
        let message = FcmMessage {
            to: device_token.to_string(),
            priority: "high".to_string(),
            notification: FcmNotification {
                title: title.to_string(),
                body: body.to_string(),
                sound: Some("default".to_string()),
            },
            data,
        };

        let mut headers = header::HeaderMap::new();
        let auth = format!("key={}", self.options.server_key);
        headers.insert(
            header::AUTHORIZATION,
            auth.parse().map_err(|_| "Invalid FCM server key")?,
        );

        let client = Client::new();
        let res = client
            .post(FCM_SEND_URL)
            .headers(headers)
            .json(&message)
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("FCM error ({}): {}", status, error_body);
                    return Err("FCM returned an error");
                }

                match response.json::<FcmResponse>().await {
                    Ok(data) => {
                        if data.failure > 0 {
                            for result in &data.results {
                                if let Some(error) = &result.error {
                                    eprintln!("FCM delivery failure: {}", error);
                                }
                            }
                        }
                        Ok(data)
                    }
                    Err(e) => {
                        eprintln!("Failed to parse FCM response: {}", e);
                        Err("Error parsing FCM response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to FCM failed: {}", e);
                Err("Error sending push notification")
            }
        }
    }
}
