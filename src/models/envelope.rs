use serde::Deserialize;

use super::notification::Notification;

/// Every JSON response from the tracker: `success` plus side-channel data,
/// or `success: false` with a message meant for the user.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Body of a mutating call that carries nothing besides the envelope.
#[derive(Debug, Default, Deserialize)]
pub struct Ack {}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationBatch {
    #[serde(default)]
    pub notifications: Vec<Notification>,
}
