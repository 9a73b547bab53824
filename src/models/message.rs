use crate::models::{ShortUser, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: User,
}

/// Listing shape: the sender is projected down to [`ShortUser`] so full user
/// records never leave through the paginated endpoint.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageListItem {
    #[serde(flatten)]
    pub message: Message,
    pub sender: ShortUser,
}
