use crate::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a post. Posts live outside this service; `post_id` is an
/// opaque reference.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithSender {
    #[serde(flatten)]
    pub comment: Comment,
    pub sender: User,
}
