use crate::models::User;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub tag: String,
    pub is_private: bool,
    pub image_url: Option<String>,
}

/// A channel with its owner and member set loaded.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetail {
    #[serde(flatten)]
    pub channel: Channel,
    pub owner: User,
    pub members: Vec<User>,
}
