use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user record as handlers see it. The password hash stays in the users
/// table and is only read by the auth queries.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub created: DateTime<Utc>,
}

/// Reduced projection safe to embed in message listings.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ShortUser {
    pub id: i64,
    pub username: String,
    pub image_url: Option<String>,
}

impl From<User> for ShortUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            image_url: u.image_url,
        }
    }
}
