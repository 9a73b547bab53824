use crate::models::{Message, MessageListItem, MessageWithSender, ShortUser, User};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub struct NewMessage {
    pub channel_id: i64,
    pub sender_id: i64,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

fn message_from_row(r: &SqliteRow) -> Message {
    Message {
        id: r.get("id"),
        content: r.get("content"),
        image_url: r.get("image_url"),
        created: r.get("created"),
        updated: r.get("updated"),
    }
}

pub async fn create(pool: &SqlitePool, new: &NewMessage) -> sqlx::Result<Message> {
    let created = Utc::now();
    let res = sqlx::query(
        "INSERT INTO messages(channel_id, sender_id, content, image_url, created) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(new.channel_id)
    .bind(new.sender_id)
    .bind(&new.content)
    .bind(&new.image_url)
    .bind(created)
    .execute(pool)
    .await?;
    Ok(Message {
        id: res.last_insert_rowid(),
        content: new.content.clone(),
        image_url: new.image_url.clone(),
        created,
        updated: None,
    })
}

pub async fn find_with_sender(
    pool: &SqlitePool,
    id: i64,
) -> sqlx::Result<Option<MessageWithSender>> {
    let row = sqlx::query(
        "SELECT m.id, m.content, m.image_url, m.created, m.updated,
                u.id AS sender_id, u.username, u.email,
                u.image_url AS sender_image_url, u.created AS sender_created
         FROM messages m
         INNER JOIN users u ON u.id = m.sender_id
         WHERE m.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| MessageWithSender {
        message: message_from_row(&r),
        sender: User {
            id: r.get("sender_id"),
            username: r.get("username"),
            email: r.get("email"),
            image_url: r.get("sender_image_url"),
            created: r.get("sender_created"),
        },
    }))
}

/// Page of messages for a channel, senders projected down to [`ShortUser`].
pub async fn list_for_channel(
    pool: &SqlitePool,
    channel_id: i64,
    take: i64,
    skip: i64,
) -> sqlx::Result<Vec<MessageListItem>> {
    let rows = sqlx::query(
        "SELECT m.id, m.content, m.image_url, m.created, m.updated,
                u.id AS sender_id, u.username, u.image_url AS sender_image_url
         FROM messages m
         INNER JOIN users u ON u.id = m.sender_id
         WHERE m.channel_id = ?
         ORDER BY m.id
         LIMIT ? OFFSET ?",
    )
    .bind(channel_id)
    .bind(take)
    .bind(skip)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| MessageListItem {
            message: message_from_row(&r),
            sender: ShortUser {
                id: r.get("sender_id"),
                username: r.get("username"),
                image_url: r.get("sender_image_url"),
            },
        })
        .collect())
}

/// Whitelisted update: only the content changes, `updated` is stamped.
pub async fn update_content(
    pool: &SqlitePool,
    id: i64,
    content: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE messages SET content = COALESCE(?, content), updated = ? WHERE id = ?")
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// `(message id, sender id)` for every requested id that exists.
pub async fn sender_ids(pool: &SqlitePool, ids: &[i64]) -> sqlx::Result<Vec<(i64, i64)>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!("SELECT id, sender_id FROM messages WHERE id IN ({placeholders})");
    let mut q = sqlx::query(&sql);
    for id in ids {
        q = q.bind(*id);
    }
    let rows = q.fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|r| (r.get("id"), r.get("sender_id")))
        .collect())
}

pub async fn delete_many(pool: &SqlitePool, ids: &[i64]) -> sqlx::Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!("DELETE FROM messages WHERE id IN ({placeholders})");
    let mut q = sqlx::query(&sql);
    for id in ids {
        q = q.bind(*id);
    }
    let res = q.execute(pool).await?;
    Ok(res.rows_affected())
}
