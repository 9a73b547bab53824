use crate::models::{Channel, ChannelDetail, User};
use crate::store::users;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub struct NewChannel {
    pub name: String,
    pub tag: String,
    pub is_private: bool,
    pub image_url: Option<String>,
    pub owner_id: i64,
}

/// Partial update. `None` keeps the stored value.
pub struct ChannelUpdate {
    pub name: Option<String>,
    pub is_private: Option<bool>,
    pub image_url: Option<String>,
}

fn channel_from_row(r: &SqliteRow) -> Channel {
    Channel {
        id: r.get("id"),
        name: r.get("name"),
        tag: r.get("tag"),
        is_private: r.get("is_private"),
        image_url: r.get("image_url"),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Channel>> {
    let row =
        sqlx::query("SELECT id, name, tag, is_private, image_url FROM channels WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.as_ref().map(channel_from_row))
}

/// Loads a channel together with its owner and member set.
pub async fn find_detail(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<ChannelDetail>> {
    let row = sqlx::query(
        "SELECT id, name, tag, is_private, image_url, owner_id FROM channels WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let Some(row) = row else { return Ok(None) };

    let owner_id: i64 = row.get("owner_id");
    let channel = channel_from_row(&row);
    let owner = users::find_by_id(pool, owner_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    let members = members(pool, id).await?;

    Ok(Some(ChannelDetail {
        channel,
        owner,
        members,
    }))
}

pub async fn members(pool: &SqlitePool, channel_id: i64) -> sqlx::Result<Vec<User>> {
    let rows = sqlx::query(
        "SELECT u.id, u.username, u.email, u.image_url, u.created
         FROM users u
         INNER JOIN channel_members cm ON cm.user_id = u.id
         WHERE cm.channel_id = ?
         ORDER BY u.id",
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(users::user_from_row).collect())
}

pub async fn tag_exists(pool: &SqlitePool, tag: &str) -> sqlx::Result<bool> {
    let row = sqlx::query("SELECT 1 FROM channels WHERE tag = ?")
        .bind(tag)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn create(pool: &SqlitePool, new: &NewChannel) -> sqlx::Result<i64> {
    let res = sqlx::query(
        "INSERT INTO channels(name, tag, is_private, image_url, owner_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&new.name)
    .bind(&new.tag)
    .bind(new.is_private)
    .bind(&new.image_url)
    .bind(new.owner_id)
    .execute(pool)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn owned_by(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<Channel>> {
    let rows = sqlx::query(
        "SELECT id, name, tag, is_private, image_url FROM channels WHERE owner_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(channel_from_row).collect())
}

pub async fn member_of(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<Channel>> {
    let rows = sqlx::query(
        "SELECT c.id, c.name, c.tag, c.is_private, c.image_url
         FROM channels c
         INNER JOIN channel_members cm ON cm.channel_id = c.id
         WHERE cm.user_id = ?
         ORDER BY c.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(channel_from_row).collect())
}

pub async fn add_member(pool: &SqlitePool, channel_id: i64, user_id: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO channel_members(channel_id, user_id) VALUES (?, ?)")
        .bind(channel_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_member(pool: &SqlitePool, channel_id: i64, user_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM channel_members WHERE channel_id = ? AND user_id = ?")
        .bind(channel_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: i64, upd: &ChannelUpdate) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE channels
         SET name = COALESCE(?, name),
             is_private = COALESCE(?, is_private),
             image_url = COALESCE(?, image_url)
         WHERE id = ?",
    )
    .bind(&upd.name)
    .bind(upd.is_private)
    .bind(&upd.image_url)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM channels WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
