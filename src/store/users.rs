use crate::models::User;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub(crate) fn user_from_row(r: &SqliteRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
        image_url: r.get("image_url"),
        created: r.get("created"),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, email, image_url, created FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(user_from_row))
}

pub async fn username_taken(pool: &SqlitePool, username: &str) -> sqlx::Result<bool> {
    let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> sqlx::Result<User> {
    let created = Utc::now();
    let res =
        sqlx::query("INSERT INTO users(username, email, password_hash, created) VALUES (?, ?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(created)
            .execute(pool)
            .await?;
    Ok(User {
        id: res.last_insert_rowid(),
        username: username.to_owned(),
        email: email.map(str::to_owned),
        image_url: None,
        created,
    })
}

pub async fn credentials(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<(i64, String)>> {
    let row = sqlx::query("SELECT id, password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| (r.get("id"), r.get("password_hash"))))
}
