use crate::models::{Comment, CommentWithSender, User};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub struct NewComment {
    pub post_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub image_url: Option<String>,
}

fn comment_from_row(r: &SqliteRow) -> Comment {
    Comment {
        id: r.get("id"),
        post_id: r.get("post_id"),
        content: r.get("content"),
        image_url: r.get("image_url"),
        created: r.get("created"),
        updated: r.get("updated"),
    }
}

pub async fn create(pool: &SqlitePool, new: &NewComment) -> sqlx::Result<Comment> {
    let created = Utc::now();
    let res = sqlx::query(
        "INSERT INTO comments(post_id, sender_id, content, image_url, created) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(new.post_id)
    .bind(new.sender_id)
    .bind(&new.content)
    .bind(&new.image_url)
    .bind(created)
    .execute(pool)
    .await?;
    Ok(Comment {
        id: res.last_insert_rowid(),
        post_id: new.post_id,
        content: new.content.clone(),
        image_url: new.image_url.clone(),
        created,
        updated: None,
    })
}

pub async fn update_content(pool: &SqlitePool, id: i64, content: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE comments SET content = ?, updated = ? WHERE id = ?")
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_for_post(pool: &SqlitePool, post_id: i64) -> sqlx::Result<Vec<CommentWithSender>> {
    let rows = sqlx::query(
        "SELECT c.id, c.post_id, c.content, c.image_url, c.created, c.updated,
                u.id AS sender_id, u.username, u.email,
                u.image_url AS sender_image_url, u.created AS sender_created
         FROM comments c
         INNER JOIN users u ON u.id = c.sender_id
         WHERE c.post_id = ?
         ORDER BY c.id",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| CommentWithSender {
            comment: comment_from_row(&r),
            sender: User {
                id: r.get("sender_id"),
                username: r.get("username"),
                email: r.get("email"),
                image_url: r.get("sender_image_url"),
                created: r.get("sender_created"),
            },
        })
        .collect())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
