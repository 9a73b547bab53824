#![allow(dead_code)]

use tagchat::auth;
use tagchat::config::Config;
use tagchat::db::Db;
use tagchat::models::User;
use tagchat::store;
use tempfile::TempDir;

pub struct TestState {
    pub cfg: Config,
    pub db: Db,
    _dir: TempDir,
}

pub async fn setup() -> TestState {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("test.sqlite3");
    let uploads_dir = dir.path().join("uploads");
    std::fs::create_dir_all(&uploads_dir).expect("create uploads dir");

    let cfg = Config {
        listen: "127.0.0.1:0".into(),
        database_path: db_path.to_string_lossy().into_owned(),
        uploads_dir: uploads_dir.to_string_lossy().into_owned(),
        jwt_secret: Some("test-secret".into()),
        max_upload_size: 10 * 1024 * 1024,
    };
    let db = Db::connect_and_migrate(&cfg.database_path)
        .await
        .expect("database init");

    TestState { cfg, db, _dir: dir }
}

pub async fn seed_user(st: &TestState, username: &str) -> (User, String) {
    let hash = auth::hash_password("password123").expect("hash password");
    let email = format!("{username}@example.org");
    let user = store::users::create(&st.db.0, username, Some(&email), &hash)
        .await
        .expect("create user");
    let token = auth::create_access_token(user.id, &st.cfg).expect("create token");
    (user, token)
}

pub async fn seed_channel(st: &TestState, owner_id: i64, name: &str, tag: &str) -> i64 {
    store::channels::create(
        &st.db.0,
        &store::channels::NewChannel {
            name: name.into(),
            tag: tag.into(),
            is_private: false,
            image_url: None,
            owner_id,
        },
    )
    .await
    .expect("create channel")
}

pub async fn seed_message(st: &TestState, channel_id: i64, sender_id: i64, content: &str) -> i64 {
    store::messages::create(
        &st.db.0,
        &store::messages::NewMessage {
            channel_id,
            sender_id,
            content: Some(content.into()),
            image_url: None,
        },
    )
    .await
    .expect("create message")
    .id
}

pub async fn message_count(st: &TestState) -> i64 {
    use sqlx::Row;
    let row = sqlx::query("SELECT COUNT(*) AS n FROM messages")
        .fetch_one(&st.db.0)
        .await
        .expect("count messages");
    row.get("n")
}

/// Builds a multipart/form-data body from text fields plus an optional file
/// part named `image`. Returns `(content type, body)`.
pub fn multipart_body(
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> (String, Vec<u8>) {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Enough of a PNG for mime sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

#[macro_export]
macro_rules! init_app {
    ($st:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($st.cfg.clone()))
                .app_data(actix_web::web::Data::new($st.db.clone()))
                .configure(tagchat::routes::configure),
        )
        .await
    };
}
