use crate::auth;
use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::User;
use crate::store::users;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RegisterReq {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResp {
    access_token: String,
    user: User,
}

pub async fn register(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    body: web::Json<RegisterReq>,
) -> Result<HttpResponse, ApiError> {
    let username = body.username.trim();
    if username.len() < 3 || body.password.len() < 8 {
        return Err(ApiError::BadRequest("invalid username/password".into()));
    }
    if users::username_taken(&db.0, username).await? {
        return Err(ApiError::BadRequest("username already taken".into()));
    }

    let hash = auth::hash_password(&body.password)?;
    let user = users::create(&db.0, username, body.email.as_deref(), &hash).await?;
    let access_token = auth::create_access_token(user.id, &cfg)?;

    Ok(HttpResponse::Ok().json(AuthResp { access_token, user }))
}

pub async fn login(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    body: web::Json<LoginReq>,
) -> Result<HttpResponse, ApiError> {
    let (id, hash) = users::credentials(&db.0, &body.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !auth::verify_password(&hash, &body.password) {
        return Err(ApiError::Unauthorized);
    }

    let user = users::find_by_id(&db.0, id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let access_token = auth::create_access_token(user.id, &cfg)?;

    Ok(HttpResponse::Ok().json(AuthResp { access_token, user }))
}
