use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::{Channel, ChannelDetail, User};
use crate::store::channels::{ChannelUpdate, NewChannel};
use crate::store::{channels, users};
use crate::uploads;
use crate::validate::{self, CreateChannelPayload, UpdateChannelPayload};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

/// Resolves a channel from a raw path segment, owner and members loaded.
pub(crate) async fn channel_by_id(db: &Db, raw: &str) -> Result<ChannelDetail, ApiError> {
    let id = raw
        .parse::<i64>()
        .ok()
        .filter(|v| *v != 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid channel id".into()))?;
    channels::find_detail(&db.0, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Channel does not exist".into()))
}

async fn user_by_id(db: &Db, raw: &str) -> Result<User, ApiError> {
    let id = raw
        .parse::<i64>()
        .ok()
        .filter(|v| *v != 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid user id".into()))?;
    users::find_by_id(&db.0, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".into()))
}

pub async fn get_channel(
    db: web::Data<Db>,
    _user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let channel = channel_by_id(&db, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(channel))
}

pub async fn get_my_channels(
    db: web::Data<Db>,
    user: AuthUser,
) -> Result<HttpResponse, ApiError> {
    // Owned first, then joined. A user who owns a channel they are also a
    // member of sees it twice.
    let mut list = channels::owned_by(&db.0, user.user_id).await?;
    list.extend(channels::member_of(&db.0, user.user_id).await?);
    Ok(HttpResponse::Ok().json(list))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChannelWithOwner {
    #[serde(flatten)]
    channel: Channel,
    owner: User,
}

pub async fn create_channel(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let (value, image_url) = uploads::read_form(&req, payload, &cfg).await?;
    let body = match validate::parse::<CreateChannelPayload>(value) {
        Ok(body) => body,
        Err(e) => {
            uploads::discard_image(&cfg, image_url.as_deref())?;
            return Err(e);
        }
    };
    if let Err(errors) = validate::validate(&body) {
        uploads::discard_image(&cfg, image_url.as_deref())?;
        return Err(ApiError::Validation(errors));
    }

    let tag = body.tag.unwrap_or_default();
    if channels::tag_exists(&db.0, &tag).await? {
        uploads::discard_image(&cfg, image_url.as_deref())?;
        return Err(ApiError::TagTaken);
    }

    let owner = users::find_by_id(&db.0, user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let new = NewChannel {
        name: body.name.unwrap_or_default(),
        tag,
        is_private: body.is_private.unwrap_or(false),
        image_url,
        owner_id: owner.id,
    };
    let id = channels::create(&db.0, &new).await?;

    Ok(HttpResponse::Ok().json(ChannelWithOwner {
        channel: Channel {
            id,
            name: new.name,
            tag: new.tag,
            is_private: new.is_private,
            image_url: new.image_url,
        },
        owner,
    }))
}

pub async fn add_member(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (channel_path, user_path) = path.into_inner();
    let channel = channel_by_id(&db, &channel_path).await?;
    let target = user_by_id(&db, &user_path).await?;

    if user.user_id == target.id {
        return Err(ApiError::BadRequest("You are an owner of this channel".into()));
    }
    if channel.members.iter().any(|m| m.id == target.id) {
        return Err(ApiError::BadRequest(format!(
            "User with id {} is already member of this channel",
            target.id
        )));
    }

    channels::add_member(&db.0, channel.channel.id, target.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}

/// Removes the caller from the member set. No membership pre-check: removing
/// a non-member is a no-op that still reports success.
pub async fn leave_channel(
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let channel = channel_by_id(&db, &path.into_inner()).await?;
    channels::remove_member(&db.0, channel.channel.id, user.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}

pub async fn kick_member(
    db: web::Data<Db>,
    _user: AuthUser,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (channel_path, user_path) = path.into_inner();
    let channel = channel_by_id(&db, &channel_path).await?;
    let target = user_by_id(&db, &user_path).await?;
    channels::remove_member(&db.0, channel.channel.id, target.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}

pub async fn update_channel(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    _user: AuthUser,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let channel = channel_by_id(&db, &path.into_inner()).await?;

    let (value, image_url) = uploads::read_form(&req, payload, &cfg).await?;
    let body = match validate::parse::<UpdateChannelPayload>(value) {
        Ok(body) => body,
        Err(e) => {
            uploads::discard_image(&cfg, image_url.as_deref())?;
            return Err(e);
        }
    };
    if let Err(errors) = validate::validate(&body) {
        uploads::discard_image(&cfg, image_url.as_deref())?;
        return Err(ApiError::Validation(errors));
    }

    // Only name, isPrivate and a fresh image make it into the update.
    let upd = ChannelUpdate {
        name: body.name,
        is_private: body.is_private,
        image_url,
    };
    channels::update(&db.0, channel.channel.id, &upd).await?;

    let updated = channels::find_by_id(&db.0, channel.channel.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Channel does not exist".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_channel(
    db: web::Data<Db>,
    _user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let channel = channel_by_id(&db, &path.into_inner()).await?;
    channels::delete(&db.0, channel.channel.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}
