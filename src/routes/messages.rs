use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use crate::models::{ChannelDetail, Message, MessageWithSender, User};
use crate::store::messages::{self, NewMessage};
use crate::store::users;
use crate::uploads;
use crate::validate::{self, MessagePayload};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::channels::channel_by_id;

async fn message_by_id(db: &Db, raw: &str) -> Result<MessageWithSender, ApiError> {
    let id = raw
        .parse::<i64>()
        .ok()
        .filter(|v| *v != 0)
        .ok_or_else(|| ApiError::BadRequest("Bad message id".into()))?;
    messages::find_with_sender(&db.0, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".into()))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn get_messages(
    db: web::Data<Db>,
    _user: AuthUser,
    path: web::Path<String>,
    q: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let channel = channel_by_id(&db, &path.into_inner()).await?;

    // take caps at 200; anything unusable falls back to 50
    let take = q
        .limit
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|l| *l > 0 && *l <= 200)
        .unwrap_or(50);
    let skip = q
        .offset
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|o| *o >= 0)
        .unwrap_or(0);

    let list = messages::list_for_channel(&db.0, channel.channel.id, take, skip).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedMessage {
    #[serde(flatten)]
    message: Message,
    sender: User,
    channel: ChannelDetail,
}

pub async fn create_message(
    cfg: web::Data<Config>,
    db: web::Data<Db>,
    user: AuthUser,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let channel = channel_by_id(&db, &path.into_inner()).await?;

    let (value, image_url) = uploads::read_form(&req, payload, &cfg).await?;
    let body = match validate::parse::<MessagePayload>(value) {
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

    // Structural validation happened above; an empty message is a business
    // rule, not a schema failure.
    if body.content.as_deref().unwrap_or("").is_empty() && image_url.is_none() {
        return Err(ApiError::BadRequest("Content or image should be passed".into()));
    }

    let sender = users::find_by_id(&db.0, user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let message = messages::create(
        &db.0,
        &NewMessage {
            channel_id: channel.channel.id,
            sender_id: sender.id,
            content: body.content,
            image_url,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(CreatedMessage {
        message,
        sender,
        channel,
    }))
}

pub async fn update_message(
    db: web::Data<Db>,
    _user: AuthUser,
    path: web::Path<String>,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let mut message = message_by_id(&db, &path.into_inner()).await?;

    let value = uploads::read_json(payload).await?;
    let body: MessagePayload = validate::parse(value)?;
    validate::validate(&body).map_err(ApiError::Validation)?;

    messages::update_content(&db.0, message.message.id, body.content.as_deref()).await?;

    // Merged view of what was loaded plus the new content; no re-read, so
    // the serialized `updated` is the pre-update value.
    if let Some(content) = body.content {
        message.message.content = Some(content);
    }
    Ok(HttpResponse::Ok().json(message))
}

pub async fn delete_messages(
    db: web::Data<Db>,
    user: AuthUser,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let value = uploads::read_json(payload).await?;
    let ids: Vec<i64> = match value.get("messageIds").and_then(Value::as_array) {
        Some(arr) if !arr.is_empty() => arr.iter().filter_map(Value::as_i64).collect(),
        _ => return Err(ApiError::BadRequest("Please provide messageIds".into())),
    };

    // All-or-nothing: one foreign message rejects the whole batch.
    let found = messages::sender_ids(&db.0, &ids).await?;
    if found.iter().any(|(_, sender_id)| *sender_id != user.user_id) {
        return Err(ApiError::Forbidden(
            "You can delete only your own messages".into(),
        ));
    }

    let found_ids: Vec<i64> = found.iter().map(|(id, _)| *id).collect();
    messages::delete_many(&db.0, &found_ids).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}
