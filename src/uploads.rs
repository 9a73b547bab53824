//! Request body reading for the endpoints that accept an optional image.
//!
//! Clients send either plain JSON or multipart/form-data with text fields
//! plus one image part. The image is written to the uploads directory before
//! the payload is validated, so validation-failure paths must call
//! [`discard_image`] to clean it up.

use crate::config::Config;
use crate::errors::ApiError;
use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest};
use futures_util::{StreamExt, TryStreamExt};
use sanitize_filename::sanitize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;

/// Reads the request body into a JSON value plus the stored image name, if
/// an image part was uploaded.
pub async fn read_form(
    req: &HttpRequest,
    payload: web::Payload,
    cfg: &Config,
) -> Result<(Value, Option<String>), ApiError> {
    if req.content_type().starts_with("multipart/form-data") {
        read_multipart(req, payload, cfg).await
    } else {
        let value = read_json(payload).await?;
        Ok((value, None))
    }
}

async fn read_multipart(
    req: &HttpRequest,
    payload: web::Payload,
    cfg: &Config,
) -> Result<(Value, Option<String>), ApiError> {
    let mut form = Multipart::new(req.headers(), payload);
    let mut fields = Map::new();
    let mut image_url: Option<String> = None;

    while let Some(mut field) = form
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("invalid multipart body".into()))?
    {
        let cd = field.content_disposition().cloned();
        let name = cd
            .as_ref()
            .and_then(|c| c.get_name())
            .unwrap_or_default()
            .to_owned();
        let filename = cd.as_ref().and_then(|c| c.get_filename()).map(sanitize);

        if let Some(filename) = filename {
            if image_url.is_none() {
                image_url = Some(save_image(cfg, &mut field, &filename).await?);
            } else {
                // only one image per request; drain the extras
                while field
                    .try_next()
                    .await
                    .map_err(|_| ApiError::BadRequest("upload read error".into()))?
                    .is_some()
                {}
            }
        } else {
            let mut data: Vec<u8> = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|_| ApiError::BadRequest("upload read error".into()))?
            {
                data.extend_from_slice(&chunk);
            }
            let text = String::from_utf8(data)
                .map_err(|_| ApiError::BadRequest("form field is not valid UTF-8".into()))?;
            fields.insert(name, Value::String(text));
        }
    }

    Ok((Value::Object(fields), image_url))
}

/// Reads and parses a plain JSON body. An empty body reads as `Null`.
pub async fn read_json(mut payload: web::Payload) -> Result<Value, ApiError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|_| ApiError::BadRequest("failed to read request body".into()))?;
        body.extend_from_slice(&chunk);
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("invalid JSON body".into()))
}

async fn save_image(
    cfg: &Config,
    field: &mut actix_multipart::Field,
    original: &str,
) -> Result<String, ApiError> {
    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|_| ApiError::BadRequest("upload read error".into()))?
    {
        data.extend_from_slice(&chunk);
        if data.len() > cfg.max_upload_size {
            return Err(ApiError::BadRequest("file too large".into()));
        }
    }

    match infer::get(&data) {
        Some(t) if t.mime_type().starts_with("image/") => {}
        _ => return Err(ApiError::BadRequest("only image uploads are accepted".into())),
    }

    let ext = Path::new(original)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("bin");
    let stored = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    let path = Path::new(&cfg.uploads_dir).join(&stored);
    let mut f = std::fs::File::create(&path).map_err(|e| {
        log::error!("upload write failed: {e}");
        ApiError::Internal
    })?;
    f.write_all(&data).map_err(|e| {
        log::error!("upload write failed: {e}");
        ApiError::Internal
    })?;

    Ok(stored)
}

/// Removes a stored upload. A missing file is an error, not a no-op.
pub fn discard_image(cfg: &Config, image_url: Option<&str>) -> Result<(), ApiError> {
    if let Some(name) = image_url {
        std::fs::remove_file(Path::new(&cfg.uploads_dir).join(name)).map_err(|e| {
            log::error!("failed to remove upload {name}: {e}");
            ApiError::Internal
        })?;
    }
    Ok(())
}
