//! Payload schemas and the pure validation entry point.
//!
//! Schemas are plain deserializable structs; `validate` turns a schema run
//! into `Result<(), Vec<FieldError>>` so handlers decide what to do with the
//! error list (it is also the wire shape of a validation failure).

use crate::errors::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

pub fn validate<T: Validate>(payload: &T) -> Result<(), Vec<FieldError>> {
    payload.validate().map_err(collect_errors)
}

fn collect_errors(errors: ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    for (path, kind) in errors.into_errors() {
        if let ValidationErrorsKind::Field(list) = kind {
            for err in list {
                let message = err
                    .message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", path));
                out.push(FieldError {
                    path: path.to_string(),
                    message,
                });
            }
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// Deserializes a request body into a schema struct. A null body counts as an
/// empty object so missing-field errors surface through the schema, not here.
pub fn parse<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|e| {
        ApiError::Validation(vec![FieldError {
            path: String::new(),
            message: e.to_string(),
        }])
    })
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateChannelPayload {
    #[serde(deserialize_with = "de_trimmed")]
    #[validate(
        required(message = "name is a required field"),
        length(min = 1, message = "name is a required field")
    )]
    pub name: Option<String>,
    #[serde(deserialize_with = "de_trimmed")]
    #[validate(
        required(message = "tag is a required field"),
        length(min = 1, message = "tag is a required field")
    )]
    pub tag: Option<String>,
    #[serde(deserialize_with = "de_loose_bool")]
    pub is_private: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateChannelPayload {
    #[serde(deserialize_with = "de_trimmed")]
    #[validate(length(min = 1, message = "name must be at least 1 characters"))]
    pub name: Option<String>,
    #[serde(deserialize_with = "de_loose_bool")]
    pub is_private: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MessagePayload {
    // Structural only; whether a message may be empty depends on an attached
    // image and is checked in the handler.
    #[serde(deserialize_with = "de_trimmed")]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCommentPayload {
    #[serde(deserialize_with = "de_trimmed")]
    #[validate(
        required(message = "content is a required field"),
        length(min = 1, message = "content is a required field")
    )]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCommentPayload {
    #[serde(deserialize_with = "de_trimmed")]
    #[validate(length(min = 1, message = "content must be at least 1 characters"))]
    pub content: Option<String>,
}

/// Strings arrive trimmed; multipart form fields and sloppy clients may send
/// scalars where a string is expected, so those are coerced.
fn de_trimmed<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_owned()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a string, got {other}"
            )))
        }
    })
}

/// Multipart form fields carry booleans as text.
fn de_loose_bool<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a boolean, got {other:?}"
                )))
            }
        },
        Some(Value::Number(n)) => Some(n.as_i64().unwrap_or(0) != 0),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a boolean, got {other}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_channel_requires_name_and_tag() {
        let payload: CreateChannelPayload = parse(json!({})).unwrap();
        let errors = validate(&payload).unwrap_err();
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "tag"]);
        assert_eq!(errors[0].message, "name is a required field");
    }

    #[test]
    fn blank_fields_are_rejected_after_trimming() {
        let payload: CreateChannelPayload =
            parse(json!({"name": "   ", "tag": "team1"})).unwrap();
        let errors = validate(&payload).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "name");
    }

    #[test]
    fn form_booleans_are_coerced() {
        let payload: CreateChannelPayload =
            parse(json!({"name": "Team", "tag": "t", "isPrivate": "true"})).unwrap();
        assert_eq!(payload.is_private, Some(true));
        assert!(validate(&payload).is_ok());
    }

    #[test]
    fn update_channel_allows_partial_bodies() {
        let payload: UpdateChannelPayload = parse(json!({})).unwrap();
        assert!(validate(&payload).is_ok());

        let payload: UpdateChannelPayload = parse(json!({"name": ""})).unwrap();
        let errors = validate(&payload).unwrap_err();
        assert_eq!(errors[0].path, "name");
    }

    #[test]
    fn message_schema_is_structural_only() {
        let payload: MessagePayload = parse(json!({})).unwrap();
        assert!(validate(&payload).is_ok());
        assert_eq!(payload.content, None);

        let payload: MessagePayload = parse(json!({"content": "  hi  "})).unwrap();
        assert_eq!(payload.content.as_deref(), Some("hi"));
    }

    #[test]
    fn comment_content_is_required_on_create_only() {
        let payload: CreateCommentPayload = parse(json!({})).unwrap();
        let errors = validate(&payload).unwrap_err();
        assert_eq!(errors[0].path, "content");
        assert_eq!(errors[0].message, "content is a required field");

        let payload: UpdateCommentPayload = parse(json!({})).unwrap();
        assert!(validate(&payload).is_ok());

        let payload: UpdateCommentPayload = parse(json!({"content": " "})).unwrap();
        assert!(validate(&payload).is_err());
    }

    #[test]
    fn null_bodies_read_as_empty_objects() {
        let payload: MessagePayload = parse(Value::Null).unwrap();
        assert_eq!(payload.content, None);
    }
}
