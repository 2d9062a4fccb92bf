//! Request and response bodies exchanged with the backend.
//!
//! Record bodies reuse [`SlugRecord`] directly; only the shapes that carry
//! the owner (`uid`) or a bare redirect live here.

use serde::{Deserialize, Serialize};
use slug_registry_core::{ApiError, SlugRecord};

/// Body of `POST /slugs`
#[derive(Debug, Serialize)]
pub(crate) struct CreateSlugBody<'a> {
    pub slug: &'a str,
    pub redirect: &'a str,
    pub uid: &'a str,
}

/// Body of `PUT /slugs`
#[derive(Debug, Serialize)]
pub(crate) struct UpdateSlugBody<'a> {
    pub id: &'a str,
    pub slug: &'a str,
    pub redirect: &'a str,
    pub uid: &'a str,
}

/// Body of a successful `GET /slug`
#[derive(Debug, Deserialize)]
pub(crate) struct ResolveBody {
    pub redirect: String,
}

/// Decode a list body; anything but a JSON array of records is malformed.
pub(crate) fn decode_list(body: &[u8]) -> Result<Vec<SlugRecord>, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::MalformedResponse(format!("list body is not JSON: {e}")))?;

    if !value.is_array() {
        return Err(ApiError::MalformedResponse(format!(
            "expected a JSON array of slugs, got {}",
            json_kind(&value)
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedResponse(format!("invalid slug record: {e}")))
}

/// Decode a single record body.
pub(crate) fn decode_record(body: &[u8]) -> Result<SlugRecord, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::MalformedResponse(format!("invalid slug record: {e}")))
}

/// Decode a resolve body into its redirect target.
pub(crate) fn decode_redirect(slug: &str, body: &[u8]) -> Result<String, ApiError> {
    let body: ResolveBody = serde_json::from_slice(body)
        .map_err(|e| ApiError::MalformedResponse(format!("invalid resolve body: {e}")))?;

    if body.redirect.trim().is_empty() {
        return Err(ApiError::NotFound(slug.to_string()));
    }

    Ok(body.redirect)
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
