//! Field checks shared by the catalog services.
//!
//! Every check is pure; none of them touch storage.

use crate::error::{ServiceError, ServiceResult};
use crate::model::EntityId;
use once_cell::sync::Lazy;
use regex::Regex;

static LANGCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("valid langcode regex")
});
static URL_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\S*$").expect("valid url alias regex"));

/// Rejects empty or whitespace-only text.
pub fn require_text(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("`{field}` is required")));
    }
    Ok(())
}

/// Like [`require_text`] for optional input.
pub fn require_some_text(field: &str, value: Option<&str>) -> ServiceResult<()> {
    require_text(field, value.unwrap_or_default())
}

pub fn require_id(field: &str, id: EntityId) -> ServiceResult<()> {
    if id.is_nil() {
        return Err(ServiceError::validation(format!("`{field}` must not be nil")));
    }
    Ok(())
}

/// Accepts language tags such as `en`, `und`, `en-US` or `zh-Hant`.
pub fn require_langcode(value: &str) -> ServiceResult<()> {
    if !LANGCODE_RE.is_match(value) {
        return Err(ServiceError::validation(format!(
            "`langcode` is not a language code: `{value}`"
        )));
    }
    Ok(())
}

/// Accepts site-relative paths such as `/apis/payments` or `/συχνές-ερωτήσεις`.
pub fn require_url_alias(value: &str) -> ServiceResult<()> {
    if !URL_ALIAS_RE.is_match(value) {
        return Err(ServiceError::validation(format!(
            "`url_alias` must be a path starting with `/`: `{value}`"
        )));
    }
    Ok(())
}

/// Returns the trimmed value when it is not blank.
pub fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
