/// Shared request helpers used across handlers
use serde::Deserialize;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Path id parsing with the `Invalid <resource> ID format` message.
pub fn parse_id(raw: &str, resource: &str) -> Result<Uuid, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request(format!("{} ID is required", capitalize(resource))));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} ID format", resource)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `?page=&limit=` as sent by clients; anything unparsable falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based.
    pub number: u64,
    pub limit: u64,
}

impl Page {
    /// Rows to skip; a page whose offset does not fit the store's range is a 400.
    pub fn offset(&self) -> Result<i64, ApiError> {
        (self.number - 1)
            .checked_mul(self.limit)
            .and_then(|offset| i64::try_from(offset).ok())
            .ok_or_else(|| ApiError::bad_request("Invalid page"))
    }
}

impl PageQuery {
    /// Page is at least 1; limit is clamped to `1..=max_page_size`.
    pub fn resolve(&self, api: &ApiConfig) -> Page {
        let number = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1) as u64;
        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .map(|l| l.clamp(1, api.max_page_size as i64) as u64)
            .unwrap_or(api.default_page_size as u64);
        Page { number, limit }
    }
}
