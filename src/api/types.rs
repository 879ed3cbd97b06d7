//! Shared types for the HTTP layer.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::calendar;
use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Chat-bubble answer from the assistant endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// Parse an optional `YYYY-MM-DD` query value, defaulting to today (UTC).
pub fn date_or_today(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => Ok(calendar::parse_date(value)?),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Parse an optional date query value; empty means absent.
pub fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(calendar::parse_date)
        .transpose()
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_or_today_parses_and_defaults() {
        assert_eq!(
            date_or_today(Some("2024-12-30")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
        );
        assert_eq!(date_or_today(None).unwrap(), Utc::now().date_naive());
        assert!(date_or_today(Some("30/12/2024")).is_err());
    }

    #[test]
    fn optional_date_treats_blank_as_absent() {
        assert_eq!(optional_date(Some("  ")).unwrap(), None);
        assert!(optional_date(Some("2024-12-01")).unwrap().is_some());
    }
}
