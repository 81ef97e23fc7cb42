//! State shape for the records screen.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Page number shown on first load.
const INITIAL_PAGE: u64 = 1;
/// Page size shown on first load.
const INITIAL_LIMIT: u64 = 5;

/// Query parameters driving the record list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordParams {
    /// 1-based page number.
    pub page: u64,
    /// Records per page.
    pub limit: u64,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    /// Owner ids to filter by; empty means every visible owner.
    pub user: Vec<String>,
}

impl Default for RecordParams {
    fn default() -> Self {
        Self {
            page: INITIAL_PAGE,
            limit: INITIAL_LIMIT,
            from: None,
            to: None,
            user: Vec::new(),
        }
    }
}

impl RecordParams {
    /// Return a copy with every field present in `patch` overwritten.
    #[must_use]
    pub fn merged(&self, patch: &ParamsPatch) -> Self {
        Self {
            page: patch.page.unwrap_or(self.page),
            limit: patch.limit.unwrap_or(self.limit),
            from: patch.from.unwrap_or(self.from),
            to: patch.to.unwrap_or(self.to),
            user: patch.user.clone().unwrap_or_else(|| self.user.clone()),
        }
    }
}

/// Partial update for [`RecordParams`].
///
/// `None` leaves a field alone. The date bounds are doubly optional so a
/// patch can clear them: `Some(None)` (JSON `null`) resets the bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParamsPatch {
    /// New page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// New page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// New lower date bound, or `Some(None)` to clear it.
    #[serde(
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<Option<NaiveDate>>,
    /// New upper date bound, or `Some(None)` to clear it.
    #[serde(
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<Option<NaiveDate>>,
    /// New owner filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Vec<String>>,
}

impl ParamsPatch {
    /// Patch that only moves to another page.
    #[must_use]
    pub fn page(page: u64) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}

/// Mark a field as present even when its JSON value is `null`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Everything the records screen renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordState<R> {
    /// Current page of records as last fetched.
    pub records: Vec<R>,
    /// Record most recently created or updated.
    pub current_record: Option<R>,
    /// Records returned by the last export.
    pub filtered_results: Vec<R>,
    /// Total number of records on the server, adjusted optimistically.
    pub count: u64,
    /// Query parameters for the next fetch.
    pub params: RecordParams,
    /// Failure body from the last failed request, cleared on success.
    pub error: Option<Value>,
}

impl<R> Default for RecordState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            current_record: None,
            filtered_results: Vec::new(),
            count: 0,
            params: RecordParams::default(),
            error: None,
        }
    }
}
