//! Actions accepted by the records reducer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ParamsPatch;

/// Result of one asynchronous request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The request succeeded with this payload.
    Success(T),
    /// The request failed; the payload carries the response body.
    Failure(FailurePayload),
}

/// Failure body delivered with a failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePayload {
    /// Response body returned by the server.
    pub data: Value,
}

impl FailurePayload {
    /// Wrap a server response body.
    #[must_use]
    pub fn new(data: impl Into<Value>) -> Self {
        Self { data: data.into() }
    }
}

/// Page of records returned by a list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsPayload<R> {
    /// Records on the requested page.
    pub records: Vec<R>,
    /// Total number of records matching the query.
    pub count: u64,
}

/// Records returned by an export request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload<R> {
    /// Every record matching the export filter.
    pub records: Vec<R>,
}

/// Asynchronous operations the records screen issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordOperation {
    /// Fetch one page of records.
    GetRecords,
    /// Create a record.
    CreateRecord,
    /// Update a record.
    UpdateRecord,
    /// Delete a record.
    #[serde(rename = "DEL_RECORD")]
    DeleteRecord,
    /// Export every record matching the filter.
    ExportRecords,
}

impl RecordOperation {
    /// Stable action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetRecords => "GET_RECORDS",
            Self::CreateRecord => "CREATE_RECORD",
            Self::UpdateRecord => "UPDATE_RECORD",
            Self::DeleteRecord => "DEL_RECORD",
            Self::ExportRecords => "EXPORT_RECORDS",
        }
    }
}

/// Message moving the records screen forward.
///
/// Serialises as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordAction<R> {
    /// Merge new query parameters.
    SetParams(ParamsPatch),
    /// A request was issued and has not completed yet.
    Requested(RecordOperation),
    /// A page fetch completed.
    GetRecords(Outcome<RecordsPayload<R>>),
    /// A create request completed.
    CreateRecord(Outcome<R>),
    /// An update request completed.
    UpdateRecord(Outcome<R>),
    /// A delete request completed. The success body is kept as sent and
    /// never read.
    #[serde(rename = "DEL_RECORD")]
    DeleteRecord(Outcome<Value>),
    /// An export request completed.
    ExportRecords(Outcome<ExportPayload<R>>),
}

impl<R> RecordAction<R> {
    /// Operation this action reports on, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<RecordOperation> {
        match self {
            Self::SetParams(_) => None,
            Self::Requested(operation) => Some(*operation),
            Self::GetRecords(_) => Some(RecordOperation::GetRecords),
            Self::CreateRecord(_) => Some(RecordOperation::CreateRecord),
            Self::UpdateRecord(_) => Some(RecordOperation::UpdateRecord),
            Self::DeleteRecord(_) => Some(RecordOperation::DeleteRecord),
            Self::ExportRecords(_) => Some(RecordOperation::ExportRecords),
        }
    }

    /// Short label for logs, e.g. `CREATE_RECORD/success`.
    #[must_use]
    pub fn label(&self) -> String {
        let status = match self {
            Self::SetParams(_) => return "SET_PARAMS".to_owned(),
            Self::Requested(operation) => return format!("{}/requested", operation.as_str()),
            Self::GetRecords(outcome) => outcome_status(outcome),
            Self::CreateRecord(outcome) | Self::UpdateRecord(outcome) => outcome_status(outcome),
            Self::DeleteRecord(outcome) => outcome_status(outcome),
            Self::ExportRecords(outcome) => outcome_status(outcome),
        };
        match self.operation() {
            Some(operation) => format!("{}/{status}", operation.as_str()),
            None => status.to_owned(),
        }
    }
}

const fn outcome_status<T>(outcome: &Outcome<T>) -> &'static str {
    match outcome {
        Outcome::Success(_) => "success",
        Outcome::Failure(_) => "failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn set_params_parses_from_type_and_payload() {
        let action: RecordAction<Value> =
            serde_json::from_value(json!({"type": "SET_PARAMS", "payload": {"page": 2}}))
                .expect("action JSON");
        assert_eq!(action, RecordAction::SetParams(ParamsPatch::page(2)));
    }

    #[rstest]
    fn failure_outcome_parses_data() {
        let action: RecordAction<Value> = serde_json::from_value(json!({
            "type": "GET_RECORDS",
            "payload": {"status": "failure", "payload": {"data": "Not found."}}
        }))
        .expect("action JSON");
        assert_eq!(
            action,
            RecordAction::GetRecords(Outcome::Failure(FailurePayload::new("Not found.")))
        );
    }

    #[rstest]
    #[case(json!({"id": "7d0c5b1e-2f4a-4c1e-9a51-0f3d2c6b8e11"}))]
    #[case(json!({}))]
    #[case(Value::Null)]
    fn delete_success_accepts_any_response_body(#[case] body: Value) {
        let action: RecordAction<Value> = serde_json::from_value(json!({
            "type": "DEL_RECORD",
            "payload": {"status": "success", "payload": body.clone()}
        }))
        .expect("action JSON");
        assert_eq!(action, RecordAction::DeleteRecord(Outcome::Success(body)));
    }

    #[rstest]
    #[case(RecordAction::SetParams(ParamsPatch::default()), "SET_PARAMS")]
    #[case(RecordAction::Requested(RecordOperation::ExportRecords), "EXPORT_RECORDS/requested")]
    #[case(RecordAction::DeleteRecord(Outcome::Success(Value::Null)), "DEL_RECORD/success")]
    #[case(
        RecordAction::CreateRecord(Outcome::Failure(FailurePayload::new("boom"))),
        "CREATE_RECORD/failure"
    )]
    fn labels_name_operation_and_status(#[case] action: RecordAction<Value>, #[case] label: &str) {
        assert_eq!(action.label(), label);
    }
}
