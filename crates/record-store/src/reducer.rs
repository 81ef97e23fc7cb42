//! Pure transition table for [`RecordState`].

use crate::action::{Outcome, RecordAction};
use crate::state::RecordState;

/// Compute the state that follows `action`.
///
/// Successful completions clear `error`; failed ones set it to the failure
/// body and touch nothing else. Create and delete adjust `count` in place
/// instead of re-fetching, and neither they nor update edit `records`: the
/// caller re-fetches to see the change in the list. `Requested` actions
/// leave the state as it was.
///
/// # Examples
///
/// ```
/// use record_store::{Outcome, RecordAction, RecordState, reduce};
/// use serde_json::json;
///
/// let state = RecordState::<String> { count: 3, ..RecordState::default() };
/// let next = reduce(&state, &RecordAction::DeleteRecord(Outcome::Success(json!({"id": "42"}))));
/// assert_eq!(next.count, 2);
/// assert_eq!(next.error, None);
/// ```
#[must_use]
pub fn reduce<R: Clone>(state: &RecordState<R>, action: &RecordAction<R>) -> RecordState<R> {
    let mut next = state.clone();
    match action {
        RecordAction::SetParams(patch) => {
            next.params = state.params.merged(patch);
        }
        RecordAction::Requested(_) => {}
        RecordAction::GetRecords(Outcome::Success(payload)) => {
            next.records.clone_from(&payload.records);
            next.count = payload.count;
            next.error = None;
        }
        RecordAction::CreateRecord(Outcome::Success(record)) => {
            next.current_record = Some(record.clone());
            next.count = state.count.saturating_add(1);
            next.error = None;
        }
        RecordAction::UpdateRecord(Outcome::Success(record)) => {
            next.current_record = Some(record.clone());
            next.error = None;
        }
        RecordAction::DeleteRecord(Outcome::Success(_)) => {
            next.count = state.count.saturating_sub(1);
            next.error = None;
        }
        RecordAction::ExportRecords(Outcome::Success(payload)) => {
            next.filtered_results.clone_from(&payload.records);
            next.error = None;
        }
        RecordAction::GetRecords(Outcome::Failure(failure))
        | RecordAction::CreateRecord(Outcome::Failure(failure))
        | RecordAction::UpdateRecord(Outcome::Failure(failure))
        | RecordAction::DeleteRecord(Outcome::Failure(failure))
        | RecordAction::ExportRecords(Outcome::Failure(failure)) => {
            next.error = Some(failure.data.clone());
        }
    }
    next
}

#[cfg(test)]
mod tests;
