//! Owning wrapper that applies actions in sequence.

use tracing::debug;

use crate::action::RecordAction;
use crate::reducer::reduce;
use crate::state::RecordState;

/// Holds the current [`RecordState`] and advances it one action at a time.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    state: RecordState<R>,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RecordStore<R> {
    /// Start from the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RecordState::default(),
        }
    }

    /// Start from an existing state.
    #[must_use]
    pub const fn with_state(state: RecordState<R>) -> Self {
        Self { state }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &RecordState<R> {
        &self.state
    }

    /// Consume the store, returning its state.
    #[must_use]
    pub fn into_state(self) -> RecordState<R> {
        self.state
    }
}

impl<R: Clone> RecordStore<R> {
    /// Apply `action` and return the resulting state.
    pub fn dispatch(&mut self, action: &RecordAction<R>) -> &RecordState<R> {
        self.state = reduce(&self.state, action);
        debug!(
            action = %action.label(),
            count = self.state.count,
            failed = self.state.error.is_some(),
            "records action applied"
        );
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{FailurePayload, Outcome, RecordOperation, RecordsPayload};
    use crate::state::ParamsPatch;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    fn dispatch_sequence_follows_the_reducer() {
        let mut store = RecordStore::<String>::new();

        store.dispatch(&RecordAction::SetParams(ParamsPatch::page(2)));
        store.dispatch(&RecordAction::Requested(RecordOperation::GetRecords));
        store.dispatch(&RecordAction::GetRecords(Outcome::Success(RecordsPayload {
            records: vec!["a".to_owned(), "b".to_owned()],
            count: 7,
        })));
        let state = store.dispatch(&RecordAction::DeleteRecord(Outcome::Success(Value::Null)));

        assert_eq!(state.params.page, 2);
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.count, 6);
        assert_eq!(state.error, None);
    }

    #[rstest]
    fn failure_is_kept_until_next_success() {
        let mut store = RecordStore::<String>::new();

        store.dispatch(&RecordAction::CreateRecord(Outcome::Failure(
            FailurePayload::new(json!({"message": "Distance is required"})),
        )));
        assert_eq!(
            store.state().error,
            Some(json!({"message": "Distance is required"}))
        );

        store.dispatch(&RecordAction::SetParams(ParamsPatch::page(3)));
        assert!(store.state().error.is_some());

        store.dispatch(&RecordAction::CreateRecord(Outcome::Success("c".to_owned())));
        let state = store.into_state();
        assert_eq!(state.error, None);
        assert_eq!(state.current_record.as_deref(), Some("c"));
        assert_eq!(state.count, 1);
    }

    #[rstest]
    fn with_state_starts_from_given_state() {
        let initial = RecordState::<String> {
            count: 4,
            ..RecordState::default()
        };
        let store = RecordStore::with_state(initial.clone());
        assert_eq!(store.state(), &initial);
    }
}
