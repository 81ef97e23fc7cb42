//! Client-side state for the records screen.
//!
//! The records screen keeps one [`RecordState`] and moves it forward with
//! [`reduce`], a pure function of `(state, action)`. Actions are
//! [`RecordAction`] values: a synchronous [`RecordAction::SetParams`] and one
//! variant per asynchronous record operation, each carrying an [`Outcome`]
//! (the server payload on success, the failure body on error).
//!
//! [`RecordStore`] wraps a state value for callers that want a mutable
//! dispatch loop with logging; the reducer itself performs no I/O.
//!
//! # Examples
//!
//! ```
//! use record_store::{ParamsPatch, RecordAction, RecordState, reduce};
//!
//! let state: RecordState<String> = RecordState::default();
//! let next = reduce(&state, &RecordAction::SetParams(ParamsPatch::page(2)));
//! assert_eq!(next.params.page, 2);
//! assert_eq!(next.params.limit, state.params.limit);
//! ```

mod action;
mod reducer;
mod state;
mod store;

pub use action::{ExportPayload, FailurePayload, Outcome, RecordAction, RecordOperation, RecordsPayload};
pub use reducer::reduce;
pub use state::{ParamsPatch, RecordParams, RecordState};
pub use store::RecordStore;
