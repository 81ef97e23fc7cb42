//! Transition coverage for the records reducer.

use super::*;
use crate::action::{ExportPayload, FailurePayload, RecordOperation, RecordsPayload};
use crate::state::{ParamsPatch, RecordParams};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    id: u32,
    note: &'static str,
}

fn entry(id: u32) -> Entry {
    Entry { id, note: "jog" }
}

#[fixture]
fn populated() -> RecordState<Entry> {
    RecordState {
        records: vec![entry(1), entry(2)],
        current_record: Some(entry(2)),
        filtered_results: vec![entry(1)],
        count: 3,
        params: RecordParams::default(),
        error: Some(json!("stale failure")),
    }
}

fn failure(data: &str) -> FailurePayload {
    FailurePayload::new(data)
}

#[rstest]
fn set_params_merges_and_leaves_the_rest(populated: RecordState<Entry>) {
    let next = reduce(&populated, &RecordAction::SetParams(ParamsPatch::page(2)));

    assert_eq!(
        next.params,
        RecordParams {
            page: 2,
            ..RecordParams::default()
        }
    );
    assert_eq!(next.records, populated.records);
    assert_eq!(next.count, populated.count);
    assert_eq!(next.error, populated.error);
}

#[rstest]
fn set_params_on_initial_state_only_changes_page() {
    let initial = RecordState::<Entry>::default();
    let next = reduce(&initial, &RecordAction::SetParams(ParamsPatch::page(2)));

    let mut expected = initial.clone();
    expected.params.page = 2;
    assert_eq!(next, expected);
}

#[rstest]
fn get_records_success_replaces_page_and_count(populated: RecordState<Entry>) {
    let action = RecordAction::GetRecords(Outcome::Success(RecordsPayload {
        records: vec![entry(7)],
        count: 11,
    }));
    let next = reduce(&populated, &action);

    assert_eq!(next.records, vec![entry(7)]);
    assert_eq!(next.count, 11);
    assert_eq!(next.error, None);
    assert_eq!(next.current_record, populated.current_record);
}

#[rstest]
fn create_success_sets_current_and_increments(populated: RecordState<Entry>) {
    let next = reduce(
        &populated,
        &RecordAction::CreateRecord(Outcome::Success(entry(9))),
    );

    assert_eq!(next.current_record, Some(entry(9)));
    assert_eq!(next.count, 4);
    assert_eq!(next.error, None);
    assert_eq!(next.records, populated.records);
}

#[rstest]
fn update_success_sets_current_without_touching_list(populated: RecordState<Entry>) {
    let updated = Entry {
        id: 1,
        note: "swim",
    };
    let next = reduce(
        &populated,
        &RecordAction::UpdateRecord(Outcome::Success(updated.clone())),
    );

    assert_eq!(next.current_record, Some(updated));
    assert_eq!(next.records, populated.records);
    assert_eq!(next.count, populated.count);
    assert_eq!(next.error, None);
}

#[rstest]
fn delete_success_decrements_without_touching_list(populated: RecordState<Entry>) {
    let next = reduce(&populated, &RecordAction::DeleteRecord(Outcome::Success(Value::Null)));

    assert_eq!(next.count, 2);
    assert_eq!(next.error, None);
    assert_eq!(next.records, populated.records);
}

#[rstest]
fn delete_success_never_drops_below_zero() {
    let initial = RecordState::<Entry>::default();
    let next = reduce(&initial, &RecordAction::DeleteRecord(Outcome::Success(Value::Null)));
    assert_eq!(next.count, 0);
}

#[rstest]
fn export_success_replaces_filtered_results(populated: RecordState<Entry>) {
    let action = RecordAction::ExportRecords(Outcome::Success(ExportPayload {
        records: vec![entry(3), entry(4)],
    }));
    let next = reduce(&populated, &action);

    assert_eq!(next.filtered_results, vec![entry(3), entry(4)]);
    assert_eq!(next.records, populated.records);
    assert_eq!(next.error, None);
}

#[rstest]
#[case(RecordAction::GetRecords(Outcome::Failure(failure("get failed"))), "get failed")]
#[case(RecordAction::CreateRecord(Outcome::Failure(failure("create failed"))), "create failed")]
#[case(RecordAction::UpdateRecord(Outcome::Failure(failure("update failed"))), "update failed")]
#[case(RecordAction::DeleteRecord(Outcome::Failure(failure("delete failed"))), "delete failed")]
#[case(RecordAction::ExportRecords(Outcome::Failure(failure("export failed"))), "export failed")]
fn failures_only_set_error(
    populated: RecordState<Entry>,
    #[case] action: RecordAction<Entry>,
    #[case] message: &str,
) {
    let next = reduce(&populated, &action);

    let mut expected = populated.clone();
    expected.error = Some(Value::from(message));
    assert_eq!(next, expected);
}

#[rstest]
#[case(RecordOperation::GetRecords)]
#[case(RecordOperation::DeleteRecord)]
fn requested_actions_leave_state_unchanged(
    populated: RecordState<Entry>,
    #[case] operation: RecordOperation,
) {
    let next = reduce(&populated, &RecordAction::Requested(operation));
    assert_eq!(next, populated);
}

#[rstest]
fn reducing_the_same_input_twice_gives_the_same_state(populated: RecordState<Entry>) {
    let action = RecordAction::CreateRecord(Outcome::Success(entry(5)));
    let first = reduce(&populated, &action);
    let second = reduce(&populated, &action);

    assert_eq!(first, second);
    assert_eq!(populated.count, 3, "input state is not mutated");
}
