//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn name(field: NameField, raw: &str) -> PersonName {
    PersonName::new(field, raw).expect("valid name")
}

#[fixture]
fn profile() -> UserProfile {
    UserProfile::new(
        UserId::new(VALID_ID).expect("valid id"),
        Email::new("ada@example.com").expect("valid email"),
        Role::Manager,
        name(NameField::FirstName, "Ada"),
        name(NameField::LastName, "Lovelace"),
    )
}

#[rstest]
#[case(VALID_ID, true)]
#[case("not-a-uuid", false)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
#[case("", false)]
fn user_id_requires_canonical_uuid(#[case] raw: &str, #[case] ok: bool) {
    let result = UserId::new(raw);
    assert_eq!(result.is_ok(), ok, "input {raw:?}");
    if let Ok(id) = result {
        assert_eq!(id.to_string(), raw);
    }
}

#[rstest]
fn user_id_serialises_as_string() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let value = serde_json::to_value(id).expect("serialise id");
    assert_eq!(value, serde_json::json!(VALID_ID));
}

#[rstest]
#[case("ada@example.com", Ok(()))]
#[case("", Err(UserValidationError::EmptyEmail))]
#[case("   ", Err(UserValidationError::EmptyEmail))]
#[case("ada", Err(UserValidationError::InvalidEmail))]
#[case("ada@example", Err(UserValidationError::InvalidEmail))]
#[case("ada lovelace@example.com", Err(UserValidationError::InvalidEmail))]
#[case(" ada@example.com", Err(UserValidationError::InvalidEmail))]
fn email_shape_rules(#[case] raw: &str, #[case] expected: Result<(), UserValidationError>) {
    assert_eq!(Email::new(raw).map(|_| ()), expected);
}

#[rstest]
fn email_length_is_capped() {
    let local = "a".repeat(EMAIL_MAX);
    let raw = format!("{local}@example.com");
    assert_eq!(
        Email::new(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
fn email_comparison_is_case_sensitive() {
    let lower = Email::new("ada@example.com").expect("valid email");
    let upper = Email::new("Ada@example.com").expect("valid email");
    assert_ne!(lower, upper);
}

#[rstest]
fn names_are_trimmed() {
    assert_eq!(name(NameField::FirstName, "  Ada ").as_str(), "Ada");
}

#[rstest]
#[case("", UserValidationError::EmptyName { field: NameField::LastName })]
#[case("  ", UserValidationError::EmptyName { field: NameField::LastName })]
fn blank_names_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(PersonName::new(NameField::LastName, raw), Err(expected));
}

#[rstest]
fn long_names_are_rejected() {
    let err = PersonName::new(NameField::FirstName, "a".repeat(NAME_MAX + 1)).expect_err("long");
    assert_eq!(
        err,
        UserValidationError::NameTooLong {
            field: NameField::FirstName,
            max: NAME_MAX,
        }
    );
    assert_eq!(err.field(), "firstName");
    assert_eq!(err.code(), "too_long");
}

#[rstest]
fn merged_only_touches_supplied_fields(profile: UserProfile) {
    let patch = UserPatch {
        role: Some(Role::User),
        last_name: Some(name(NameField::LastName, "Byron")),
        ..UserPatch::default()
    };
    let merged = profile.clone().merged(&patch);

    assert_eq!(merged.id(), profile.id());
    assert_eq!(merged.email(), profile.email());
    assert_eq!(merged.first_name(), profile.first_name());
    assert_eq!(merged.role(), Role::User);
    assert_eq!(merged.last_name().as_str(), "Byron");
}

#[rstest]
#[case(Role::Admin, Role::Admin, true)]
#[case(Role::Admin, Role::User, true)]
#[case(Role::Manager, Role::Admin, false)]
#[case(Role::Manager, Role::Manager, true)]
#[case(Role::User, Role::Manager, false)]
#[case(Role::User, Role::User, true)]
fn requester_manages_equal_or_lower_ranks(
    #[case] own: Role,
    #[case] target: Role,
    #[case] expected: bool,
) {
    let requester = Requester::new(UserId::random(), own);
    assert_eq!(requester.can_manage(target), expected);
}
