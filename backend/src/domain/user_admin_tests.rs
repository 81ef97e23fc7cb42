//! Tests for the user administration service.

use std::sync::Arc;

use mockall::Sequence;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockRecordRepository, MockUserRepository};
use crate::domain::{ErrorCode, NameField, PersonName, PlainPassword};

type Service = UserAdminService<MockUserRepository, MockRecordRepository>;

fn make_service(users: MockUserRepository, records: MockRecordRepository) -> Service {
    UserAdminService::new(Arc::new(users), Arc::new(records))
}

fn email(raw: &str) -> Email {
    Email::new(raw).expect("valid email")
}

fn profile(role: Role, address: &str) -> UserProfile {
    UserProfile::new(
        UserId::random(),
        email(address),
        role,
        PersonName::new(NameField::FirstName, "Grace").expect("name"),
        PersonName::new(NameField::LastName, "Hopper").expect("name"),
    )
}

fn stored(role: Role, address: &str) -> User {
    let hash = PasswordHash::from_phc(
        "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$3q0VrV8yVwHOlqx9OQTcNRQbIsPJQ8T2b6NSkBeMRTw",
    )
    .expect("valid phc");
    User::new(profile(role, address), hash)
}

fn new_user(role: Role) -> NewUser {
    NewUser {
        email: email("new@example.com"),
        password: PlainPassword::new("long enough").expect("password"),
        role,
        first_name: PersonName::new(NameField::FirstName, "New").expect("name"),
        last_name: PersonName::new(NameField::LastName, "Person").expect("name"),
    }
}

#[fixture]
fn manager() -> Requester {
    Requester::new(UserId::random(), Role::Manager)
}

#[rstest]
#[tokio::test]
async fn requester_loads_role_from_repository() {
    let user = stored(Role::Manager, "boss@example.com");
    let id = *user.id();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(user)));

    let service = make_service(users, MockRecordRepository::new());
    let requester = service.requester(&id).await.expect("requester");
    assert_eq!(requester, Requester::new(id, Role::Manager));
}

#[rstest]
#[tokio::test]
async fn unknown_requester_is_unauthorised() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let service = make_service(users, MockRecordRepository::new());
    let err = service
        .requester(&UserId::random())
        .await
        .expect_err("unknown");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn list_applies_visibility_filter_and_window(manager: Requester) {
    let visible = vec![profile(Role::User, "a@example.com")];
    let returned = visible.clone();
    let expected_filter = UserFilter::visible_to(&manager);
    let mut users = MockUserRepository::new();
    users
        .expect_list_page()
        .withf(move |filter, window| {
            *filter == expected_filter && *window == Window { skip: 5, limit: 5 }
        })
        .times(1)
        .return_once(move |_, _| Ok(returned));
    users
        .expect_count()
        .withf(move |filter| *filter == expected_filter)
        .times(1)
        .return_once(|_| Ok(11));

    let service = make_service(users, MockRecordRepository::new());
    let page = PageRequest::new(2, 5).expect("page");
    let result = service.list(&manager, page).await.expect("list");
    assert_eq!(result.items, visible);
    assert_eq!(result.count, 11);
}

#[rstest]
#[tokio::test]
async fn create_hashes_password_and_hides_it(manager: Requester) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user| {
            user.password_hash().as_str().starts_with("$argon2id$")
                && user.profile().email().as_str() == "new@example.com"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(users, MockRecordRepository::new());
    let created = service
        .create(&manager, new_user(Role::Manager))
        .await
        .expect("created");
    assert_eq!(created.role(), Role::Manager);
    assert_eq!(created.email().as_str(), "new@example.com");
}

#[rstest]
#[tokio::test]
async fn create_rejects_taken_email_before_role_check(manager: Requester) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Ok(Some(profile(Role::User, "new@example.com"))));
    users.expect_insert().never();

    let service = make_service(users, MockRecordRepository::new());
    let err = service
        .create(&manager, new_user(Role::Admin))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "User already registered.");
}

#[rstest]
#[tokio::test]
async fn manager_cannot_create_admin(manager: Requester) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users.expect_insert().never();

    let service = make_service(users, MockRecordRepository::new());
    let err = service
        .create(&manager, new_user(Role::Admin))
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), "You are not authorized to perform this action.");
}

#[rstest]
#[tokio::test]
async fn storage_uniqueness_race_is_a_conflict(manager: Requester) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_email()));

    let service = make_service(users, MockRecordRepository::new());
    let err = service
        .create(&manager, new_user(Role::User))
        .await
        .expect_err("race");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn persistence_failures_map_to_server_errors(
    manager: Requester,
    #[case] failure: UserPersistenceError,
    #[case] code: ErrorCode,
) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Err(failure));

    let service = make_service(users, MockRecordRepository::new());
    let err = service
        .create(&manager, new_user(Role::User))
        .await
        .expect_err("failure");
    assert_eq!(err.code(), code);
}

#[rstest]
#[case("not-a-uuid")]
#[case("")]
#[tokio::test]
async fn unparseable_target_id_is_not_found(manager: Requester, #[case] raw: &str) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().never();

    let service = make_service(users, MockRecordRepository::new());
    let err = service
        .resolve_target(&manager, raw)
        .await
        .expect_err("not found");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "User not found.");
}

#[rstest]
#[tokio::test]
async fn missing_target_is_not_found(manager: Requester) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let service = make_service(users, MockRecordRepository::new());
    let raw = UserId::random().to_string();
    let err = service
        .resolve_target(&manager, &raw)
        .await
        .expect_err("not found");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Role::Admin, false)]
#[case(Role::Manager, true)]
#[case(Role::User, true)]
#[tokio::test]
async fn targets_above_requester_are_forbidden(
    manager: Requester,
    #[case] target_role: Role,
    #[case] allowed: bool,
) {
    let target = stored(target_role, "target@example.com");
    let raw = target.id().to_string();
    let expected = target.profile().clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(target)));

    let service = make_service(users, MockRecordRepository::new());
    let result = service.resolve_target(&manager, &raw).await;
    if allowed {
        let resolved = result.expect("resolved");
        assert_eq!(service.read(&resolved), expected);
    } else {
        let err = result.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}

#[rstest]
#[tokio::test]
async fn update_merges_fields_and_keeps_hash_without_password(manager: Requester) {
    let target = stored(Role::User, "old@example.com");
    let original_hash = target.password_hash().clone();
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_update()
        .withf(move |user| {
            user.password_hash() == &original_hash
                && user.profile().email().as_str() == "fresh@example.com"
                && user.profile().first_name().as_str() == "Grace"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(users, MockRecordRepository::new());
    let patch = UserPatch {
        email: Some(email("fresh@example.com")),
        ..UserPatch::default()
    };
    let updated = service
        .update(&manager, ResolvedUser::new(target), patch)
        .await
        .expect("updated");
    assert_eq!(updated.email().as_str(), "fresh@example.com");
    assert_eq!(updated.role(), Role::User);
}

#[rstest]
#[tokio::test]
async fn update_allows_keeping_own_email(manager: Requester) {
    let target = stored(Role::User, "same@example.com");
    let own = target.profile().clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(own)));
    users.expect_update().times(1).return_once(|_| Ok(()));

    let service = make_service(users, MockRecordRepository::new());
    let patch = UserPatch {
        email: Some(email("same@example.com")),
        ..UserPatch::default()
    };
    service
        .update(&manager, ResolvedUser::new(target), patch)
        .await
        .expect("own email is fine");
}

#[rstest]
#[tokio::test]
async fn update_rejects_email_owned_by_someone_else(manager: Requester) {
    let target = stored(Role::User, "mine@example.com");
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Ok(Some(profile(Role::User, "theirs@example.com"))));
    users.expect_update().never();

    let service = make_service(users, MockRecordRepository::new());
    let patch = UserPatch {
        email: Some(email("theirs@example.com")),
        ..UserPatch::default()
    };
    let err = service
        .update(&manager, ResolvedUser::new(target), patch)
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn update_cannot_promote_above_requester(manager: Requester) {
    let target = stored(Role::User, "mine@example.com");
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().never();
    users.expect_update().never();

    let service = make_service(users, MockRecordRepository::new());
    let patch = UserPatch {
        role: Some(Role::Admin),
        ..UserPatch::default()
    };
    let err = service
        .update(&manager, ResolvedUser::new(target), patch)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_rehashes_supplied_password(manager: Requester) {
    let target = stored(Role::User, "mine@example.com");
    let original_hash = target.password_hash().clone();
    let mut users = MockUserRepository::new();
    users
        .expect_update()
        .withf(move |user| user.password_hash() != &original_hash)
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(users, MockRecordRepository::new());
    let patch = UserPatch {
        password: Some(PlainPassword::new("brand new secret").expect("password")),
        ..UserPatch::default()
    };
    service
        .update(&manager, ResolvedUser::new(target), patch)
        .await
        .expect("updated");
}

#[rstest]
#[tokio::test]
async fn remove_deletes_records_before_user() {
    let target = stored(Role::User, "leaving@example.com");
    let id = *target.id();
    let mut seq = Sequence::new();
    let mut records = MockRecordRepository::new();
    records
        .expect_delete_by_owner()
        .withf(move |owner| *owner == id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(4));
    let mut users = MockUserRepository::new();
    users
        .expect_delete()
        .withf(move |user| *user == id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(true));

    let service = make_service(users, records);
    let removed = service
        .remove(ResolvedUser::new(target))
        .await
        .expect("removed");
    assert_eq!(removed, id);
}

#[rstest]
#[tokio::test]
async fn remove_keeps_user_when_record_cleanup_fails() {
    let target = stored(Role::User, "leaving@example.com");
    let mut records = MockRecordRepository::new();
    records
        .expect_delete_by_owner()
        .return_once(|_| Err(RecordPersistenceError::connection("down")));
    let mut users = MockUserRepository::new();
    users.expect_delete().never();

    let service = make_service(users, records);
    let err = service
        .remove(ResolvedUser::new(target))
        .await
        .expect_err("unavailable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_stores_an_administrator_when_email_is_free() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().times(1).return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user| {
            user.role() == Role::Admin
                && user.profile().email().as_str() == "new@example.com"
                && user.password_hash().as_str().starts_with("$argon2id$")
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(users, MockRecordRepository::new());
    let outcome = service
        .ensure_admin(new_user(Role::User))
        .await
        .expect("seeded");
    assert!(matches!(outcome, AdminBootstrap::Created(_)));
}

#[rstest]
#[tokio::test]
async fn ensure_admin_leaves_existing_holder_untouched() {
    let existing = profile(Role::Manager, "new@example.com");
    let id = *existing.id();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    users.expect_insert().never();

    let service = make_service(users, MockRecordRepository::new());
    let outcome = service
        .ensure_admin(new_user(Role::Admin))
        .await
        .expect("already present");
    assert_eq!(outcome, AdminBootstrap::AlreadyPresent(id));
}

#[rstest]
#[tokio::test]
async fn ensure_admin_treats_a_lost_insert_race_as_present() {
    let winner = profile(Role::Admin, "new@example.com");
    let id = *winner.id();
    let mut seq = Sequence::new();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(None));
    users
        .expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err(UserPersistenceError::duplicate_email()));
    users
        .expect_find_by_email()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(winner)));

    let service = make_service(users, MockRecordRepository::new());
    let outcome = service
        .ensure_admin(new_user(Role::Admin))
        .await
        .expect("already present");
    assert_eq!(outcome, AdminBootstrap::AlreadyPresent(id));
}
