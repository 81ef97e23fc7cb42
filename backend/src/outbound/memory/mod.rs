//! In-process repository adapters.
//!
//! Used when no database is configured and by integration tests. Each
//! adapter guards its state with a [`Mutex`] and performs check-and-write
//! sequences inside one critical section, so email uniqueness holds under
//! concurrent requests just as the database index enforces it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    RecordPersistenceError, RecordRepository, UserFilter, UserPersistenceError, UserRepository,
    Window,
};
use crate::domain::{Email, User, UserId, UserProfile};

fn poisoned<T>(_: PoisonError<T>) -> String {
    "in-memory store lock poisoned".to_owned()
}

/// Users held in insertion order, which doubles as creation order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|err| UserPersistenceError::query(poisoned(err)))
    }
}

fn clamp(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_page(
        &self,
        filter: &UserFilter,
        window: Window,
    ) -> Result<Vec<UserProfile>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users
            .iter()
            .map(User::profile)
            .filter(|profile| filter.matches(profile))
            .skip(clamp(window.skip))
            .take(clamp(window.limit))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserPersistenceError> {
        let users = self.lock()?;
        let total = users
            .iter()
            .filter(|user| filter.matches(user.profile()))
            .count();
        u64::try_from(total).map_err(|_| UserPersistenceError::query("user count overflow"))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users
            .iter()
            .map(User::profile)
            .find(|profile| profile.email() == email)
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        if users
            .iter()
            .any(|existing| existing.profile().email() == user.profile().email())
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        if users.iter().any(|existing| {
            existing.id() != user.id() && existing.profile().email() == user.profile().email()
        }) {
            return Err(UserPersistenceError::duplicate_email());
        }
        let slot = users
            .iter_mut()
            .find(|existing| existing.id() == user.id())
            .ok_or_else(|| UserPersistenceError::query("user not found for update"))?;
        *slot = user.clone();
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut users = self.lock()?;
        let before = users.len();
        users.retain(|user| user.id() != id);
        Ok(users.len() != before)
    }
}

/// Record ownership table: record id to owning user.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: Mutex<Vec<(Uuid, UserId)>>,
}

impl InMemoryRecordRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record owned by `owner`, returning its id.
    ///
    /// # Errors
    /// Returns [`RecordPersistenceError::Query`] if the store lock is
    /// poisoned.
    pub fn insert_for(&self, owner: UserId) -> Result<Uuid, RecordPersistenceError> {
        let id = Uuid::new_v4();
        self.records
            .lock()
            .map_err(|err| RecordPersistenceError::query(poisoned(err)))?
            .push((id, owner));
        Ok(id)
    }

    /// Number of records owned by `owner`.
    ///
    /// # Errors
    /// Returns [`RecordPersistenceError::Query`] if the store lock is
    /// poisoned.
    pub fn count_for(&self, owner: &UserId) -> Result<usize, RecordPersistenceError> {
        let records = self
            .records
            .lock()
            .map_err(|err| RecordPersistenceError::query(poisoned(err)))?;
        Ok(records.iter().filter(|(_, held_by)| held_by == owner).count())
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn delete_by_owner(&self, owner: &UserId) -> Result<u64, RecordPersistenceError> {
        let mut records = self
            .records
            .lock()
            .map_err(|err| RecordPersistenceError::query(poisoned(err)))?;
        let before = records.len();
        records.retain(|(_, held_by)| held_by != owner);
        u64::try_from(before - records.len())
            .map_err(|_| RecordPersistenceError::query("deleted row count overflow"))
    }
}
