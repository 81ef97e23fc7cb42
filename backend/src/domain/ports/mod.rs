//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod record_repository;
mod user_administration;
mod user_repository;

#[cfg(test)]
pub use record_repository::MockRecordRepository;
pub use record_repository::{RecordPersistenceError, RecordRepository};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::{AdminBootstrap, UserAdministration};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserFilter, UserPersistenceError, UserRepository, Window};
