//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel.
//! - **memory**: mutex-guarded in-process repositories for database-less
//!   runs and tests.
//!
//! Adapters convert between domain types and storage representations. They
//! contain no business logic.

pub mod memory;
pub mod persistence;
