//! # storage-adapters
//!
//! Implementations of the `domains` storage ports.
//!
//! - [`memory`]: DashMap tables, always compiled. Used by tests and demos.
//! - `postgres` (feature `db-postgres`): sqlx over the schema and stored
//!   functions in `migrations/`.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
