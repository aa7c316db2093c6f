//! Database Module
//!
//! Connection management, the profile store port and its PostgreSQL and
//! in-memory implementations.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export commonly used types
pub use connection::{DatabaseConfig, Pagination};
pub use memory::MemoryProfileStore;
pub use postgres::PgProfileStore;
pub use store::{ProfileStore, StoreError, StoreResult};
