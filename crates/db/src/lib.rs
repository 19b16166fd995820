//! MongoDB connection handle, store errors, and the `db` core module.

pub mod database;
pub mod error;
pub mod module;

pub use database::Database;
pub use error::{StoreError, StoreResult};
pub use module::DbModule;
