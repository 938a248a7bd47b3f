// Contest Infrastructure - SQLite Adapter
// Implements: ContestStore / ContestTransaction, ConfigStore

mod config_store;
mod connection;
mod error;
mod migration;
mod rows;
mod store;
mod transaction;

pub use config_store::SqliteConfigStore;
pub use connection::create_pool;
pub use migration::run_migrations;
pub use store::{NewUser, SqliteContestStore};
pub use transaction::SqliteContestTransaction;
