//! Core record access for the user store.
//! Owns the `users` schema, the row-to-record mapping and the CRUD contract.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::User;
pub use repo::user_repo::{
    RepoError, RepoResult, SqliteUserRepository, UserListQuery, UserRepository,
};
pub use service::user_service::{UserLookup, UserService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
