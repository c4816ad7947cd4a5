//! Domain model for the user store.
//!
//! # Responsibility
//! - Define the in-memory shape of one `users` row.
//!
//! # Invariants
//! - `name` is the only handle used for lookup, update and delete.
//! - `name` is not unique; callers must expect several records per name.

pub mod user;
