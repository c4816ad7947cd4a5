//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for user records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs distinguish "no row matched" (`NotFound`) from storage
//!   faults (`Db`); collapsing the two is left to callers.

pub mod user_repo;
