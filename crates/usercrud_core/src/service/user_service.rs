//! Fail-soft user service.
//!
//! # Responsibility
//! - Expose boolean insert/update/delete entry points over any
//!   `UserRepository`.
//! - Report fetch outcomes as `UserLookup`, keeping "no row" apart from
//!   "store unavailable".
//!
//! # Invariants
//! - No method returns or panics on a storage fault; faults are logged and
//!   converted to `false` / `UserLookup::Unavailable`.
//! - A `false` write result does not say whether the name was absent or the
//!   store failed. Use the repository directly when that matters.

use crate::model::user::User;
use crate::repo::user_repo::{RepoError, UserRepository};
use log::{debug, error};

/// Outcome of a single-user lookup by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    /// Exactly one row matched.
    Found(User),
    /// No row matched.
    NotFound,
    /// Several rows share the name; none is picked.
    Ambiguous { matches: usize },
    /// The query failed or a row could not be mapped.
    Unavailable,
}

impl UserLookup {
    /// Returns the found user, if any.
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Found(user) => Some(user),
            _ => None,
        }
    }
}

/// Boolean facade over a user repository.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository for callers that need typed errors.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Inserts one record. `true` iff a row was written.
    pub fn insert(&self, user: &User) -> bool {
        match self.repo.insert_user(user) {
            Ok(()) => true,
            Err(err) => write_failed("insert", &user.name, &err),
        }
    }

    /// Overwrites every row named `user.name`. `true` iff at least one row
    /// changed.
    pub fn update(&self, user: &User) -> bool {
        match self.repo.update_user(user) {
            Ok(changed) => {
                debug!("event=user_update module=service status=ok rows={changed}");
                true
            }
            Err(err) => write_failed("update", &user.name, &err),
        }
    }

    /// Deletes every row named `name`. `true` iff at least one row was
    /// removed.
    pub fn delete(&self, name: &str) -> bool {
        match self.repo.delete_user(name) {
            Ok(removed) => {
                debug!("event=user_delete module=service status=ok rows={removed}");
                true
            }
            Err(err) => write_failed("delete", name, &err),
        }
    }

    /// Looks up the single user named `name`.
    pub fn fetch_by_name(&self, name: &str) -> UserLookup {
        match self.repo.get_user_by_name(name) {
            Ok(Some(user)) => UserLookup::Found(user),
            Ok(None) => UserLookup::NotFound,
            Err(RepoError::Ambiguous { matches, .. }) => {
                error!(
                    "event=user_fetch module=service status=error error_code=ambiguous_name matches={matches}"
                );
                UserLookup::Ambiguous { matches }
            }
            Err(err) => {
                error!(
                    "event=user_fetch module=service status=error error_code=fetch_failed error={err}"
                );
                UserLookup::Unavailable
            }
        }
    }
}

fn write_failed(operation: &str, name: &str, err: &RepoError) -> bool {
    match err {
        RepoError::NotFound(_) => debug!(
            "event=user_{operation} module=service status=no_match name_len={}",
            name.chars().count()
        ),
        other => error!(
            "event=user_{operation} module=service status=error error_code={operation}_failed error={other}"
        ),
    }
    false
}
