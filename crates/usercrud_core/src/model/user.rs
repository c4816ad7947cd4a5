//! User record.
//!
//! # Invariants
//! - `age` is non-negative; the type carries this, no runtime check exists.
//! - Field values are stored verbatim, without trimming or normalization.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One user row: `name`, `age`, `address`, `gender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// De-facto lookup key. Not declared unique in storage.
    pub name: String,
    pub age: u32,
    pub address: String,
    pub gender: String,
}

impl User {
    /// Creates a fully populated record.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        address: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            address: address.into(),
            gender: gender.into(),
        }
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User{{name='{}', age={}, address='{}', gender='{}'}}",
            self.name, self.age, self.address, self.gender
        )
    }
}
