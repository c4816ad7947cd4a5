//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/fetch APIs over the `users` table.
//! - Map result rows into `User` records.
//!
//! # Invariants
//! - Name-keyed writes apply to every row with a matching name.
//! - A fetch that matches more than one row is an error, never a guess.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::user::User;
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const USERS_TABLE: &str = "users";
const USERS_COLUMNS: [&str; 4] = ["name", "age", "address", "gender"];

const USER_SELECT_SQL: &str = "SELECT
    name,
    age,
    address,
    gender
FROM users";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage fault: connectivity, constraint or malformed statement.
    Db(DbError),
    /// A name-keyed write matched no rows.
    NotFound(String),
    /// A single-record fetch matched more than one row.
    Ambiguous { name: String, matches: usize },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(name) => write!(f, "user not found: `{name}`"),
            Self::Ambiguous { name, matches } => {
                write!(f, "expected one user named `{name}`, found {matches}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Exact-match name filter.
    pub name: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for user record operations.
pub trait UserRepository {
    /// Writes one new row holding all four fields.
    fn insert_user(&self, user: &User) -> RepoResult<()>;
    /// Overwrites every row whose name equals `user.name`.
    ///
    /// Returns the number of rows changed, or `NotFound` when it is zero.
    fn update_user(&self, user: &User) -> RepoResult<usize>;
    /// Removes every row with `name`.
    ///
    /// Returns the number of rows removed, or `NotFound` when it is zero.
    fn delete_user(&self, name: &str) -> RepoResult<usize>;
    /// Fetches the single row named `name`.
    ///
    /// `Ok(None)` means no row matched; `Ambiguous` means several did.
    fn get_user_by_name(&self, name: &str) -> RepoResult<Option<User>>;
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `users`
    ///   table does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, user: &User) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (name, age, address, gender) VALUES (?1, ?2, ?3, ?4);",
            params![
                user.name.as_str(),
                user.age,
                user.address.as_str(),
                user.gender.as_str(),
            ],
        )?;

        Ok(())
    }

    fn update_user(&self, user: &User) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?1,
                gender = ?2,
                address = ?3,
                age = ?4
             WHERE name = ?1;",
            params![
                user.name.as_str(),
                user.gender.as_str(),
                user.address.as_str(),
                user.age,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(user.name.clone()));
        }

        Ok(changed)
    }

    fn delete_user(&self, name: &str) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE name = ?1;", [name])?;

        if changed == 0 {
            return Err(RepoError::NotFound(name.to_string()));
        }

        Ok(changed)
    }

    fn get_user_by_name(&self, name: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE name = ?1;"))?;

        let mut rows = stmt.query([name])?;
        let mut first = None;
        let mut matches = 0;
        while let Some(row) = rows.next()? {
            matches += 1;
            if first.is_none() {
                first = Some(parse_user_row(row));
            }
        }
        if matches > 1 {
            return Err(RepoError::Ambiguous {
                name: name.to_string(),
                matches,
            });
        }

        first.transpose()
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = query.name.as_ref() {
            sql.push_str(" AND name = ?");
            bind_values.push(Value::Text(name.clone()));
        }

        sql.push_str(" ORDER BY name ASC, rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

/// Maps one `users` row onto a `User`, column by column.
///
/// NULLs, wrongly typed values and out-of-range ages are `InvalidData`.
pub fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let age_value = column_value::<i64>(row, "age")?
        .ok_or_else(|| RepoError::InvalidData("NULL value in users.age".to_string()))?;
    let age = u32::try_from(age_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid age value `{age_value}` in users.age"))
    })?;

    Ok(User {
        name: required_text(row, "name")?,
        age,
        address: required_text(row, "address")?,
        gender: required_text(row, "gender")?,
    })
}

fn required_text(row: &Row<'_>, column: &str) -> RepoResult<String> {
    column_value::<String>(row, column)?
        .ok_or_else(|| RepoError::InvalidData(format!("NULL value in users.{column}")))
}

fn column_value<T: FromSql>(row: &Row<'_>, column: &str) -> RepoResult<Option<T>> {
    row.get::<_, Option<T>>(column).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(_, _, found) => {
            RepoError::InvalidData(format!("unexpected {found} value in users.{column}"))
        }
        rusqlite::Error::FromSqlConversionFailure(_, found, source) => RepoError::InvalidData(
            format!("cannot convert {found} value in users.{column}: {source}"),
        ),
        rusqlite::Error::IntegralValueOutOfRange(_, value) => {
            RepoError::InvalidData(format!("out-of-range value `{value}` in users.{column}"))
        }
        other => other.into(),
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [USERS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(USERS_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([USERS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    for column in USERS_COLUMNS {
        if !columns.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: USERS_TABLE,
                column,
            });
        }
    }

    Ok(())
}
