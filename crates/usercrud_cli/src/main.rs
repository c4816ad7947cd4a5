//! Bootstrap driver for the user store.
//!
//! # Responsibility
//! - Wire logging, the SQLite connection and the user service together.
//! - Run one insert/update/fetch/delete pass and print each outcome.

use clap::Parser;
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use usercrud_core::db::{open_db, open_db_in_memory};
use usercrud_core::{
    core_version, default_log_level, init_logging, SqliteUserRepository, User, UserLookup,
    UserRepository, UserService,
};

const DEFAULT_DB_FILE_NAME: &str = "usercrud.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "usercrud-logs";
const DEMO_USER_NAME: &str = "Milan Parajuli";

#[derive(Debug, Parser)]
#[command(
    name = "usercrud",
    version,
    about = "Runs insert/update/delete/fetch against the users table"
)]
struct Cli {
    /// SQLite database file. Defaults to a file in the OS temp directory.
    #[arg(long = "db", env = "USERCRUD_DB_PATH")]
    db_path: Option<PathBuf>,
    /// Use a throwaway in-memory database. Takes precedence over `--db`.
    #[arg(long)]
    in_memory: bool,
    /// trace|debug|info|warn|error
    #[arg(long, env = "USERCRUD_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files.
    #[arg(long, env = "USERCRUD_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));
    if let Err(err) = init_logging(&log_level, &log_dir.to_string_lossy()) {
        eprintln!("logging setup failed: {err}");
        return ExitCode::FAILURE;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let conn = if cli.in_memory {
        open_db_in_memory()
    } else {
        let path = cli
            .db_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        open_db(path)
    };
    let conn = match conn {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("database open failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let repo = match SqliteUserRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("repository init failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run_demo(&UserService::new(repo), &mut io::stderr().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_output module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo<R: UserRepository>(service: &UserService<R>, out: &mut impl Write) -> io::Result<()> {
    let inserted = service.insert(&User::new(DEMO_USER_NAME, 41, "Palpa", "Male"));
    report(out, inserted, "User inserted successfully!", "User insertion failed.")?;

    let updated = service.update(&User::new(DEMO_USER_NAME, 41, "Palpa", "Female"));
    report(out, updated, "User updated successfully.", "User update failed.")?;

    match service.fetch_by_name(DEMO_USER_NAME) {
        UserLookup::Found(mut user) => {
            user.address = "Dang".to_string();
            let updated = service.update(&user);
            report(
                out,
                updated,
                "Fetched user updated successfully.",
                "Fetched user update failed.",
            )?;
        }
        other => {
            info!("event=demo_fetch module=cli status={}", lookup_label(&other));
            writeln!(out, "User not found for fetching.")?;
        }
    }

    let deleted = service.delete(DEMO_USER_NAME);
    report(out, deleted, "User deleted successfully.", "User deletion failed.")?;

    match service.fetch_by_name(DEMO_USER_NAME) {
        UserLookup::Found(user) => {
            writeln!(out, "User Details:")?;
            writeln!(out, "Name: {}", user.name)?;
            writeln!(out, "Age: {}", user.age)?;
            writeln!(out, "Address: {}", user.address)?;
            writeln!(out, "Gender: {}", user.gender)?;
        }
        other => {
            info!("event=demo_select module=cli status={}", lookup_label(&other));
            writeln!(out, "User not found during selection.")?;
        }
    }

    Ok(())
}

fn report(out: &mut impl Write, ok: bool, success: &str, failure: &str) -> io::Result<()> {
    writeln!(out, "{}", if ok { success } else { failure })
}

fn lookup_label(lookup: &UserLookup) -> &'static str {
    match lookup {
        UserLookup::Found(_) => "found",
        UserLookup::NotFound => "not_found",
        UserLookup::Ambiguous { .. } => "ambiguous",
        UserLookup::Unavailable => "unavailable",
    }
}
