use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Error as SqliteError, ffi::ErrorCode};

use crate::{CoreError, CoreResult};

const DB_FILE_NAME: &str = "cadence.db";
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Resolve the on-disk home for the pattern store.
///
/// Precedence: explicit override, then `CADENCE_HOME`, then `~/.cadence`.
/// Relative paths are anchored to the current working directory so the
/// store location stays stable across chdir.
pub fn resolve_store_home(home_override: Option<&Path>) -> CoreResult<PathBuf> {
    if let Some(path) = home_override {
        return absolutize(path);
    }

    if let Some(env_path) = std::env::var_os("CADENCE_HOME") {
        return absolutize(Path::new(&env_path));
    }

    match home::home_dir() {
        Some(home_path) => absolutize(&home_path.join(".cadence")),
        None => Err(CoreError::store_init_failed(
            Path::new("."),
            "Could not resolve a home directory for store initialization.",
        )),
    }
}

pub fn store_db_path(home: &Path) -> PathBuf {
    home.join(DB_FILE_NAME)
}

pub fn ensure_store_directory(path: &Path) -> CoreResult<()> {
    fs::create_dir_all(path).map_err(|error| map_io_error(path, &error))?;
    set_private_permissions_best_effort(path);
    Ok(())
}

pub fn open_connection(db_path: &Path) -> CoreResult<Connection> {
    let connection =
        Connection::open(db_path).map_err(|error| map_sqlite_error(db_path, &error))?;
    connection
        .busy_timeout(BUSY_TIMEOUT)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(connection)
}

pub fn map_io_error(path: &Path, error: &std::io::Error) -> CoreError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        return CoreError::store_permission_denied(path, &error.to_string());
    }

    CoreError::store_init_failed(path, &error.to_string())
}

pub fn map_sqlite_error(path: &Path, error: &SqliteError) -> CoreError {
    match error.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => CoreError::store_locked(path),
        Some(ErrorCode::NotADatabase) => CoreError::store_corrupt(path),
        Some(ErrorCode::CannotOpen | ErrorCode::ReadOnly) => {
            CoreError::store_permission_denied(path, &error.to_string())
        }
        _ => CoreError::store_init_failed(path, &error.to_string()),
    }
}

fn absolutize(path: &Path) -> CoreResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|error| CoreError::store_init_failed(path, &error.to_string()))
}

#[cfg(unix)]
fn set_private_permissions_best_effort(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn set_private_permissions_best_effort(_path: &Path) {}
