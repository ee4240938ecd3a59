use std::path::{Path, PathBuf};

use crate::migrations::run_pending;
use crate::state::{
    ensure_store_directory, map_sqlite_error, open_connection, resolve_store_home, store_db_path,
};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone)]
pub struct SetupContext {
    pub store_home: PathBuf,
    pub db_path: PathBuf,
}

pub fn ensure_initialized() -> CoreResult<SetupContext> {
    ensure_initialized_with_home_override(None)
}

pub fn ensure_initialized_at(home_override: &Path) -> CoreResult<SetupContext> {
    ensure_initialized_with_home_override(Some(home_override))
}

fn ensure_initialized_with_home_override(home_override: Option<&Path>) -> CoreResult<SetupContext> {
    let store_home = resolve_store_home(home_override)?;
    ensure_store_directory(&store_home)?;

    let db_path = store_db_path(&store_home);
    let mut connection = open_connection(&db_path)?;
    run_pending(&mut connection).map_err(|error| map_migration_error(&db_path, &error))?;

    Ok(SetupContext {
        store_home,
        db_path,
    })
}

fn map_migration_error(db_path: &Path, error: &rusqlite_migration::Error) -> CoreError {
    if let rusqlite_migration::Error::RusqliteError { query: _, err } = error {
        return map_sqlite_error(db_path, err);
    }
    CoreError::migration_failed(db_path, &error.to_string())
}
