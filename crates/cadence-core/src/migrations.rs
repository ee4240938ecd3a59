use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

pub const REQUIRED_TABLE_NAMES: [&str; 3] = [
    "internal_meta",
    "internal_transactions",
    "internal_recurring_patterns",
];

pub const REQUIRED_INDEX_NAMES: [&str; 3] = [
    "idx_internal_transactions_space_account_posted_at",
    "idx_internal_recurring_patterns_space_status",
    "idx_internal_recurring_patterns_reconcile_key",
];

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL)]);
    migrations.to_latest(conn)
}
