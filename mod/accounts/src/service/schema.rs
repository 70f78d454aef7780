use roster_sql::SQLStore;

use crate::service::AccountsError;

/// Initialize the SQLite schema for the accounts resources.
///
/// Uniqueness is enforced among live rows only (partial indexes on
/// `is_deleted = 0`), so a soft-deleted profile frees its email and its
/// user link while the row itself stays in storage.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AccountsError> {
    let statements = [
        // Users table: identity + credential hash
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            role TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",

        // Profiles table: one live profile per user
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_email_live
            ON profiles(email) WHERE is_deleted = 0 AND email IS NOT NULL",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_profiles_user_live
            ON profiles(user_id) WHERE is_deleted = 0",
        "CREATE INDEX IF NOT EXISTS idx_profiles_name ON profiles(last_name, first_name)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| AccountsError::Storage(e.to_string()))?;
    }

    Ok(())
}
