pub mod credentials;
pub mod guard;
pub mod idgen;
pub mod profile;
pub mod register;
pub mod schema;
pub mod token;
pub mod user;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use roster_kv::KVStore;
use roster_sql::{SQLStore, Statement, Value};

/// Accounts service error type.
#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    /// Login failure. One message for every cause — the caller must not
    /// learn whether the id or the PIN was wrong.
    #[error("invalid credentials")]
    IncorrectCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("exhausted: {0}")]
    Exhausted(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AccountsError> for roster_core::ServiceError {
    fn from(e: AccountsError) -> Self {
        match e {
            AccountsError::NotFound(m) => roster_core::ServiceError::NotFound(m),
            AccountsError::Conflict(m) => roster_core::ServiceError::Conflict(m),
            AccountsError::Validation(m) => roster_core::ServiceError::Validation(m),
            AccountsError::IncorrectCredentials => {
                roster_core::ServiceError::Unauthorized("invalid credentials".into())
            }
            AccountsError::InvalidToken(m) | AccountsError::Unauthenticated(m) => {
                roster_core::ServiceError::Unauthorized(m)
            }
            AccountsError::Forbidden(m) => roster_core::ServiceError::PermissionDenied(m),
            AccountsError::Exhausted(m) => roster_core::ServiceError::Exhausted(m),
            AccountsError::Storage(m) => roster_core::ServiceError::Storage(m),
            AccountsError::Internal(m) => roster_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the accounts service.
#[derive(Debug, Clone)]
pub struct AccountsConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 60 min).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    pub refresh_token_ttl: i64,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "roster-dev-secret-change-me".to_string(),
            access_token_ttl: 3600,      // 60 min
            refresh_token_ttl: 604800,   // 7 days
        }
    }
}

/// The Accounts service. Holds storage backends and configuration.
pub struct AccountsService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) config: AccountsConfig,
}

impl AccountsService {
    /// Create a new AccountsService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        config: AccountsConfig,
    ) -> Result<Arc<Self>, AccountsError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, kv, config }))
    }

    // ── Generic record helpers ──
    //
    // Rows live as a JSON `data` column plus indexed columns for the
    // fields queries filter on. All lookups exclude soft-deleted rows.

    /// Build an INSERT statement for a record without executing it, so
    /// multiple inserts can run in one transaction via `exec_batch`.
    pub(crate) fn insert_statement<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<Statement, AccountsError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AccountsError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        Ok(Statement::new(sql, params))
    }

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AccountsError> {
        let statement = self.insert_statement(table, id, record, indexes)?;
        self.sql
            .exec(&statement.sql, &statement.params)
            .map_err(map_constraint_error)?;
        Ok(())
    }

    /// Get a live (non-deleted) record by id, deserializing the JSON
    /// `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AccountsError> {
        let sql = format!(
            "SELECT data FROM {} WHERE id = ?1 AND is_deleted = 0",
            table
        );
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| AccountsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| AccountsError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AccountsError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AccountsError::Internal(e.to_string()))
    }

    /// Build an UPDATE statement for a live record's JSON data and indexed
    /// columns. The WHERE clause only matches non-deleted rows, so updating
    /// (or soft-deleting) an already-deleted record reports 0 rows.
    pub(crate) fn update_statement<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<Statement, AccountsError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AccountsError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{} AND is_deleted = 0",
            table,
            sets.join(", "),
            id_idx,
        );

        Ok(Statement::new(sql, params))
    }

    /// Update a live record; NotFound when it does not exist or was
    /// soft-deleted.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AccountsError> {
        let statement = self.update_statement(table, id, record, indexes)?;
        let affected = self
            .sql
            .exec(&statement.sql, &statement.params)
            .map_err(map_constraint_error)?;

        if affected == 0 {
            return Err(AccountsError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }
}

/// Map a storage error, surfacing UNIQUE violations as Conflict.
pub(crate) fn map_constraint_error(e: roster_sql::SQLError) -> AccountsError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint") {
        AccountsError::Conflict(msg)
    } else {
        AccountsError::Storage(msg)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use roster_kv::RedbStore;
    use roster_sql::SqliteStore;

    use super::{AccountsConfig, AccountsService};
    use crate::model::{CreateProfile, CreateUser, Gender, Role};

    /// Service over in-memory SQLite + tempfile-backed redb.
    pub(crate) fn test_service() -> Arc<AccountsService> {
        test_service_with_config(AccountsConfig::default())
    }

    pub(crate) fn test_service_with_config(config: AccountsConfig) -> Arc<AccountsService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let kv = Arc::new(RedbStore::open(tmp.path()).unwrap());
        AccountsService::new(sql, kv, config).unwrap()
    }

    pub(crate) fn new_user(role: Role, pin: Option<&str>) -> CreateUser {
        CreateUser {
            role,
            pin: pin.map(|p| p.to_string()),
        }
    }

    pub(crate) fn new_profile(email: &str) -> CreateProfile {
        CreateProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: "0712345678".into(),
            email: Some(email.into()),
            gender: Gender::Female,
            date_of_birth: None,
            photo_url: None,
            marital_status: None,
            emergency_contact: None,
        }
    }
}
