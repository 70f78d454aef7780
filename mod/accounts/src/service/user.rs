//! User lookup, role changes, soft deletion, and PIN login.

use roster_core::{ListParams, ListResult, now_rfc3339};
use roster_sql::Value;

use crate::model::{Profile, Role, TokenPair, User, UserPublic};
use crate::service::credentials::verify_pin;
use crate::service::{AccountsError, AccountsService};

impl AccountsService {
    /// Get a live user by id. The returned `UserPublic` never carries the
    /// PIN hash.
    pub fn get_user(&self, user_id: &str) -> Result<UserPublic, AccountsError> {
        let user: User = self.get_record("users", user_id)?;
        Ok(UserPublic::from(&user))
    }

    /// List live users, newest first.
    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<UserPublic>, AccountsError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE is_deleted = 0 \
                 ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                &[
                    Value::Integer(params.limit as i64),
                    Value::Integer(params.offset as i64),
                ],
            )
            .map_err(|e| AccountsError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AccountsError::Internal("missing data column".into()))?;
            let user: User = serde_json::from_str(data)
                .map_err(|e| AccountsError::Internal(e.to_string()))?;
            items.push(UserPublic::from(&user));
        }

        let total = self.count_live("users")?;
        Ok(ListResult { items, total })
    }

    /// Change a user's role. Takes effect on the next authorization check;
    /// outstanding tokens are not revoked but the guard re-reads the role
    /// from the user row.
    pub fn update_user_role(
        &self,
        user_id: &str,
        role: Role,
    ) -> Result<UserPublic, AccountsError> {
        let mut user: User = self.get_record("users", user_id)?;
        user.role = role;
        user.updated_at = now_rfc3339();

        self.update_record(
            "users",
            user_id,
            &user,
            &[
                ("role", Value::Text(role.as_str().to_string())),
                ("updated_at", Value::Text(user.updated_at.clone())),
            ],
        )?;

        tracing::info!(user_id = %user_id, role = %role, "updated user role");
        Ok(UserPublic::from(&user))
    }

    /// Soft-delete a user and its profile in one transaction. The rows stay
    /// in storage but drop out of every live lookup, and the user can no
    /// longer log in or pass the guard.
    pub fn delete_user(&self, user_id: &str) -> Result<(), AccountsError> {
        let mut user: User = self.get_record("users", user_id)?;
        let now = now_rfc3339();
        user.is_deleted = true;
        user.updated_at = now.clone();

        let user_stmt = self.update_statement(
            "users",
            user_id,
            &user,
            &[
                ("is_deleted", Value::Integer(1)),
                ("updated_at", Value::Text(now.clone())),
            ],
        )?;

        let mut statements = vec![user_stmt];
        if let Ok(mut profile) = self.get_profile_by_user_id(user_id) {
            profile.is_deleted = true;
            profile.updated_at = now.clone();
            statements.push(self.update_statement(
                "profiles",
                &profile.profile_id.clone(),
                &profile,
                &[
                    ("is_deleted", Value::Integer(1)),
                    ("updated_at", Value::Text(now)),
                ],
            )?);
        }

        self.sql
            .exec_batch(&statements)
            .map_err(|e| AccountsError::Storage(e.to_string()))?;

        tracing::info!(user_id = %user_id, "soft-deleted user");
        Ok(())
    }

    /// Verify a user id + PIN and issue a token pair. Every failure mode
    /// collapses into `IncorrectCredentials` so a caller cannot probe which
    /// ids exist. The PIN itself is never logged.
    pub fn login(
        &self,
        user_id: &str,
        pin: &str,
    ) -> Result<(TokenPair, UserPublic), AccountsError> {
        let user: User = self
            .get_record("users", user_id)
            .map_err(|e| match e {
                AccountsError::NotFound(_) => AccountsError::IncorrectCredentials,
                other => other,
            })?;

        if !verify_pin(pin, &user.pin_hash) {
            return Err(AccountsError::IncorrectCredentials);
        }

        let tokens = self.issue_tokens(&user)?;
        tracing::info!(user_id = %user_id, "login succeeded");
        Ok((tokens, UserPublic::from(&user)))
    }

    /// The caller's own user + profile, for the `me` endpoint.
    pub fn get_principal_view(
        &self,
        user_id: &str,
    ) -> Result<(UserPublic, Profile), AccountsError> {
        let user = self.get_user(user_id)?;
        let profile = self.get_profile_by_user_id(user_id)?;
        Ok((user, profile))
    }

    fn count_live(&self, table: &str) -> Result<usize, AccountsError> {
        let sql = format!("SELECT COUNT(*) AS n FROM {} WHERE is_deleted = 0", table);
        let rows = self
            .sql
            .query(&sql, &[])
            .map_err(|e| AccountsError::Storage(e.to_string()))?;
        let n = rows
            .first()
            .and_then(|r| r.get_i64("n"))
            .unwrap_or(0);
        Ok(n as usize)
    }
}
