//! Transactional user + profile creation.

use roster_core::{new_id, now_rfc3339};
use roster_sql::Value;

use crate::model::{CreateProfile, CreateUser, Gender, Profile, Role, User};
use crate::service::credentials::{generate_pin, hash_pin, validate_pin};
use crate::service::{AccountsError, AccountsService, map_constraint_error};

impl AccountsService {
    /// Create a user and its profile as one atomic unit.
    ///
    /// Validation runs first; then the sequential id is allocated, the PIN
    /// resolved (caller-supplied or generated) and hashed, and both rows are
    /// inserted in a single SQLite transaction — a duplicate email aborts
    /// the whole creation and leaves no user row behind. The allocator is
    /// not part of that transaction, so an aborted creation burns an id.
    ///
    /// The plaintext PIN is returned only when the system generated it.
    pub fn create_user_profile(
        &self,
        new_user: CreateUser,
        new_profile: CreateProfile,
    ) -> Result<(User, Profile, Option<String>), AccountsError> {
        new_profile
            .validate()
            .map_err(AccountsError::Validation)?;

        // An empty string counts as "no PIN supplied".
        let supplied = new_user.pin.as_deref().filter(|p| !p.is_empty());
        let (pin, generated) = match supplied {
            Some(pin) => {
                validate_pin(pin).map_err(AccountsError::Validation)?;
                (pin.to_string(), false)
            }
            None => (generate_pin(), true),
        };

        let user_id = self.next_user_id()?;
        let pin_hash = hash_pin(&pin)?;
        let now = now_rfc3339();

        let user = User {
            user_id: user_id.clone(),
            role: new_user.role,
            pin_hash,
            created_at: now.clone(),
            updated_at: now.clone(),
            is_deleted: false,
        };

        let profile = Profile {
            profile_id: new_id(),
            user_id: user_id.clone(),
            first_name: new_profile.first_name,
            last_name: new_profile.last_name,
            phone: new_profile.phone,
            email: new_profile.email.map(|e| e.to_lowercase()),
            gender: new_profile.gender,
            date_of_birth: new_profile.date_of_birth,
            photo_url: new_profile.photo_url,
            marital_status: new_profile.marital_status,
            emergency_contact: new_profile.emergency_contact,
            created_at: now.clone(),
            updated_at: now.clone(),
            is_deleted: false,
        };

        let user_stmt = self.insert_statement(
            "users",
            &user.user_id,
            &user,
            &[
                ("role", Value::Text(user.role.as_str().to_string())),
                ("is_deleted", Value::Integer(0)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now.clone())),
            ],
        )?;

        let mut profile_indexes: Vec<(&str, Value)> = vec![
            ("user_id", Value::Text(profile.user_id.clone())),
            ("first_name", Value::Text(profile.first_name.clone())),
            ("last_name", Value::Text(profile.last_name.clone())),
            ("is_deleted", Value::Integer(0)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ];
        if let Some(email) = &profile.email {
            profile_indexes.push(("email", Value::Text(email.clone())));
        }
        let profile_stmt =
            self.insert_statement("profiles", &profile.profile_id, &profile, &profile_indexes)?;

        self.sql
            .exec_batch(&[user_stmt, profile_stmt])
            .map_err(|e| match map_constraint_error(e) {
                AccountsError::Conflict(msg) if msg.contains("email") => {
                    AccountsError::Conflict("email already registered".into())
                }
                other => other,
            })?;

        tracing::info!(
            user_id = %user.user_id,
            profile_id = %profile.profile_id,
            role = %user.role,
            "created user and profile"
        );

        Ok((user, profile, generated.then_some(pin)))
    }

    /// First-start bootstrap: ensure at least one live super_admin exists,
    /// creating one from a pre-hashed PIN if none does. Returns the new
    /// user id, or None when an admin was already present.
    pub fn ensure_super_admin(
        &self,
        email: &str,
        pin_hash: &str,
    ) -> Result<Option<String>, AccountsError> {
        let rows = self
            .sql
            .query(
                "SELECT id FROM users WHERE role = ?1 AND is_deleted = 0 LIMIT 1",
                &[Value::Text(Role::SuperAdmin.as_str().to_string())],
            )
            .map_err(|e| AccountsError::Storage(e.to_string()))?;
        if !rows.is_empty() {
            return Ok(None);
        }

        let user_id = self.next_user_id()?;
        let now = now_rfc3339();

        let user = User {
            user_id: user_id.clone(),
            role: Role::SuperAdmin,
            pin_hash: pin_hash.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
            is_deleted: false,
        };
        let profile = Profile {
            profile_id: new_id(),
            user_id: user_id.clone(),
            first_name: "Super".to_string(),
            last_name: "Admin".to_string(),
            phone: "0000000".to_string(),
            email: Some(email.to_lowercase()),
            gender: Gender::Other,
            date_of_birth: None,
            photo_url: None,
            marital_status: None,
            emergency_contact: None,
            created_at: now.clone(),
            updated_at: now.clone(),
            is_deleted: false,
        };

        let user_stmt = self.insert_statement(
            "users",
            &user.user_id,
            &user,
            &[
                ("role", Value::Text(user.role.as_str().to_string())),
                ("is_deleted", Value::Integer(0)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now.clone())),
            ],
        )?;
        let profile_stmt = self.insert_statement(
            "profiles",
            &profile.profile_id,
            &profile,
            &[
                ("user_id", Value::Text(profile.user_id.clone())),
                ("first_name", Value::Text(profile.first_name.clone())),
                ("last_name", Value::Text(profile.last_name.clone())),
                ("email", Value::Text(email.to_lowercase())),
                ("is_deleted", Value::Integer(0)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;

        self.sql
            .exec_batch(&[user_stmt, profile_stmt])
            .map_err(map_constraint_error)?;

        tracing::info!(user_id = %user_id, "bootstrapped super_admin");
        Ok(Some(user_id))
    }
}
