//! Profile reads, updates, soft deletion, and role-scoped listing.

use roster_core::now_rfc3339;
use roster_sql::Value;

use crate::model::{Profile, Role, UpdateProfile, UserPublic};
use crate::service::{AccountsError, AccountsService, map_constraint_error};

impl AccountsService {
    /// Get a live profile by its own id.
    pub fn get_profile(&self, profile_id: &str) -> Result<Profile, AccountsError> {
        self.get_record("profiles", profile_id)
    }

    /// Get the live profile belonging to a user.
    pub fn get_profile_by_user_id(&self, user_id: &str) -> Result<Profile, AccountsError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM profiles WHERE user_id = ?1 AND is_deleted = 0",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| AccountsError::Storage(e.to_string()))?;
        let row = rows.first().ok_or_else(|| {
            AccountsError::NotFound(format!("profiles/user/{}", user_id))
        })?;
        let data = row
            .get_str("data")
            .ok_or_else(|| AccountsError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| AccountsError::Internal(e.to_string()))
    }

    /// Apply a partial update to a live profile. Only present fields change;
    /// a supplied email is lowercased and must stay unique among live
    /// profiles.
    pub fn update_profile(
        &self,
        profile_id: &str,
        changes: UpdateProfile,
    ) -> Result<Profile, AccountsError> {
        changes.validate().map_err(AccountsError::Validation)?;

        let mut profile: Profile = self.get_record("profiles", profile_id)?;

        if let Some(first_name) = changes.first_name {
            profile.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            profile.last_name = last_name;
        }
        if let Some(phone) = changes.phone {
            profile.phone = phone;
        }
        if let Some(email) = changes.email {
            profile.email = Some(email.to_lowercase());
        }
        if let Some(gender) = changes.gender {
            profile.gender = gender;
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            profile.date_of_birth = Some(date_of_birth);
        }
        if let Some(photo_url) = changes.photo_url {
            profile.photo_url = Some(photo_url);
        }
        if let Some(marital_status) = changes.marital_status {
            profile.marital_status = Some(marital_status);
        }
        if let Some(emergency_contact) = changes.emergency_contact {
            profile.emergency_contact = Some(emergency_contact);
        }
        profile.updated_at = now_rfc3339();

        let mut indexes: Vec<(&str, Value)> = vec![
            ("first_name", Value::Text(profile.first_name.clone())),
            ("last_name", Value::Text(profile.last_name.clone())),
            ("updated_at", Value::Text(profile.updated_at.clone())),
        ];
        if let Some(email) = &profile.email {
            indexes.push(("email", Value::Text(email.clone())));
        }

        let statement = self.update_statement("profiles", profile_id, &profile, &indexes)?;
        let affected = self
            .sql
            .exec(&statement.sql, &statement.params)
            .map_err(|e| match map_constraint_error(e) {
                AccountsError::Conflict(msg) if msg.contains("email") => {
                    AccountsError::Conflict("email already registered".into())
                }
                other => other,
            })?;
        if affected == 0 {
            return Err(AccountsError::NotFound(format!("profiles/{}", profile_id)));
        }

        tracing::info!(profile_id = %profile_id, "updated profile");
        Ok(profile)
    }

    /// Soft-delete a profile. Its email becomes free for reuse; the owning
    /// user stays live.
    pub fn delete_profile(&self, profile_id: &str) -> Result<(), AccountsError> {
        let mut profile: Profile = self.get_record("profiles", profile_id)?;
        profile.is_deleted = true;
        profile.updated_at = now_rfc3339();

        self.update_record(
            "profiles",
            profile_id,
            &profile,
            &[
                ("is_deleted", Value::Integer(1)),
                ("updated_at", Value::Text(profile.updated_at.clone())),
            ],
        )?;

        tracing::info!(profile_id = %profile_id, "soft-deleted profile");
        Ok(())
    }

    /// List live users of one role joined with their live profiles. The
    /// optional query filters on first name, last name, or email
    /// (case-insensitive substring).
    pub fn list_profiles_by_role(
        &self,
        role: Role,
        q: Option<&str>,
    ) -> Result<Vec<(UserPublic, Profile)>, AccountsError> {
        let mut sql = String::from(
            "SELECT u.data AS user_data, p.data AS profile_data \
             FROM profiles p JOIN users u ON p.user_id = u.id \
             WHERE p.is_deleted = 0 AND u.is_deleted = 0 AND u.role = ?1",
        );
        let mut params = vec![Value::Text(role.as_str().to_string())];

        if let Some(q) = q.filter(|q| !q.is_empty()) {
            sql.push_str(
                " AND (p.first_name LIKE ?2 ESCAPE '\\' \
                 OR p.last_name LIKE ?2 ESCAPE '\\' \
                 OR p.email LIKE ?2 ESCAPE '\\')",
            );
            params.push(Value::Text(format!("%{}%", escape_like(q))));
        }
        sql.push_str(" ORDER BY u.id ASC");

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| AccountsError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_data = row
                .get_str("user_data")
                .ok_or_else(|| AccountsError::Internal("missing user_data column".into()))?;
            let profile_data = row
                .get_str("profile_data")
                .ok_or_else(|| AccountsError::Internal("missing profile_data column".into()))?;
            let user: crate::model::User = serde_json::from_str(user_data)
                .map_err(|e| AccountsError::Internal(e.to_string()))?;
            let profile: Profile = serde_json::from_str(profile_data)
                .map_err(|e| AccountsError::Internal(e.to_string()))?;
            items.push((UserPublic::from(&user), profile));
        }

        Ok(items)
    }
}

/// Escape LIKE metacharacters so a search term matches literally.
fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;
    use crate::service::test_support::{new_profile, new_user, test_service};

    #[test]
    fn test_update_profile_partial() {
        let svc = test_service();
        let (_, profile, _) = svc
            .create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();

        let updated = svc
            .update_profile(
                &profile.profile_id,
                UpdateProfile {
                    first_name: Some("Grace".into()),
                    email: Some("Grace@Example.com".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        // Unnamed fields keep their values.
        assert_eq!(updated.first_name, "Grace");
        assert_eq!(updated.last_name, "Lovelace");
        assert_eq!(updated.email.as_deref(), Some("grace@example.com"));
        assert_eq!(updated.gender, Gender::Female);
    }

    #[test]
    fn test_update_profile_rejects_bad_phone() {
        let svc = test_service();
        let (_, profile, _) = svc
            .create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();

        let err = svc
            .update_profile(
                &profile.profile_id,
                UpdateProfile {
                    phone: Some("12345".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AccountsError::Validation(_)));
    }

    #[test]
    fn test_update_profile_email_conflict() {
        let svc = test_service();
        svc.create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();
        let (_, other, _) = svc
            .create_user_profile(new_user(Role::Student, Some("123456")), new_profile("b@b.se"))
            .unwrap();

        let err = svc
            .update_profile(
                &other.profile_id,
                UpdateProfile {
                    email: Some("A@b.se".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AccountsError::Conflict(_)));
    }

    #[test]
    fn test_delete_profile_frees_email_keeps_user() {
        let svc = test_service();
        let (user, profile, _) = svc
            .create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();

        svc.delete_profile(&profile.profile_id).unwrap();
        assert!(matches!(
            svc.get_profile(&profile.profile_id),
            Err(AccountsError::NotFound(_))
        ));

        // The user is untouched and the email is reusable.
        svc.get_user(&user.user_id).unwrap();
        svc.create_user_profile(new_user(Role::Staff, Some("123456")), new_profile("a@b.se"))
            .unwrap();
    }

    #[test]
    fn test_list_profiles_by_role_filters_and_searches() {
        let svc = test_service();
        let (student, _, _) = svc
            .create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();
        svc.create_user_profile(new_user(Role::Staff, Some("123456")), new_profile("b@b.se"))
            .unwrap();

        let students = svc.list_profiles_by_role(Role::Student, None).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].0.user_id, student.user_id);

        let hits = svc.list_profiles_by_role(Role::Student, Some("lovelace")).unwrap();
        assert_eq!(hits.len(), 1);

        let misses = svc.list_profiles_by_role(Role::Student, Some("turing")).unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn test_search_term_wildcards_are_literal() {
        let svc = test_service();
        svc.create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();

        // "%" and "_" are not wildcards in a search term.
        assert!(svc
            .list_profiles_by_role(Role::Student, Some("%"))
            .unwrap()
            .is_empty());
        assert!(svc
            .list_profiles_by_role(Role::Student, Some("___"))
            .unwrap()
            .is_empty());

        let hits = svc.list_profiles_by_role(Role::Student, Some("ada")).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_list_profiles_excludes_deleted_user() {
        let svc = test_service();
        let (user, _, _) = svc
            .create_user_profile(new_user(Role::Student, Some("123456")), new_profile("a@b.se"))
            .unwrap();

        svc.delete_user(&user.user_id).unwrap();
        let students = svc.list_profiles_by_role(Role::Student, None).unwrap();
        assert!(students.is_empty());
    }
}
