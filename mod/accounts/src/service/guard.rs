//! Authorization checks for authenticated requests.
//!
//! The role embedded in a token is a hint only. Every check re-reads the
//! user row, so role demotions and soft deletions take effect as soon as
//! they land, without waiting for outstanding tokens to expire.

use crate::model::{Claims, Principal, Role};
use crate::service::{AccountsError, AccountsService};

/// Roles allowed to manage users and profiles.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin, Role::SuperAdmin];

/// Roles allowed to read other users' data.
pub const STAFF_OR_ABOVE: &[Role] = &[Role::Staff, Role::Admin, Role::SuperAdmin];

/// Any live account.
pub const ANY_ROLE: &[Role] = &[Role::Student, Role::Staff, Role::Admin, Role::SuperAdmin];

impl AccountsService {
    /// Resolve verified claims to a live principal. A missing or
    /// soft-deleted user fails authentication even when the token itself
    /// is still valid; so does a user whose profile was deleted, since a
    /// principal is always the user-profile pair. The guard never surfaces
    /// anything outside the auth error family.
    pub fn authenticate_claims(&self, claims: &Claims) -> Result<Principal, AccountsError> {
        let not_active =
            |e| match e {
                AccountsError::NotFound(_) => {
                    AccountsError::Unauthenticated("account no longer active".into())
                }
                other => other,
            };
        let user = self.get_user(&claims.user_id).map_err(not_active)?;
        let profile = self
            .get_profile_by_user_id(&claims.user_id)
            .map_err(not_active)?;
        Ok(Principal { user, profile })
    }

    /// Authenticate and require the stored role to be one of `allowed`.
    pub fn require_role(
        &self,
        claims: &Claims,
        allowed: &[Role],
    ) -> Result<Principal, AccountsError> {
        let principal = self.authenticate_claims(claims)?;
        if !allowed.contains(&principal.user.role) {
            tracing::warn!(
                user_id = %principal.user.user_id,
                role = %principal.user.role,
                "role not permitted for operation"
            );
            return Err(AccountsError::Forbidden(format!(
                "role '{}' is not permitted",
                principal.user.role
            )));
        }
        Ok(principal)
    }

    /// Verify a raw access token and authorize in one step.
    pub fn authorize_token(
        &self,
        token: &str,
        allowed: &[Role],
    ) -> Result<Principal, AccountsError> {
        let claims = self.verify_token_with_role(token)?;
        self.require_role(&claims, allowed)
    }
}
