use serde::{Deserialize, Serialize};

use crate::model::Role;

/// JWT claims payload.
///
/// `role` is present in access tokens and absent in refresh tokens. The
/// authorization guard never trusts it for access decisions — the
/// authoritative role is re-fetched from the user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's sequential id.
    pub user_id: String,

    /// Role at mint time (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Token pair returned after login.
///
/// The refresh token is minted for clients that want to hold one, but no
/// consumption/rotation endpoint exists.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
