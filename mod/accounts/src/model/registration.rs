use serde::{Deserialize, Serialize};

use crate::model::{CreateProfile, CreateUser, Profile, UserPublic};

/// Combined input for the transactional user+profile creation.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub user: CreateUser,
    pub profile: CreateProfile,
}

/// Creation response. `pin` is populated only when the system generated
/// the PIN — the one and only time the plaintext leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    pub profile_id: String,
}

/// An authenticated caller: the live user row plus its profile, with the
/// role taken from storage rather than token claims.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub user: UserPublic,
    pub profile: Profile,
}
