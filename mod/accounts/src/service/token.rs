use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::model::{Claims, Role, TokenPair, User};
use crate::service::{AccountsError, AccountsService};

impl AccountsService {
    /// Mint a signed access token carrying subject and role.
    pub fn mint_access(&self, user_id: &str, role: Role) -> Result<String, AccountsError> {
        self.mint(user_id, Some(role), self.config.access_token_ttl)
    }

    /// Mint a longer-lived refresh token (subject only).
    pub fn mint_refresh(&self, user_id: &str) -> Result<String, AccountsError> {
        self.mint(user_id, None, self.config.refresh_token_ttl)
    }

    fn mint(
        &self,
        user_id: &str,
        role: Option<Role>,
        ttl: i64,
    ) -> Result<String, AccountsError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            user_id: user_id.to_string(),
            role,
            iat: now,
            exp: now + ttl,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AccountsError::Internal(format!("JWT encode failed: {}", e)))
    }

    /// Issue the access + refresh pair for a user.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AccountsError> {
        Ok(TokenPair {
            access_token: self.mint_access(&user.user_id, user.role)?,
            refresh_token: self.mint_refresh(&user.user_id)?,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a token, requiring only the subject claim.
    ///
    /// Fails on bad signature, missing subject, or passed expiry. Pure
    /// function of token + secret + wall clock.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AccountsError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AccountsError::InvalidToken(e.to_string()))?;

        let claims = token_data.claims;
        if claims.user_id.is_empty() {
            return Err(AccountsError::InvalidToken("missing user_id claim".into()));
        }

        Ok(claims)
    }

    /// Verify a token that must also carry a role claim.
    ///
    /// Used by callers that want the mint-time role without a record
    /// lookup; authorization decisions still go through the guard.
    pub fn verify_token_with_role(&self, token: &str) -> Result<Claims, AccountsError> {
        let claims = self.verify_token(token)?;
        if claims.role.is_none() {
            return Err(AccountsError::InvalidToken("missing role claim".into()));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::AccountsConfig;
    use crate::service::test_support::{test_service, test_service_with_config};

    #[test]
    fn test_access_token_round_trip() {
        let svc = test_service();

        let token = svc.mint_access("1000005", Role::Staff).unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, "1000005");
        assert_eq!(claims.role, Some(Role::Staff));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_has_no_role() {
        let svc = test_service();

        let token = svc.mint_refresh("1000005").unwrap();
        let claims = svc.verify_token(&token).unwrap();
        assert_eq!(claims.role, None);

        // Role-checked verification rejects it.
        let err = svc.verify_token_with_role(&token).unwrap_err();
        assert!(matches!(err, AccountsError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = test_service_with_config(AccountsConfig {
            access_token_ttl: -3600,
            ..Default::default()
        });

        let token = svc.mint_access("1000005", Role::Student).unwrap();
        let err = svc.verify_token(&token).unwrap_err();
        assert!(matches!(err, AccountsError::InvalidToken(_)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = test_service();

        let token = svc.mint_access("1000005", Role::Student).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(svc.verify_token(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let minting = test_service_with_config(AccountsConfig {
            jwt_secret: "secret-a".into(),
            ..Default::default()
        });
        let verifying = test_service_with_config(AccountsConfig {
            jwt_secret: "secret-b".into(),
            ..Default::default()
        });

        let token = minting.mint_access("1000005", Role::Admin).unwrap();
        assert!(verifying.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = test_service();
        assert!(svc.verify_token("this.is.not.a.valid.jwt").is_err());
    }
}
