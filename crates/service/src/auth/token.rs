use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::{Principal, Role};
use super::errors::AuthError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// HS256 bearer tokens shared by all three services.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self { Self::new(&cfg.jwt_secret, cfg.token_ttl_secs) }

    pub fn ttl_secs(&self) -> u64 { self.ttl_secs }

    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: principal.login.clone(),
            role: principal.role,
            iat: now,
            exp: now + self.ttl_secs as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AuthError::Token(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| AuthError::Token(e.to_string()))?;
        Ok(Principal { login: data.claims.sub, role: data.claims.role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_principal() {
        let tokens = TokenService::new("secret", 60);
        let p = Principal::new("alice", Role::Admin);
        let t = tokens.issue(&p).unwrap();
        assert_eq!(tokens.verify(&t).unwrap(), p);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let t = TokenService::new("one", 60).issue(&Principal::new("bob", Role::User)).unwrap();
        let err = TokenService::new("two", 60).verify(&t).unwrap_err();
        assert_eq!(err.code(), 401);
    }
}
