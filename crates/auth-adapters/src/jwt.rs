//! HS256 JSON Web Tokens.
//!
//! Tokens carry `{userId, username, role, iat, exp}` and live for one hour.
//! There is no revocation list: a token is valid until it expires.

use chrono::Utc;
use domains::{Claims, DomainError, Result, TokenService, User};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

pub const TOKEN_TTL_SECS: i64 = 60 * 60;

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtTokenService {
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl_secs: TOKEN_TTL_SECS,
        }
    }

    /// Overrides the lifetime of issued tokens; a negative value mints
    /// already-expired tokens for tests.
    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &User) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            iat,
            exp: iat + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))
    }

    fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let msg = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token expired.",
                    _ => "Invalid token.",
                };
                DomainError::Unauthenticated(msg.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{HashedPassword, Role};

    fn service(secret: &str) -> JwtTokenService {
        JwtTokenService::new(&SecretString::from(secret.to_string()))
    }

    fn writer() -> User {
        User::new("JohnDoe", HashedPassword::from_phc("x")).with_role(Role::Write)
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let svc = service("test-secret");
        let user = writer();
        let claims = svc.verify(&svc.issue(&user).unwrap()).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "JohnDoe");
        assert_eq!(claims.role, Role::Write);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = service("secret-a").issue(&writer()).unwrap();
        let err = service("secret-b").verify(&token).unwrap_err();
        assert_eq!(err, DomainError::Unauthenticated("Invalid token.".into()));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service("test-secret").with_ttl_secs(-120);
        let token = svc.issue(&writer()).unwrap();
        let err = svc.verify(&token).unwrap_err();
        assert_eq!(err, DomainError::Unauthenticated("Token expired.".into()));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            service("test-secret").verify("not-a-jwt"),
            Err(DomainError::Unauthenticated(_))
        ));
    }
}
