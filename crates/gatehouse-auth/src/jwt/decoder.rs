//! JWT credential validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;

use super::claims::Claims;

/// Validates JWT bearer credentials.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and cryptographically verifies a credential string.
    ///
    /// Checks signature validity and expiration. Session validity is a
    /// separate check made by the gate.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Credential has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid credential format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid credential signature")
                    }
                    _ => AppError::unauthorized(format!("Credential validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_round_trip() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let account_id = Uuid::new_v4();

        let (token, _exp) = encoder.generate(account_id, "bob@example.com").unwrap();
        let claims = decoder.decode(&token).unwrap();

        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.email, "bob@example.com");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_rejects_expired_credential() {
        let decoder = JwtDecoder::new(&config());
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "bob@example.com".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = decoder.decode(&token).unwrap_err();
        assert!(err.is(gatehouse_core::ErrorKind::Unauthorized));
    }

    #[test]
    fn test_rejects_wrong_signature() {
        let encoder = JwtEncoder::new(&AuthConfig {
            jwt_secret: "other-secret".to_string(),
            ..AuthConfig::default()
        });
        let decoder = JwtDecoder::new(&config());

        let (token, _) = encoder.generate(Uuid::new_v4(), "bob@example.com").unwrap();
        assert!(decoder.decode(&token).is_err());
    }
}
