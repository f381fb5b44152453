// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Claims};

/// O login acontece em outro serviço, que assina com o mesmo segredo.
/// Aqui só validamos (e, para testes e ferramentas internas, emitimos) tokens.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub fn create_token(&self, user_id: Uuid, vendor_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            vendor_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_user_and_vendor() {
        let auth = AuthService::new("segredo-de-teste".into());
        let (user, vendor) = (Uuid::new_v4(), Uuid::new_v4());

        let token = auth.create_token(user, vendor).unwrap();
        let claims = auth.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.vendor_id, vendor);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = AuthService::new("outro-segredo".into());
        let token = issuer.create_token(Uuid::new_v4(), Uuid::new_v4()).unwrap();

        let auth = AuthService::new("segredo-de-teste".into());
        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("lixo"), Err(AppError::InvalidToken)));
    }
}
