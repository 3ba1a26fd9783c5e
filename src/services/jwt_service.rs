use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::usuario::Usuario;
use crate::utils::errors::AppError;

/// Claims del token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub rol: String,
    /// "access" o "refresh"
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

/// Configuración JWT
pub struct JwtConfig {
    pub algorithm: Algorithm,
    pub access_token_duration: Duration,
    pub refresh_token_duration: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::hours(24),
            refresh_token_duration: Duration::days(7),
        }
    }
}

/// Servicio JWT
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// `access_token_seconds` viene de JWT_EXPIRATION.
    pub fn new(secret: &str, access_token_seconds: u64) -> Self {
        Self {
            config: JwtConfig {
                access_token_duration: Duration::seconds(access_token_seconds as i64),
                ..JwtConfig::default()
            },
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Genera un token de acceso
    pub fn generate_access_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        self.generate_token(usuario, "access", self.config.access_token_duration)
    }

    /// Genera un token de refresh
    pub fn generate_refresh_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        self.generate_token(usuario, "refresh", self.config.refresh_token_duration)
    }

    fn generate_token(
        &self,
        usuario: &Usuario,
        kind: &str,
        duration: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: usuario.id.to_string(),
            email: usuario.email.clone(),
            rol: usuario.rol.as_str().to_string(),
            kind: kind.to_string(),
            exp: (now + duration).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Jwt(format!("Error al generar token: {}", e)))
    }

    /// Valida y decodifica un token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let validation = Validation::new(self.config.algorithm);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Token inválido: {}", e)))
    }

    /// Valida un access token y devuelve sus claims.
    pub fn validate_access_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let claims = self.validate_token(token)?;
        if claims.kind != "access" {
            return Err(AppError::Unauthorized(
                "Se esperaba un token de acceso".to_string(),
            ));
        }
        Ok(claims)
    }

    /// Valida un refresh token y devuelve sus claims.
    pub fn validate_refresh_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let claims = self.validate_token(token)?;
        if claims.kind != "refresh" {
            return Err(AppError::Unauthorized(
                "Se esperaba un token de refresh".to_string(),
            ));
        }
        Ok(claims)
    }

    /// Extrae el user_id de los claims
    pub fn user_id(claims: &JwtClaims) -> Result<Uuid, AppError> {
        Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Token con sub inválido".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usuario::RolUsuario;
    use chrono::Utc;

    fn usuario_test() -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            email: "admin@autobiliaria.com".to_string(),
            nombre: "Ana".to_string(),
            apellido: "García".to_string(),
            rol: RolUsuario::Admin,
            password_hash: String::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt_service = JwtService::new("secreto-de-test", 3600);
        let usuario = usuario_test();

        let token = jwt_service.generate_access_token(&usuario).unwrap();
        assert!(!token.is_empty());

        let claims = jwt_service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, usuario.id.to_string());
        assert_eq!(claims.email, "admin@autobiliaria.com");
        assert_eq!(claims.rol, "admin");
        assert_eq!(claims.kind, "access");
    }

    #[test]
    fn test_refresh_token_no_sirve_como_access() {
        let jwt_service = JwtService::new("secreto-de-test", 3600);
        let usuario = usuario_test();

        let refresh = jwt_service.generate_refresh_token(&usuario).unwrap();
        assert!(jwt_service.validate_access_token(&refresh).is_err());
        assert!(jwt_service.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_token_con_secreto_distinto_falla() {
        let jwt_service = JwtService::new("secreto-de-test", 3600);
        let otro = JwtService::new("otro-secreto", 3600);
        let usuario = usuario_test();

        let token = jwt_service.generate_access_token(&usuario).unwrap();
        assert!(otro.validate_token(&token).is_err());
    }
}
