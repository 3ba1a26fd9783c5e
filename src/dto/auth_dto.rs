use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::usuario::Usuario;

/// Request de login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Request de refresh de token
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Response de login con el par de tokens JWT
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UsuarioResponse,
}

/// Response de refresh
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access: String,
}

/// Datos públicos del usuario (sin password)
#[derive(Debug, Serialize)]
pub struct UsuarioResponse {
    pub id: String,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub nombre_completo: String,
    pub rol: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Usuario> for UsuarioResponse {
    fn from(usuario: Usuario) -> Self {
        Self {
            id: usuario.id.to_string(),
            nombre_completo: usuario.nombre_completo(),
            email: usuario.email,
            nombre: usuario.nombre,
            apellido: usuario.apellido,
            rol: usuario.rol.as_str().to_string(),
            is_active: usuario.is_active,
            created_at: usuario.created_at,
        }
    }
}
