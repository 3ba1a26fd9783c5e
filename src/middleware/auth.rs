//! Middleware de autenticación JWT
//!
//! Extrae el bearer token, lo valida y carga el usuario en las
//! extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::usuario::RolUsuario;
use crate::repositories::usuario_repository::UsuarioRepository;
use crate::services::jwt_service::JwtService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub rol: RolUsuario,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let jwt = JwtService::new(&state.config.jwt_secret, state.config.jwt_expiration);
    let claims = jwt.validate_access_token(token)?;
    let user_id = JwtService::user_id(&claims)?;

    // El usuario tiene que seguir existiendo y estar activo
    let usuario = UsuarioRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("Usuario inválido o inactivo".to_string()))?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: usuario.id,
        email: usuario.email,
        rol: usuario.rol,
    });

    Ok(next.run(request).await)
}
