use sqlx::PgPool;
use tracing::{info, warn};

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RefreshTokenResponse, UsuarioResponse};
use crate::models::usuario::Usuario;
use crate::repositories::usuario_repository::UsuarioRepository;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::AppError;

/// Servicio de autenticación con email y contraseña
pub struct AuthService {
    usuarios: UsuarioRepository,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_secret: &str, jwt_expiration: u64) -> Self {
        Self {
            usuarios: UsuarioRepository::new(pool),
            jwt: JwtService::new(jwt_secret, jwt_expiration),
        }
    }

    /// Login con email y contraseña. Devuelve el par access/refresh.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        let usuario = self
            .usuarios
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                warn!("🔒 Login fallido: email desconocido");
                AppError::Unauthorized("Credenciales inválidas".to_string())
            })?;

        if !usuario.is_active {
            warn!("🔒 Login fallido: usuario inactivo {}", usuario.id);
            return Err(AppError::Unauthorized("Usuario inactivo".to_string()));
        }

        let valid = bcrypt::verify(&request.password, &usuario.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !valid {
            warn!("🔒 Login fallido: contraseña incorrecta para {}", usuario.id);
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        info!("✅ Login exitoso: {} ({})", usuario.email, usuario.rol.as_str());

        Ok(LoginResponse {
            access: self.jwt.generate_access_token(&usuario)?,
            refresh: self.jwt.generate_refresh_token(&usuario)?,
            user: UsuarioResponse::from(usuario),
        })
    }

    /// Emite un nuevo access token a partir de un refresh token válido.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResponse, AppError> {
        let claims = self.jwt.validate_refresh_token(refresh_token)?;
        let user_id = JwtService::user_id(&claims)?;

        let usuario = self
            .usuarios
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("Usuario inválido o inactivo".to_string()))?;

        Ok(RefreshTokenResponse {
            access: self.jwt.generate_access_token(&usuario)?,
        })
    }

    /// Usuario autenticado a partir del id del token.
    pub async fn me(&self, user_id: uuid::Uuid) -> Result<Usuario, AppError> {
        self.usuarios
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("Usuario inválido o inactivo".to_string()))
    }
}
