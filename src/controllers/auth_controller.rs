use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{
    LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse, UsuarioResponse,
};
use crate::dto::common::ApiResponse;
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppError;

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt_secret: &str, jwt_expiration: u64) -> Self {
        Self {
            service: AuthService::new(pool, jwt_secret, jwt_expiration),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;
        self.service.login(&request).await
    }

    pub async fn refresh(
        &self,
        request: RefreshTokenRequest,
    ) -> Result<RefreshTokenResponse, AppError> {
        self.service.refresh(&request.refresh).await
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UsuarioResponse, AppError> {
        let usuario = self.service.me(user_id).await?;
        Ok(UsuarioResponse::from(usuario))
    }

    /// Logout sin estado: los tokens expiran solos, el cliente los descarta.
    pub fn logout(&self) -> ApiResponse<()> {
        ApiResponse::success_with_message((), "Sesión cerrada".to_string())
    }
}
