use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{
    LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse, UsuarioResponse,
};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .merge(protected)
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), &state.config.jwt_secret, state.config.jwt_expiration);
    let response = controller.login(request).await?;
    Ok(Json(response))
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), &state.config.jwt_secret, state.config.jwt_expiration);
    let response = controller.refresh(request).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UsuarioResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone(), &state.config.jwt_secret, state.config.jwt_expiration);
    let response = controller.me(user.user_id).await?;
    Ok(Json(response))
}

async fn logout(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    let controller = AuthController::new(state.pool.clone(), &state.config.jwt_secret, state.config.jwt_expiration);
    Json(controller.logout())
}
