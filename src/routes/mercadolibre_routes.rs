use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Redirect,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::mercadolibre_controller::MercadoLibreController;
use crate::dto::common::Paginated;
use crate::dto::mercadolibre_dto::{
    AuthUrlResponse, ConnectionStatusResponse, LinkPublicationRequest, OAuthCallbackParams,
    PublicationFilters, PublicationResponse, PublicationStatusRequest, QuotaResponse,
    StatisticsResponse, SyncLogFilters, SyncLogResponse, SyncResultResponse,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// El callback OAuth2 es público (lo llama MercadoLibre), el resto
/// requiere autenticación.
pub fn create_mercadolibre_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/url", post(auth_url))
        .route("/disconnect", delete(disconnect))
        .route("/status", get(status))
        .route("/sync", post(sync))
        .route("/publications", get(list_publications))
        .route("/publications/:id", get(get_publication))
        .route("/publications/:id/link", post(link_publication))
        .route("/publications/:id/unlink", post(unlink_publication))
        .route("/publications/:id/status", patch(change_status))
        .route("/statistics", get(statistics))
        .route("/quota", get(quota))
        .route("/logs", get(sync_logs))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/auth/callback", get(oauth_callback))
        .merge(protected)
}

async fn auth_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.auth_url(user.user_id).await?))
}

async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Redirect, AppError> {
    let controller = MercadoLibreController::new(state);
    let redirect_url = controller.callback(params).await?;
    Ok(Redirect::to(&redirect_url))
}

async fn status(
    State(state): State<AppState>,
) -> Result<Json<ConnectionStatusResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.status().await?))
}

async fn disconnect(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let controller = MercadoLibreController::new(state);
    controller.disconnect().await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<SyncResultResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.sync(user.user_id).await?))
}

async fn list_publications(
    State(state): State<AppState>,
    Query(filters): Query<PublicationFilters>,
) -> Result<Json<Paginated<PublicationResponse>>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.list_publications(filters).await?))
}

async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.get_publication(id).await?))
}

async fn link_publication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<LinkPublicationRequest>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.link_publication(id, request).await?))
}

async fn unlink_publication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.unlink_publication(id).await?))
}

async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PublicationStatusRequest>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.change_status(id, request.status, user.user_id).await?))
}

async fn statistics(State(state): State<AppState>) -> Result<Json<StatisticsResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.statistics().await?))
}

async fn quota(State(state): State<AppState>) -> Result<Json<QuotaResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.quota().await?))
}

async fn sync_logs(
    State(state): State<AppState>,
    Query(filters): Query<SyncLogFilters>,
) -> Result<Json<Vec<SyncLogResponse>>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.sync_logs(filters).await?))
}
