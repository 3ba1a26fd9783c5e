use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vendedor_controller::VendedorController;
use crate::dto::common::Paginated;
use crate::dto::vendedor_dto::{
    CreateVendedorRequest, UpdateVendedorRequest, VendedorFilters, VendedorResponse,
};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vendedor_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(deactivate))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn list(
    State(state): State<AppState>,
    Query(filters): Query<VendedorFilters>,
) -> Result<Json<Paginated<VendedorResponse>>, AppError> {
    let controller = VendedorController::new(state.pool.clone());
    Ok(Json(controller.list(filters).await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendedorResponse>, AppError> {
    let controller = VendedorController::new(state.pool.clone());
    Ok(Json(controller.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateVendedorRequest>,
) -> Result<Json<VendedorResponse>, AppError> {
    let controller = VendedorController::new(state.pool.clone());
    Ok(Json(controller.create(request).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVendedorRequest>,
) -> Result<Json<VendedorResponse>, AppError> {
    let controller = VendedorController::new(state.pool.clone());
    Ok(Json(controller.update(id, request).await?))
}

/// DELETE da de baja lógica, nunca borra la fila.
async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendedorResponse>, AppError> {
    let controller = VendedorController::new(state.pool.clone());
    Ok(Json(controller.deactivate(id).await?))
}
