use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::mercadolibre_controller::MercadoLibreController;
use crate::controllers::vehiculo_controller::VehiculoController;
use crate::dto::common::Paginated;
use crate::dto::mercadolibre_dto::PublicationResponse;
use crate::dto::vehiculo_dto::{
    CreateImagenRequest, CreateVehiculoRequest, ImagenResponse, PublicarMlRequest,
    UpdateVehiculoRequest, VehiculoFilters, VehiculoResponse,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// El listado y el detalle son públicos (catálogo web), el resto del
/// ciclo de vida requiere autenticación.
pub fn create_vehiculo_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create))
        .route("/:id", axum::routing::put(update).delete(soft_delete))
        .route("/:id/restaurar", post(restore))
        .route("/:id/marcar-vendido", post(marcar_vendido))
        .route("/:id/marcar-reservado", post(marcar_reservado))
        .route("/:id/marcar-disponible", post(marcar_disponible))
        .route("/:id/imagenes", post(add_imagen))
        .route(
            "/:id/imagenes/:imagen_id",
            axum::routing::delete(delete_imagen),
        )
        .route("/:id/imagenes/:imagen_id/principal", post(set_imagen_principal))
        .route("/:id/publicar-ml", post(publicar_ml))
        .route("/:id/pausar-ml", post(pausar_ml))
        .route("/:id/cerrar-ml", post(cerrar_ml))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(list))
        .route("/:id", get(get_one))
        .route("/:id/imagenes", get(list_imagenes))
        .merge(protected)
}

async fn list(
    State(state): State<AppState>,
    Query(filters): Query<VehiculoFilters>,
) -> Result<Json<Paginated<VehiculoResponse>>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.list(filters).await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateVehiculoRequest>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.create(request, user.user_id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehiculoRequest>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn restore(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.restore(id).await?))
}

async fn marcar_vendido(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.marcar_vendido(id, true).await?))
}

async fn marcar_reservado(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.marcar_reservado(id).await?))
}

/// Limpia vendido y reservado.
async fn marcar_disponible(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehiculoResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.marcar_vendido(id, false).await?))
}

// =============================================================================
// IMÁGENES
// =============================================================================

async fn list_imagenes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ImagenResponse>>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.list_imagenes(id).await?))
}

async fn add_imagen(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateImagenRequest>,
) -> Result<Json<ImagenResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.add_imagen(id, request).await?))
}

async fn set_imagen_principal(
    State(state): State<AppState>,
    Path((id, imagen_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ImagenResponse>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    Ok(Json(controller.set_imagen_principal(id, imagen_id).await?))
}

async fn delete_imagen(
    State(state): State<AppState>,
    Path((id, imagen_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehiculoController::new(state.pool.clone());
    controller.delete_imagen(id, imagen_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// =============================================================================
// MERCADOLIBRE
// =============================================================================

async fn publicar_ml(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PublicarMlRequest>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.publicar_vehiculo(id, request, user.user_id).await?))
}

async fn pausar_ml(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.pausar_vehiculo(id, user.user_id).await?))
}

async fn cerrar_ml(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<PublicationResponse>, AppError> {
    let controller = MercadoLibreController::new(state);
    Ok(Json(controller.cerrar_vehiculo(id, user.user_id).await?))
}
