use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::parametro_controller::ParametroController;
use crate::dto::parametro_dto::{
    CreateModeloRequest, CreateParametroRequest, ModeloFilters, ParametroFilters,
    UpdateParametroRequest,
};
use crate::middleware::auth::auth_middleware;
use crate::models::parametro::{Modelo, Parametro, TipoParametro};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Los listados son públicos (los consume la web de la concesionaria),
/// las mutaciones requieren autenticación.
pub fn create_parametro_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/modelos", post(create_modelo))
        .route("/modelos/:id", put(update_modelo))
        .route("/modelos/:id", delete(delete_modelo))
        .route("/:tipo", post(create_parametro))
        .route("/:tipo/:id", put(update_parametro))
        .route("/:tipo/:id", delete(delete_parametro))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/modelos", get(list_modelos))
        .route("/modelos/:id", get(get_modelo))
        .route("/:tipo", get(list_parametros))
        .route("/:tipo/:id", get(get_parametro))
        .merge(protected)
}

fn parse_tipo(segment: &str) -> Result<TipoParametro, AppError> {
    TipoParametro::from_path(segment)
        .ok_or_else(|| AppError::NotFound(format!("Tipo de parámetro desconocido: {}", segment)))
}

async fn list_parametros(
    State(state): State<AppState>,
    Path(tipo): Path<String>,
    Query(filters): Query<ParametroFilters>,
) -> Result<Json<Vec<Parametro>>, AppError> {
    let tipo = parse_tipo(&tipo)?;
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.list(tipo, filters).await?))
}

async fn get_parametro(
    State(state): State<AppState>,
    Path((tipo, id)): Path<(String, Uuid)>,
) -> Result<Json<Parametro>, AppError> {
    let tipo = parse_tipo(&tipo)?;
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.get(tipo, id).await?))
}

async fn create_parametro(
    State(state): State<AppState>,
    Path(tipo): Path<String>,
    Json(request): Json<CreateParametroRequest>,
) -> Result<Json<Parametro>, AppError> {
    let tipo = parse_tipo(&tipo)?;
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.create(tipo, request).await?))
}

async fn update_parametro(
    State(state): State<AppState>,
    Path((tipo, id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateParametroRequest>,
) -> Result<Json<Parametro>, AppError> {
    let tipo = parse_tipo(&tipo)?;
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.update(tipo, id, request).await?))
}

async fn delete_parametro(
    State(state): State<AppState>,
    Path((tipo, id)): Path<(String, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tipo = parse_tipo(&tipo)?;
    let controller = ParametroController::new(state.pool.clone());
    controller.delete(tipo, id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn list_modelos(
    State(state): State<AppState>,
    Query(filters): Query<ModeloFilters>,
) -> Result<Json<Vec<Modelo>>, AppError> {
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.list_modelos(filters).await?))
}

async fn get_modelo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Modelo>, AppError> {
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.get_modelo(id).await?))
}

async fn create_modelo(
    State(state): State<AppState>,
    Json(request): Json<CreateModeloRequest>,
) -> Result<Json<Modelo>, AppError> {
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.create_modelo(request).await?))
}

async fn update_modelo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateParametroRequest>,
) -> Result<Json<Modelo>, AppError> {
    let controller = ParametroController::new(state.pool.clone());
    Ok(Json(controller.update_modelo(id, request).await?))
}

async fn delete_modelo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = ParametroController::new(state.pool.clone());
    controller.delete_modelo(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
