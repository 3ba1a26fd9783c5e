use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request para crear un parámetro de catálogo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateParametroRequest {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,

    pub activo: Option<bool>,

    pub orden: Option<i32>,
}

/// Request para actualizar un parámetro existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateParametroRequest {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,

    pub activo: Option<bool>,

    pub orden: Option<i32>,
}

/// Request para crear un modelo (requiere marca)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModeloRequest {
    pub marca_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub nombre: String,

    pub activo: Option<bool>,

    pub orden: Option<i32>,
}

/// Filtros de listado de parámetros
#[derive(Debug, Deserialize)]
pub struct ParametroFilters {
    pub activo: Option<bool>,
    pub search: Option<String>,
}

/// Filtros de listado de modelos
#[derive(Debug, Deserialize)]
pub struct ModeloFilters {
    pub activo: Option<bool>,
    pub marca_id: Option<Uuid>,
    pub search: Option<String>,
}
