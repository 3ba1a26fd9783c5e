use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vendedor::Vendedor;

/// Request para registrar un vendedor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendedorRequest {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,

    #[validate(length(min = 1, max = 100))]
    pub apellido: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 255))]
    pub direccion: String,

    #[validate(length(min = 1, max = 20))]
    pub celular: String,

    #[validate(length(min = 1, max = 20))]
    pub dni: String,

    pub tiene_cartel: Option<bool>,

    pub comentarios: Option<String>,
}

/// Request para actualizar un vendedor
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVendedorRequest {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub apellido: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub direccion: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub celular: Option<String>,

    pub tiene_cartel: Option<bool>,

    pub activo: Option<bool>,

    pub comentarios: Option<String>,
}

/// Filtros de listado de vendedores
#[derive(Debug, Deserialize)]
pub struct VendedorFilters {
    pub activo: Option<bool>,
    pub tiene_cartel: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de vendedor
#[derive(Debug, Serialize)]
pub struct VendedorResponse {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub nombre_completo: String,
    pub email: String,
    pub direccion: String,
    pub celular: String,
    pub dni: String,
    pub tiene_cartel: bool,
    pub activo: bool,
    pub comentarios: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vendedor> for VendedorResponse {
    fn from(v: Vendedor) -> Self {
        Self {
            id: v.id.to_string(),
            nombre_completo: v.nombre_completo(),
            nombre: v.nombre,
            apellido: v.apellido,
            email: v.email,
            direccion: v.direccion,
            celular: v.celular,
            dni: v.dni,
            tiene_cartel: v.tiene_cartel,
            activo: v.activo,
            comentarios: v.comentarios,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}
