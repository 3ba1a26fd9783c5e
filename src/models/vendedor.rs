//! Modelo de Vendedor (dueño de vehículos en consignación)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vendedor - mapea a la tabla vendedores
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vendedor {
    pub id: Uuid,
    pub nombre: String,
    pub apellido: String,
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

impl Vendedor {
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }
}
