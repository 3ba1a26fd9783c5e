//! Modelos de parámetros de catálogo
//!
//! Todas las tablas de parámetros (cajas, combustibles, marcas, etc.)
//! comparten la misma forma: nombre, activo, orden y auditoría. Los
//! modelos de vehículo (tabla `modelos`) además referencian una marca.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tipos de parámetros disponibles. Cada variante mapea a su propia tabla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoParametro {
    Cajas,
    Combustibles,
    Condiciones,
    Estados,
    Ivas,
    Localidades,
    Marcas,
    Monedas,
    Segmentos,
}

impl TipoParametro {
    /// Nombre de la tabla en PostgreSQL. Whitelist fija: nunca se
    /// interpola input del usuario en SQL.
    pub fn table_name(&self) -> &'static str {
        match self {
            TipoParametro::Cajas => "cajas",
            TipoParametro::Combustibles => "combustibles",
            TipoParametro::Condiciones => "condiciones",
            TipoParametro::Estados => "estados",
            TipoParametro::Ivas => "ivas",
            TipoParametro::Localidades => "localidades",
            TipoParametro::Marcas => "marcas",
            TipoParametro::Monedas => "monedas",
            TipoParametro::Segmentos => "segmentos",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "cajas" => Some(TipoParametro::Cajas),
            "combustibles" => Some(TipoParametro::Combustibles),
            "condiciones" => Some(TipoParametro::Condiciones),
            "estados" => Some(TipoParametro::Estados),
            "ivas" => Some(TipoParametro::Ivas),
            "localidades" => Some(TipoParametro::Localidades),
            "marcas" => Some(TipoParametro::Marcas),
            "monedas" => Some(TipoParametro::Monedas),
            "segmentos" => Some(TipoParametro::Segmentos),
            _ => None,
        }
    }
}

/// Parámetro genérico de catálogo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Parametro {
    pub id: Uuid,
    pub nombre: String,
    pub activo: bool,
    pub orden: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Modelo de vehículo (tabla `modelos`), relacionado a una marca
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Modelo {
    pub id: Uuid,
    pub marca_id: Uuid,
    pub nombre: String,
    pub activo: bool,
    pub orden: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
