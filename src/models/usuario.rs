//! Modelo de Usuario
//!
//! Usa email como identificador principal para el login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM rol_usuario
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "rol_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RolUsuario {
    Admin,
    Staff,
}

impl RolUsuario {
    pub fn as_str(&self) -> &'static str {
        match self {
            RolUsuario::Admin => "admin",
            RolUsuario::Staff => "staff",
        }
    }

}

/// Usuario del sistema - mapea a la tabla usuarios
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    pub rol: RolUsuario,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Usuario {
    /// Retorna nombre completo del usuario
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}
