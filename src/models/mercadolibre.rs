//! Modelos de la integración con MercadoLibre
//!
//! Credenciales OAuth2, publicaciones espejadas localmente y el log
//! append-only de sincronizaciones.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Credencial OAuth2 de MercadoLibre - mapea a la tabla ml_credentials
///
/// El access token expira en 6 horas; el refresh token es de un solo uso.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MlCredential {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ml_user_id: String,
    pub ml_nickname: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub scope: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MlCredential {
    /// Verifica si el access token está expirado
    pub fn is_token_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Verifica si el token necesita renovarse (30 min antes de expirar)
    pub fn needs_refresh(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::minutes(30)
    }
}

/// Estado de una publicación en MercadoLibre - ENUM ml_publication_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "ml_publication_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MlPublicationStatus {
    Active,
    Paused,
    Closed,
    UnderReview,
    Inactive,
}

impl MlPublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MlPublicationStatus::Active => "active",
            MlPublicationStatus::Paused => "paused",
            MlPublicationStatus::Closed => "closed",
            MlPublicationStatus::UnderReview => "under_review",
            MlPublicationStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(MlPublicationStatus::Active),
            "paused" => Some(MlPublicationStatus::Paused),
            "closed" => Some(MlPublicationStatus::Closed),
            "under_review" => Some(MlPublicationStatus::UnderReview),
            "inactive" => Some(MlPublicationStatus::Inactive),
            _ => None,
        }
    }
}

/// Publicación de MercadoLibre espejada localmente - tabla ml_publications
///
/// Puede estar vinculada a un vehículo del sistema o no.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MlPublication {
    pub id: Uuid,
    pub vehiculo_id: Option<Uuid>,
    pub ml_item_id: String,
    pub ml_title: String,
    pub ml_status: MlPublicationStatus,
    pub ml_price: Decimal,
    pub ml_currency: String,
    pub ml_permalink: String,
    pub ml_thumbnail: String,
    pub ml_category_id: String,
    pub ml_listing_type: String,

    // Datos extraídos para matching
    pub patente_ml: String,
    pub marca_ml: String,
    pub modelo_ml: String,
    pub anio_ml: Option<i32>,
    pub km_ml: Option<i32>,

    // Sincronización
    pub last_synced: DateTime<Utc>,
    pub sync_error: String,
    pub created_from_system: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MlPublication {
    /// Verifica si está vinculada a un vehículo del sistema
    pub fn is_linked(&self) -> bool {
        self.vehiculo_id.is_some()
    }
}

/// Acción registrada en el log de sincronización - ENUM ml_sync_action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "ml_sync_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MlSyncAction {
    Import,
    Create,
    Update,
    Pause,
    Activate,
    Close,
    RefreshToken,
}

impl MlSyncAction {
    /// Acción de log correspondiente a un cambio de estado
    pub fn from_status(status: MlPublicationStatus) -> Self {
        match status {
            MlPublicationStatus::Active => MlSyncAction::Activate,
            MlPublicationStatus::Paused => MlSyncAction::Pause,
            MlPublicationStatus::Closed => MlSyncAction::Close,
            _ => MlSyncAction::Update,
        }
    }
}

/// Registro append-only de sincronización - tabla ml_sync_logs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MlSyncLog {
    pub id: Uuid,
    pub action: MlSyncAction,
    pub publication_id: Option<Uuid>,
    pub vehiculo_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub request_data: Option<serde_json::Value>,
    pub response_data: Option<serde_json::Value>,
    pub success: bool,
    pub error_message: String,
    pub created_at: DateTime<Utc>,
}
