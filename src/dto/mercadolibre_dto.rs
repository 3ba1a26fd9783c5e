use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::mercadolibre::{MlPublication, MlPublicationStatus, MlSyncAction, MlSyncLog};

/// Estado de conexión con MercadoLibre
#[derive(Debug, Serialize)]
pub struct ConnectionStatusResponse {
    pub connected: bool,
    pub ml_user_id: Option<String>,
    pub ml_nickname: Option<String>,
    pub is_active: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub token_expired: bool,
    pub needs_reauthorization: bool,
    pub connected_at: Option<DateTime<Utc>>,
}

impl ConnectionStatusResponse {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ml_user_id: None,
            ml_nickname: None,
            is_active: false,
            token_expires_at: None,
            token_expired: true,
            needs_reauthorization: true,
            connected_at: None,
        }
    }
}

/// URL de autorización OAuth2 emitida
#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
    pub state: String,
}

/// Query params del callback OAuth2
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Resultado de una sincronización de publicaciones
#[derive(Debug, Serialize)]
pub struct SyncResultResponse {
    pub imported: u32,
    pub updated: u32,
    pub linked: u32,
    pub total: u32,
}

/// Filtros de listado de publicaciones
#[derive(Debug, Default, Deserialize)]
pub struct PublicationFilters {
    pub ml_status: Option<MlPublicationStatus>,
    pub linked: Option<bool>,
    pub created_from_system: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request para vincular una publicación a un vehículo
#[derive(Debug, Deserialize)]
pub struct LinkPublicationRequest {
    pub vehiculo_id: Uuid,
}

/// Request de cambio de estado de una publicación
#[derive(Debug, Deserialize)]
pub struct PublicationStatusRequest {
    pub status: MlPublicationStatus,
}

/// Response de publicación
#[derive(Debug, Serialize)]
pub struct PublicationResponse {
    pub id: String,
    pub vehiculo_id: Option<String>,
    pub ml_item_id: String,
    pub ml_title: String,
    pub ml_status: MlPublicationStatus,
    pub ml_price: Decimal,
    pub ml_currency: String,
    pub ml_permalink: String,
    pub ml_thumbnail: String,
    pub ml_category_id: String,
    pub ml_listing_type: String,
    pub patente_ml: String,
    pub marca_ml: String,
    pub modelo_ml: String,
    pub anio_ml: Option<i32>,
    pub km_ml: Option<i32>,
    pub is_linked: bool,
    pub last_synced: DateTime<Utc>,
    pub sync_error: String,
    pub created_from_system: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MlPublication> for PublicationResponse {
    fn from(p: MlPublication) -> Self {
        Self {
            id: p.id.to_string(),
            vehiculo_id: p.vehiculo_id.map(|v| v.to_string()),
            is_linked: p.is_linked(),
            ml_item_id: p.ml_item_id,
            ml_title: p.ml_title,
            ml_status: p.ml_status,
            ml_price: p.ml_price,
            ml_currency: p.ml_currency,
            ml_permalink: p.ml_permalink,
            ml_thumbnail: p.ml_thumbnail,
            ml_category_id: p.ml_category_id,
            ml_listing_type: p.ml_listing_type,
            patente_ml: p.patente_ml,
            marca_ml: p.marca_ml,
            modelo_ml: p.modelo_ml,
            anio_ml: p.anio_ml,
            km_ml: p.km_ml,
            last_synced: p.last_synced,
            sync_error: p.sync_error,
            created_from_system: p.created_from_system,
            created_at: p.created_at,
        }
    }
}

/// Estadísticas de publicaciones
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub total_publications: i64,
    pub active_publications: i64,
    pub paused_publications: i64,
    pub closed_publications: i64,
    pub linked_publications: i64,
    pub unlinked_publications: i64,
    pub created_from_system: i64,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Quota de publicaciones de la cuenta
#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub quota: i64,
    pub total_items: i64,
    pub available: i64,
    pub site_id: String,
}

/// Filtros del listado de logs
#[derive(Debug, Default, Deserialize)]
pub struct SyncLogFilters {
    pub action: Option<MlSyncAction>,
    pub success: Option<bool>,
}

/// Response de log de sincronización
#[derive(Debug, Serialize)]
pub struct SyncLogResponse {
    pub id: String,
    pub action: MlSyncAction,
    pub publication_id: Option<String>,
    pub vehiculo_id: Option<String>,
    pub user_id: Option<String>,
    pub request_data: Option<serde_json::Value>,
    pub response_data: Option<serde_json::Value>,
    pub success: bool,
    pub error_message: String,
    pub created_at: DateTime<Utc>,
}

impl From<MlSyncLog> for SyncLogResponse {
    fn from(log: MlSyncLog) -> Self {
        Self {
            id: log.id.to_string(),
            action: log.action,
            publication_id: log.publication_id.map(|p| p.to_string()),
            vehiculo_id: log.vehiculo_id.map(|v| v.to_string()),
            user_id: log.user_id.map(|u| u.to_string()),
            request_data: log.request_data,
            response_data: log.response_data,
            success: log.success,
            error_message: log.error_message,
            created_at: log.created_at,
        }
    }
}
