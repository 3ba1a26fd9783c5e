//! Cliente HTTP de la API de MercadoLibre
//!
//! Maneja el flujo OAuth2 (authorization code + refresh token) y las
//! llamadas autenticadas. El access token dura 6 horas y el refresh
//! token es de un solo uso, por eso cada renovación persiste el par
//! nuevo antes de devolver el control.

use chrono::{Duration, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::EnvironmentConfig;
use crate::models::mercadolibre::{MlCredential, MlSyncAction};
use crate::repositories::mercadolibre_repository::MercadoLibreRepository;
use crate::utils::errors::AppError;

/// Ítems por página del listado de publicaciones del vendedor
const ITEMS_PAGE_SIZE: u32 = 50;
/// Tamaño de lote del multiget de detalles
const ITEMS_BATCH_SIZE: usize = 20;

/// Response del endpoint de tokens
#[derive(Debug, Deserialize)]
pub struct MlTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
}

/// Datos de la cuenta conectada (/users/me)
#[derive(Debug, Deserialize)]
pub struct MlUserInfo {
    pub id: i64,
    pub nickname: String,
}

pub struct MlClient {
    http: Client,
    config: EnvironmentConfig,
    repo: MercadoLibreRepository,
}

impl MlClient {
    pub fn new(http: Client, config: EnvironmentConfig, repo: MercadoLibreRepository) -> Self {
        Self { http, config, repo }
    }

    // =========================================================================
    // OAUTH2
    // =========================================================================

    /// URL de autorización para redirigir al usuario.
    pub fn build_authorization_url(&self, state: &str) -> String {
        format!(
            "{}/authorization?response_type=code&client_id={}&redirect_uri={}&state={}",
            self.config.ml_auth_base_url,
            urlencoding::encode(&self.config.ml_app_id),
            urlencoding::encode(&self.config.ml_redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Intercambia el authorization code por el primer par de tokens.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<MlTokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.config.ml_api_base_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.ml_app_id),
                ("client_secret", &self.config.ml_secret_key),
                ("code", code),
                ("redirect_uri", &self.config.ml_redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error de red con MercadoLibre: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("❌ Intercambio de code falló ({}): {}", status, body);
            return Err(AppError::ExternalApi(format!(
                "MercadoLibre rechazó el authorization code ({})",
                status
            )));
        }

        response
            .json::<MlTokenResponse>()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta de tokens inválida: {}", e)))
    }

    /// Renueva el access token con el refresh token vigente y persiste
    /// el par nuevo. Si el refresh token fue revocado (invalid_grant),
    /// la credencial se desactiva y hay que reconectar la cuenta.
    pub async fn refresh_credential(
        &self,
        credential: &MlCredential,
    ) -> Result<MlCredential, AppError> {
        info!("🔄 Renovando token de MercadoLibre para {}", credential.ml_nickname);

        let response = self
            .http
            .post(format!("{}/oauth/token", self.config.ml_api_base_url))
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", &self.config.ml_app_id),
                ("client_secret", &self.config.ml_secret_key),
                ("refresh_token", &credential.refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error de red con MercadoLibre: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            let invalid_grant = body.contains("invalid_grant");
            if invalid_grant {
                warn!("⚠️ Refresh token revocado, desactivando credencial {}", credential.id);
                self.repo.deactivate_credential(credential.id).await?;
            }

            self.repo
                .insert_sync_log(
                    MlSyncAction::RefreshToken,
                    None,
                    None,
                    Some(credential.user_id),
                    None,
                    Some(json!({ "status": status.as_u16(), "body": body })),
                    false,
                    "No se pudo renovar el token",
                )
                .await?;

            if invalid_grant {
                return Err(AppError::Unauthorized(
                    "La conexión con MercadoLibre expiró, hay que reconectar la cuenta".to_string(),
                ));
            }
            return Err(AppError::ExternalApi(format!(
                "MercadoLibre rechazó la renovación del token ({})",
                status
            )));
        }

        let tokens: MlTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta de tokens inválida: {}", e)))?;

        let updated = self
            .repo
            .update_credential_tokens(
                credential.id,
                &tokens.access_token,
                &tokens.refresh_token,
                Utc::now() + Duration::seconds(tokens.expires_in),
            )
            .await?;

        self.repo
            .insert_sync_log(
                MlSyncAction::RefreshToken,
                None,
                None,
                Some(credential.user_id),
                None,
                None,
                true,
                "",
            )
            .await?;

        Ok(updated)
    }

    /// Devuelve la credencial activa con un access token utilizable,
    /// renovándolo si está por expirar (ventana de 30 minutos).
    pub async fn ensure_valid_credential(&self) -> Result<MlCredential, AppError> {
        let credential = self
            .repo
            .find_active_credential()
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("No hay cuenta de MercadoLibre conectada".to_string())
            })?;

        if credential.needs_refresh() {
            return self.refresh_credential(&credential).await;
        }

        Ok(credential)
    }

    // =========================================================================
    // LLAMADAS AUTENTICADAS
    // =========================================================================

    /// Ejecuta una llamada autenticada. Ante un 401 renueva el token y
    /// reintenta exactamente una vez.
    async fn authed_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, AppError> {
        let credential = self.ensure_valid_credential().await?;
        let url = format!("{}{}", self.config.ml_api_base_url, path);

        let response = self
            .send_with_token(method.clone(), &url, &credential.access_token, body)
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("⚠️ 401 de MercadoLibre, renovando token y reintentando");
            let refreshed = self.refresh_credential(&credential).await?;
            self.send_with_token(method, &url, &refreshed.access_token, body)
                .await?
        } else {
            response
        };

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta inválida de MercadoLibre: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::ExternalApi(format!(
                "MercadoLibre respondió {}: {}",
                status, payload
            )));
        }

        Ok(payload)
    }

    async fn send_with_token(
        &self,
        method: Method,
        url: &str,
        access_token: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, AppError> {
        let mut request = self.http.request(method, url).bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error de red con MercadoLibre: {}", e)))
    }

    /// Datos de la cuenta autenticada.
    pub async fn get_user_info(&self, access_token: &str) -> Result<MlUserInfo, AppError> {
        let response = self
            .send_with_token(
                Method::GET,
                &format!("{}/users/me", self.config.ml_api_base_url),
                access_token,
                None,
            )
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "No se pudo obtener la cuenta de MercadoLibre ({})",
                response.status()
            )));
        }

        response
            .json::<MlUserInfo>()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Respuesta de /users/me inválida: {}", e)))
    }

    /// IDs de todas las publicaciones del vendedor, paginando de a 50.
    pub async fn get_all_user_item_ids(&self, ml_user_id: &str) -> Result<Vec<String>, AppError> {
        let mut ids = Vec::new();
        let mut offset = 0u32;

        loop {
            let payload = self
                .authed_request(
                    Method::GET,
                    &format!(
                        "/users/{}/items/search?limit={}&offset={}",
                        ml_user_id, ITEMS_PAGE_SIZE, offset
                    ),
                    None,
                )
                .await?;

            let page: Vec<String> = payload["results"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            let total = payload["paging"]["total"].as_u64().unwrap_or(0) as u32;
            let fetched = page.len() as u32;
            ids.extend(page);

            offset += fetched;
            if fetched == 0 || offset >= total {
                break;
            }
        }

        info!("📦 {} publicaciones encontradas en MercadoLibre", ids.len());
        Ok(ids)
    }

    /// Detalles de publicaciones en lotes de 20 (multiget).
    pub async fn get_items_details(
        &self,
        item_ids: &[String],
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let mut items = Vec::with_capacity(item_ids.len());

        for chunk in item_ids.chunks(ITEMS_BATCH_SIZE) {
            let payload = self
                .authed_request(
                    Method::GET,
                    &format!("/items?ids={}&include_attributes=all", chunk.join(",")),
                    None,
                )
                .await?;

            if let Some(results) = payload.as_array() {
                for entry in results {
                    // El multiget envuelve cada item en {code, body}
                    if entry["code"].as_u64() == Some(200) {
                        items.push(entry["body"].clone());
                    }
                }
            }
        }

        Ok(items)
    }

    /// Crea una publicación nueva.
    pub async fn create_item(
        &self,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, AppError> {
        self.authed_request(Method::POST, "/items", Some(payload)).await
    }

    /// Cambia el estado de una publicación (active / paused / closed).
    pub async fn update_item_status(
        &self,
        item_id: &str,
        status: &str,
    ) -> Result<serde_json::Value, AppError> {
        self.authed_request(
            Method::PUT,
            &format!("/items/{}", item_id),
            Some(&json!({ "status": status })),
        )
        .await
    }

    /// Quota de publicaciones disponibles de la cuenta.
    pub async fn get_user_quota(&self, ml_user_id: &str) -> Result<serde_json::Value, AppError> {
        self.authed_request(
            Method::GET,
            &format!("/users/{}/items/search?limit=1", ml_user_id),
            None,
        )
        .await
    }
}
