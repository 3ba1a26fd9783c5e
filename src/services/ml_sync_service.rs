//! Sincronización de publicaciones con MercadoLibre
//!
//! Orquesta el import del listado del vendedor, el matching por patente
//! contra el inventario local, la publicación de vehículos y los cambios
//! de estado. Toda operación queda registrada en el log append-only.
//!
//! Regla central: una respuesta no exitosa de la API nunca muta el
//! estado local de la publicación ni del vehículo; solo se registra el
//! error de sincronización.

use chrono::{Duration, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::dto::mercadolibre_dto::{
    ConnectionStatusResponse, QuotaResponse, SyncResultResponse,
};
use crate::dto::vehiculo_dto::PublicarMlRequest;
use crate::models::mercadolibre::{MlPublication, MlPublicationStatus, MlSyncAction};
use crate::models::parametro::TipoParametro;
use crate::models::vehiculo::Vehiculo;
use crate::repositories::mercadolibre_repository::{
    MercadoLibreRepository, UpsertPublicationData,
};
use crate::repositories::parametro_repository::ParametroRepository;
use crate::repositories::vehiculo_repository::VehiculoRepository;
use crate::services::ml_client::MlClient;
use crate::utils::errors::AppError;
use crate::utils::patente::{extraer_patente_de_titulo, normalizar_patente};

/// Atributos de la API donde puede venir la patente
const PLATE_ATTRIBUTE_IDS: [&str; 3] = ["LICENSE_PLATE", "VEHICLE_LICENSE_PLATE", "PLATE"];

pub struct MlSyncService {
    client: MlClient,
    repo: MercadoLibreRepository,
    vehiculos: VehiculoRepository,
    parametros: ParametroRepository,
    config: EnvironmentConfig,
}

impl MlSyncService {
    pub fn new(pool: PgPool, config: EnvironmentConfig, http: reqwest::Client) -> Self {
        Self {
            client: MlClient::new(http, config.clone(), MercadoLibreRepository::new(pool.clone())),
            repo: MercadoLibreRepository::new(pool.clone()),
            vehiculos: VehiculoRepository::new(pool.clone()),
            parametros: ParametroRepository::new(pool),
            config,
        }
    }

    // =========================================================================
    // CONEXIÓN DE CUENTA
    // =========================================================================

    pub fn client(&self) -> &MlClient {
        &self.client
    }

    /// Completa el flujo OAuth2: intercambia el code, consulta la cuenta
    /// y persiste la credencial.
    pub async fn connect_account(
        &self,
        code: &str,
        user_id: Uuid,
    ) -> Result<ConnectionStatusResponse, AppError> {
        let tokens = self.client.exchange_code_for_token(code).await?;
        let account = self.client.get_user_info(&tokens.access_token).await?;

        // Una sola cuenta activa a la vez
        self.repo
            .deactivate_other_credentials(&account.id.to_string())
            .await?;

        let credential = self
            .repo
            .upsert_credential(
                user_id,
                &account.id.to_string(),
                &account.nickname,
                &tokens.access_token,
                &tokens.refresh_token,
                Utc::now() + Duration::seconds(tokens.expires_in),
                &tokens.scope,
            )
            .await?;

        info!("🔗 Cuenta de MercadoLibre conectada: {}", credential.ml_nickname);

        Ok(Self::status_from_credential(&credential))
    }

    pub async fn disconnect_account(&self) -> Result<(), AppError> {
        let credential = self
            .repo
            .find_active_credential()
            .await?
            .ok_or_else(|| AppError::NotFound("No hay cuenta conectada".to_string()))?;

        self.repo.deactivate_credential(credential.id).await?;
        info!("🔌 Cuenta de MercadoLibre desconectada: {}", credential.ml_nickname);

        Ok(())
    }

    pub async fn connection_status(&self) -> Result<ConnectionStatusResponse, AppError> {
        match self.repo.find_latest_credential().await? {
            Some(credential) => {
                // Aprovecha la consulta para renovar un token por vencer
                if credential.is_active && credential.needs_refresh() {
                    match self.client.refresh_credential(&credential).await {
                        Ok(refreshed) => return Ok(Self::status_from_credential(&refreshed)),
                        Err(e) => warn!("⚠️ No se pudo renovar el token: {}", e),
                    }
                }
                Ok(Self::status_from_credential(&credential))
            }
            None => Ok(ConnectionStatusResponse::disconnected()),
        }
    }

    fn status_from_credential(
        credential: &crate::models::mercadolibre::MlCredential,
    ) -> ConnectionStatusResponse {
        ConnectionStatusResponse {
            connected: credential.is_active,
            ml_user_id: Some(credential.ml_user_id.clone()),
            ml_nickname: Some(credential.ml_nickname.clone()),
            is_active: credential.is_active,
            token_expires_at: Some(credential.expires_at),
            token_expired: credential.is_token_expired(),
            needs_reauthorization: !credential.is_active,
            connected_at: Some(credential.created_at),
        }
    }

    // =========================================================================
    // IMPORT Y MATCHING
    // =========================================================================

    /// Importa todas las publicaciones de la cuenta y las matchea por
    /// patente contra el inventario local.
    pub async fn sync_publications(&self, user_id: Uuid) -> Result<SyncResultResponse, AppError> {
        let credential = self.client.ensure_valid_credential().await?;
        let items = match self.fetch_all_items(&credential.ml_user_id).await {
            Ok(items) => items,
            Err(e) => {
                let message = e.to_string();
                self.repo
                    .insert_sync_log(
                        MlSyncAction::Import,
                        None,
                        None,
                        Some(user_id),
                        None,
                        None,
                        false,
                        &message,
                    )
                    .await?;
                return Err(e);
            }
        };

        let mut imported = 0u32;
        let mut updated = 0u32;
        let mut linked = 0u32;
        let mut failed = 0u32;

        for item in &items {
            let Some(data) = Self::parse_item(item) else {
                warn!("⚠️ Publicación sin datos mínimos, se saltea: {}", item["id"]);
                continue;
            };

            match self.import_item(&data).await {
                Ok((is_new, got_linked)) => {
                    if is_new {
                        imported += 1;
                    } else {
                        updated += 1;
                    }
                    if got_linked {
                        linked += 1;
                    }
                }
                Err(e) => {
                    // Un item fallido no corta el import del resto
                    failed += 1;
                    let message = e.to_string();
                    warn!("⚠️ No se pudo importar {}: {}", data.ml_item_id, message);
                    self.repo
                        .insert_sync_log(
                            MlSyncAction::Import,
                            None,
                            None,
                            Some(user_id),
                            Some(json!({ "ml_item_id": data.ml_item_id })),
                            None,
                            false,
                            &message,
                        )
                        .await?;
                }
            }
        }

        let result = SyncResultResponse {
            imported,
            updated,
            linked,
            total: items.len() as u32,
        };

        self.repo
            .insert_sync_log(
                MlSyncAction::Import,
                None,
                None,
                Some(user_id),
                None,
                Some(json!({
                    "imported": result.imported,
                    "updated": result.updated,
                    "linked": result.linked,
                    "failed": failed,
                    "total": result.total,
                })),
                true,
                "",
            )
            .await?;

        info!(
            "✅ Sincronización completa: {} importadas, {} actualizadas, {} vinculadas, {} fallidas",
            imported, updated, linked, failed
        );

        Ok(result)
    }

    /// Importa un item ya parseado: upsert por ml_item_id y matching por
    /// patente. Devuelve (es_nueva, quedó_vinculada).
    async fn import_item(&self, data: &UpsertPublicationData) -> Result<(bool, bool), AppError> {
        let previous = self.repo.find_publication_by_ml_item_id(&data.ml_item_id).await?;
        let was_linked = previous.as_ref().map(|p| p.is_linked()).unwrap_or(false);

        // Matching por patente solo cuando todavía no hay vínculo
        let matched_vehiculo = if was_linked {
            None
        } else {
            self.resolve_matched_vehiculo(data).await?
        };

        let (publication, is_new) = self
            .repo
            .upsert_publication(data, matched_vehiculo.as_ref().map(|v| v.id))
            .await?;

        let got_linked = match matched_vehiculo {
            Some(vehiculo) => {
                info!(
                    "🔗 Publicación {} vinculada al vehículo {} por patente {}",
                    publication.ml_item_id, vehiculo.patente, data.patente_ml
                );
                self.reflect_on_vehiculo(&publication, vehiculo.id).await?;
                true
            }
            None => false,
        };

        Ok((is_new, got_linked))
    }

    /// Resuelve el vehículo a vincular por patente. Un vehículo admite una
    /// sola publicación vinculada: si ya tiene otra, esta queda sin vincular.
    async fn resolve_matched_vehiculo(
        &self,
        data: &UpsertPublicationData,
    ) -> Result<Option<Vehiculo>, AppError> {
        if data.patente_ml.is_empty() {
            return Ok(None);
        }

        let Some(vehiculo) = self.vehiculos.find_by_patente(&data.patente_ml).await? else {
            return Ok(None);
        };

        if let Some(occupied) = self.repo.find_publication_by_vehiculo(vehiculo.id).await? {
            if occupied.ml_item_id != data.ml_item_id {
                warn!(
                    "⚠️ El vehículo {} ya está vinculado a {}, {} queda sin vincular",
                    vehiculo.patente, occupied.ml_item_id, data.ml_item_id
                );
                return Ok(None);
            }
        }

        Ok(Some(vehiculo))
    }

    async fn fetch_all_items(&self, ml_user_id: &str) -> Result<Vec<serde_json::Value>, AppError> {
        let item_ids = self.client.get_all_user_item_ids(ml_user_id).await?;
        self.client.get_items_details(&item_ids).await
    }

    /// Extrae los campos persistibles de un item crudo de la API.
    fn parse_item(item: &serde_json::Value) -> Option<UpsertPublicationData> {
        let ml_item_id = item["id"].as_str()?.to_string();
        let ml_title = item["title"].as_str().unwrap_or("").to_string();
        let ml_status = item["status"]
            .as_str()
            .and_then(MlPublicationStatus::from_str)
            .unwrap_or(MlPublicationStatus::Inactive);
        let ml_price = item["price"]
            .as_f64()
            .and_then(Decimal::from_f64)
            .unwrap_or_default();

        let attr = |id: &str| -> Option<String> {
            item["attributes"].as_array()?.iter().find_map(|a| {
                if a["id"].as_str() == Some(id) {
                    a["value_name"].as_str().map(str::to_string)
                } else {
                    None
                }
            })
        };

        // Patente: primero los atributos, después el título
        let patente_ml = PLATE_ATTRIBUTE_IDS
            .iter()
            .find_map(|id| attr(id))
            .map(|p| normalizar_patente(&p))
            .or_else(|| extraer_patente_de_titulo(&ml_title))
            .unwrap_or_default();

        let anio_ml = attr("VEHICLE_YEAR").and_then(|v| v.trim().parse::<i32>().ok());
        let km_ml = attr("KILOMETERS").and_then(|v| {
            let digits: String = v.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse::<i32>().ok()
        });

        Some(UpsertPublicationData {
            ml_item_id,
            ml_title,
            ml_status,
            ml_price,
            ml_currency: item["currency_id"].as_str().unwrap_or("ARS").to_string(),
            ml_permalink: item["permalink"].as_str().unwrap_or("").to_string(),
            ml_thumbnail: item["thumbnail"].as_str().unwrap_or("").to_string(),
            ml_category_id: item["category_id"].as_str().unwrap_or("").to_string(),
            ml_listing_type: item["listing_type_id"].as_str().unwrap_or("").to_string(),
            patente_ml,
            marca_ml: attr("BRAND").unwrap_or_default(),
            modelo_ml: attr("MODEL").unwrap_or_default(),
            anio_ml,
            km_ml,
            created_from_system: false,
        })
    }

    /// Refleja el estado de la publicación en los campos espejo del vehículo.
    async fn reflect_on_vehiculo(
        &self,
        publication: &MlPublication,
        vehiculo_id: Uuid,
    ) -> Result<(), AppError> {
        let publicado = publication.ml_status == MlPublicationStatus::Active;
        self.vehiculos
            .update_ml_fields(
                vehiculo_id,
                publicado,
                Some(&publication.ml_item_id),
                publication.ml_status.as_str(),
                "",
                &publication.ml_permalink,
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // PUBLICAR VEHÍCULO
    // =========================================================================

    /// Publica un vehículo del inventario en MercadoLibre.
    pub async fn publish_vehicle(
        &self,
        vehiculo_id: Uuid,
        request: &PublicarMlRequest,
        user_id: Uuid,
    ) -> Result<MlPublication, AppError> {
        let vehiculo = self
            .vehiculos
            .find_active_by_id(vehiculo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if !vehiculo.disponible() {
            return Err(AppError::Conflict(
                "Solo se pueden publicar vehículos disponibles".to_string(),
            ));
        }
        if let Some(existing) = self.repo.find_publication_by_vehiculo(vehiculo_id).await? {
            if existing.ml_status != MlPublicationStatus::Closed {
                return Err(AppError::Conflict(format!(
                    "El vehículo ya tiene la publicación {} activa",
                    existing.ml_item_id
                )));
            }
        }

        let payload = self.build_item_payload(&vehiculo, request).await?;

        match self.client.create_item(&payload).await {
            Ok(response) => {
                let mut data = Self::parse_item(&response).ok_or_else(|| {
                    AppError::ExternalApi("MercadoLibre devolvió un item ilegible".to_string())
                })?;
                data.created_from_system = true;
                data.patente_ml = vehiculo.patente.clone();

                let (publication, _) =
                    self.repo.upsert_publication(&data, Some(vehiculo_id)).await?;
                self.reflect_on_vehiculo(&publication, vehiculo_id).await?;

                self.repo
                    .insert_sync_log(
                        MlSyncAction::Create,
                        Some(publication.id),
                        Some(vehiculo_id),
                        Some(user_id),
                        Some(payload),
                        Some(response),
                        true,
                        "",
                    )
                    .await?;

                info!("🚀 Vehículo {} publicado como {}", vehiculo.patente, publication.ml_item_id);
                Ok(publication)
            }
            Err(e) => {
                let message = e.to_string();
                self.vehiculos.set_ml_error(vehiculo_id, &message).await?;
                self.repo
                    .insert_sync_log(
                        MlSyncAction::Create,
                        None,
                        Some(vehiculo_id),
                        Some(user_id),
                        Some(payload),
                        None,
                        false,
                        &message,
                    )
                    .await?;
                Err(e)
            }
        }
    }

    /// Arma el payload del item a partir del vehículo y sus parámetros.
    async fn build_item_payload(
        &self,
        vehiculo: &Vehiculo,
        request: &PublicarMlRequest,
    ) -> Result<serde_json::Value, AppError> {
        let marca = self
            .parametros
            .find_by_id(TipoParametro::Marcas, vehiculo.marca_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Marca inexistente".to_string()))?;
        let modelo = self
            .parametros
            .find_modelo_by_id(vehiculo.modelo_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Modelo inexistente".to_string()))?;
        let combustible = self
            .parametros
            .find_by_id(TipoParametro::Combustibles, vehiculo.combustible_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Combustible inexistente".to_string()))?;
        let caja = self
            .parametros
            .find_by_id(TipoParametro::Cajas, vehiculo.caja_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Caja inexistente".to_string()))?;
        let estado = self
            .parametros
            .find_by_id(TipoParametro::Estados, vehiculo.estado_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Estado inexistente".to_string()))?;

        let mut titulo = request.titulo.clone().unwrap_or_else(|| {
            let mut t = format!("{} {}", marca.nombre, modelo.nombre);
            if !vehiculo.version.is_empty() {
                t.push(' ');
                t.push_str(&vehiculo.version);
            }
            format!("{} {}", t, vehiculo.anio)
        });
        // La patente en el título permite re-matchear en futuros imports
        if !titulo.to_uppercase().contains(vehiculo.patente.as_str()) {
            titulo = format!("{} {}", titulo, vehiculo.patente);
        }

        let puertas = request
            .puertas
            .clone()
            .unwrap_or_else(|| vehiculo.tipo_vehiculo.puertas_default().to_string());

        let estado_nombre = estado.nombre.to_lowercase();
        let condition = if estado_nombre.contains("nuevo") || estado_nombre.contains("0km") {
            "new"
        } else {
            "used"
        };

        // MercadoLibre acepta hasta 15 fotos por publicación
        let pictures: Vec<serde_json::Value> = self
            .vehiculos
            .list_imagenes(vehiculo.id)
            .await?
            .into_iter()
            .take(crate::models::vehiculo::MAX_IMAGENES_POR_VEHICULO as usize)
            .map(|img| json!({ "source": self.absolute_media_url(&img.url) }))
            .collect();

        let mut attributes = vec![
            json!({ "id": "BRAND", "value_name": marca.nombre }),
            json!({ "id": "MODEL", "value_name": modelo.nombre }),
            json!({ "id": "DOORS", "value_name": puertas }),
            json!({ "id": "VEHICLE_YEAR", "value_name": vehiculo.anio.to_string() }),
            json!({ "id": "KILOMETERS", "value_name": format!("{} km", vehiculo.km) }),
            json!({ "id": "FUEL_TYPE", "value_name": combustible.nombre }),
            json!({ "id": "TRANSMISSION", "value_name": caja.nombre }),
            json!({ "id": "COLOR", "value_name": vehiculo.color }),
        ];
        if !vehiculo.version.is_empty() {
            attributes.push(json!({ "id": "TRIM", "value_name": vehiculo.version }));
        }

        Ok(json!({
            "title": titulo,
            "category_id": vehiculo.tipo_vehiculo.ml_category_id(),
            "price": vehiculo.precio,
            "currency_id": "ARS",
            "available_quantity": 1,
            "buying_mode": "classified",
            "listing_type_id": "free",
            "condition": condition,
            "pictures": pictures,
            "attributes": attributes,
        }))
    }

    /// Las imágenes guardadas con ruta relativa se sirven desde el CDN propio.
    fn absolute_media_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.media_base_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        }
    }

    // =========================================================================
    // CAMBIOS DE ESTADO
    // =========================================================================

    /// Cambia el estado remoto de una publicación y, solo si la API lo
    /// confirma, refleja el cambio localmente.
    pub async fn change_publication_status(
        &self,
        publication_id: Uuid,
        status: MlPublicationStatus,
        user_id: Uuid,
    ) -> Result<MlPublication, AppError> {
        if !matches!(
            status,
            MlPublicationStatus::Active | MlPublicationStatus::Paused | MlPublicationStatus::Closed
        ) {
            return Err(AppError::BadRequest(
                "Solo se puede pasar a active, paused o closed".to_string(),
            ));
        }

        let publication = self
            .repo
            .find_publication_by_id(publication_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Publicación no encontrada".to_string()))?;

        let action = MlSyncAction::from_status(status);

        match self
            .client
            .update_item_status(&publication.ml_item_id, status.as_str())
            .await
        {
            Ok(response) => {
                let mut updated = self.repo.update_publication_status(publication_id, status).await?;
                if let Some(vehiculo_id) = updated.vehiculo_id {
                    self.reflect_on_vehiculo(&updated, vehiculo_id).await?;
                    // Cerrar desvincula: el vehículo queda libre para republicar
                    if status == MlPublicationStatus::Closed {
                        updated = self.repo.unlink_publication(publication_id).await?;
                    }
                }

                self.repo
                    .insert_sync_log(
                        action,
                        Some(publication_id),
                        publication.vehiculo_id,
                        Some(user_id),
                        Some(json!({ "status": status.as_str() })),
                        Some(response),
                        true,
                        "",
                    )
                    .await?;

                Ok(updated)
            }
            Err(e) => {
                // La API no confirmó: el estado local queda intacto
                let message = e.to_string();
                self.repo
                    .set_publication_sync_error(publication_id, &message)
                    .await?;
                self.repo
                    .insert_sync_log(
                        action,
                        Some(publication_id),
                        publication.vehiculo_id,
                        Some(user_id),
                        Some(json!({ "status": status.as_str() })),
                        None,
                        false,
                        &message,
                    )
                    .await?;
                Err(e)
            }
        }
    }

    /// Cambio de estado pedido desde el vehículo (pausar-ml / cerrar-ml).
    pub async fn change_status_by_vehiculo(
        &self,
        vehiculo_id: Uuid,
        status: MlPublicationStatus,
        user_id: Uuid,
    ) -> Result<MlPublication, AppError> {
        let publication = self
            .repo
            .find_publication_by_vehiculo(vehiculo_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("El vehículo no tiene publicación vinculada".to_string())
            })?;

        self.change_publication_status(publication.id, status, user_id).await
    }

    // =========================================================================
    // QUOTA
    // =========================================================================

    pub async fn quota(&self) -> Result<QuotaResponse, AppError> {
        let credential = self.client.ensure_valid_credential().await?;
        let payload = self.client.get_user_quota(&credential.ml_user_id).await?;

        let total_items = payload["paging"]["total"].as_i64().unwrap_or(0);
        // El plan gratuito de clasificados permite una cantidad fija
        let quota = payload["available_quota"].as_i64().unwrap_or(10);

        Ok(QuotaResponse {
            quota,
            total_items,
            available: (quota - total_items).max(0),
            site_id: "MLA".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_base() -> serde_json::Value {
        json!({
            "id": "MLA123456789",
            "title": "Ford Focus 2020",
            "status": "active",
            "price": 10500000.0,
            "currency_id": "ARS",
            "permalink": "https://auto.mercadolibre.com.ar/MLA-123456789",
            "thumbnail": "https://http2.mlstatic.com/thumb.jpg",
            "category_id": "MLA1744",
            "listing_type_id": "free",
            "attributes": []
        })
    }

    #[test]
    fn test_parse_item_basico() {
        let data = MlSyncService::parse_item(&item_base()).unwrap();
        assert_eq!(data.ml_item_id, "MLA123456789");
        assert_eq!(data.ml_status, MlPublicationStatus::Active);
        assert_eq!(data.ml_currency, "ARS");
        assert!(!data.created_from_system);
    }

    #[test]
    fn test_parse_item_patente_desde_atributo() {
        let mut item = item_base();
        item["attributes"] = json!([
            { "id": "LICENSE_PLATE", "value_name": "ab 123 cd" },
            { "id": "BRAND", "value_name": "Ford" },
            { "id": "KILOMETERS", "value_name": "45000 km" },
            { "id": "VEHICLE_YEAR", "value_name": "2020" }
        ]);

        let data = MlSyncService::parse_item(&item).unwrap();
        assert_eq!(data.patente_ml, "AB123CD");
        assert_eq!(data.marca_ml, "Ford");
        assert_eq!(data.km_ml, Some(45000));
        assert_eq!(data.anio_ml, Some(2020));
    }

    #[test]
    fn test_parse_item_patente_desde_titulo() {
        let mut item = item_base();
        item["title"] = json!("Ford Focus AB123CD impecable");

        let data = MlSyncService::parse_item(&item).unwrap();
        assert_eq!(data.patente_ml, "AB123CD");
    }

    #[test]
    fn test_parse_item_sin_patente() {
        let data = MlSyncService::parse_item(&item_base()).unwrap();
        assert!(data.patente_ml.is_empty());
    }

    #[test]
    fn test_parse_item_estado_desconocido() {
        let mut item = item_base();
        item["status"] = json!("algo_raro");

        let data = MlSyncService::parse_item(&item).unwrap();
        assert_eq!(data.ml_status, MlPublicationStatus::Inactive);
    }

    #[test]
    fn test_parse_item_sin_id_se_descarta() {
        let mut item = item_base();
        item.as_object_mut().unwrap().remove("id");
        assert!(MlSyncService::parse_item(&item).is_none());
    }

    // =========================================================================
    // TESTS CONTRA LA BASE
    // =========================================================================

    use crate::dto::mercadolibre_dto::SyncLogFilters;
    use crate::utils::test_support;

    fn armar_servicio(pool: &PgPool, api_base: &str) -> MlSyncService {
        MlSyncService::new(
            pool.clone(),
            test_support::config_de_prueba(api_base),
            reqwest::Client::new(),
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_vehiculo_ocupado_queda_sin_vincular(pool: PgPool) {
        // La API no se toca en el import de un item ya parseado
        let servicio = armar_servicio(&pool, "http://127.0.0.1:1");
        let usuario = test_support::crear_usuario(&pool).await;
        let vehiculo = test_support::crear_vehiculo(&pool, usuario.id, "AB123CD").await;

        let (_, vinculada) = servicio
            .import_item(&test_support::datos_publicacion("MLA100", "AB123CD"))
            .await
            .unwrap();
        assert!(vinculada);

        // Misma patente en otra publicación: el vehículo ya está ocupado
        let (es_nueva, vinculada) = servicio
            .import_item(&test_support::datos_publicacion("MLA200", "AB123CD"))
            .await
            .unwrap();
        assert!(es_nueva);
        assert!(!vinculada);

        let repo = MercadoLibreRepository::new(pool.clone());
        let primera = repo
            .find_publication_by_ml_item_id("MLA100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(primera.vehiculo_id, Some(vehiculo.id));

        let segunda = repo
            .find_publication_by_ml_item_id("MLA200")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(segunda.vehiculo_id, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cerrar_desvincula_el_vehiculo(pool: PgPool) {
        let api = test_support::servidor_api(
            axum::http::StatusCode::OK,
            json!({ "id": "MLA100", "status": "closed" }),
        )
        .await;
        let servicio = armar_servicio(&pool, &api);

        let usuario = test_support::crear_usuario(&pool).await;
        let vehiculo = test_support::crear_vehiculo(&pool, usuario.id, "AB123CD").await;
        test_support::conectar_credencial(&pool, usuario.id).await;

        let repo = MercadoLibreRepository::new(pool.clone());
        let (publicacion, _) = repo
            .upsert_publication(
                &test_support::datos_publicacion("MLA100", "AB123CD"),
                Some(vehiculo.id),
            )
            .await
            .unwrap();

        let cerrada = servicio
            .change_publication_status(publicacion.id, MlPublicationStatus::Closed, usuario.id)
            .await
            .unwrap();

        assert_eq!(cerrada.ml_status, MlPublicationStatus::Closed);
        assert_eq!(cerrada.vehiculo_id, None);

        let espejo = VehiculoRepository::new(pool.clone())
            .find_by_id(vehiculo.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!espejo.publicado_en_ml);
        assert_eq!(espejo.ml_estado, "closed");

        // El vehículo queda libre para una publicación nueva
        let (nueva, _) = repo
            .upsert_publication(
                &test_support::datos_publicacion("MLA200", "AB123CD"),
                Some(vehiculo.id),
            )
            .await
            .unwrap();
        assert_eq!(nueva.vehiculo_id, Some(vehiculo.id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_error_de_api_no_muta_el_estado_local(pool: PgPool) {
        let api = test_support::servidor_api(
            axum::http::StatusCode::BAD_GATEWAY,
            json!({ "message": "internal_error" }),
        )
        .await;
        let servicio = armar_servicio(&pool, &api);

        let usuario = test_support::crear_usuario(&pool).await;
        test_support::conectar_credencial(&pool, usuario.id).await;

        let repo = MercadoLibreRepository::new(pool.clone());
        let (publicacion, _) = repo
            .upsert_publication(&test_support::datos_publicacion("MLA100", ""), None)
            .await
            .unwrap();

        let resultado = servicio
            .change_publication_status(publicacion.id, MlPublicationStatus::Paused, usuario.id)
            .await;
        assert!(matches!(resultado, Err(AppError::ExternalApi(_))));

        let intacta = repo
            .find_publication_by_id(publicacion.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(intacta.ml_status, MlPublicationStatus::Active);
        assert!(!intacta.sync_error.is_empty());

        let fallidos = repo
            .list_sync_logs(&SyncLogFilters {
                action: Some(MlSyncAction::Pause),
                success: Some(false),
            })
            .await
            .unwrap();
        assert_eq!(fallidos.len(), 1);
    }
}
