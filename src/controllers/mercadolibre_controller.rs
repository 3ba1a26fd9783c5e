use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::dto::common::Paginated;
use crate::dto::mercadolibre_dto::{
    AuthUrlResponse, ConnectionStatusResponse, LinkPublicationRequest, OAuthCallbackParams,
    PublicationFilters, PublicationResponse, QuotaResponse, StatisticsResponse, SyncLogFilters,
    SyncLogResponse, SyncResultResponse,
};
use crate::dto::vehiculo_dto::PublicarMlRequest;
use crate::models::mercadolibre::MlPublicationStatus;
use crate::repositories::mercadolibre_repository::MercadoLibreRepository;
use crate::repositories::usuario_repository::UsuarioRepository;
use crate::repositories::vehiculo_repository::VehiculoRepository;
use crate::services::ml_sync_service::MlSyncService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct MercadoLibreController {
    state: AppState,
    service: MlSyncService,
    repository: MercadoLibreRepository,
    vehiculos: VehiculoRepository,
}

impl MercadoLibreController {
    pub fn new(state: AppState) -> Self {
        Self {
            service: MlSyncService::new(
                state.pool.clone(),
                state.config.clone(),
                state.http_client.clone(),
            ),
            repository: MercadoLibreRepository::new(state.pool.clone()),
            vehiculos: VehiculoRepository::new(state.pool.clone()),
            state,
        }
    }

    // =========================================================================
    // CONEXIÓN
    // =========================================================================

    /// Emite la URL de autorización con un state de un solo uso.
    pub async fn auth_url(&self, user_id: Uuid) -> Result<AuthUrlResponse, AppError> {
        let state: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        self.state.store_oauth_state(state.clone(), user_id).await;

        Ok(AuthUrlResponse {
            auth_url: self.service.client().build_authorization_url(&state),
            state,
        })
    }

    /// Callback OAuth2. Devuelve la URL del frontend a la que redirigir.
    pub async fn callback(&self, params: OAuthCallbackParams) -> Result<String, AppError> {
        let frontend = &self.state.config.frontend_url;
        let error_url = |flag: &str| format!("{}/admin/mercadolibre?error={}", frontend, flag);

        if params.error.is_some() {
            return Ok(error_url("authorization_denied"));
        }

        let Some(code) = params.code else {
            return Ok(error_url("no_code"));
        };

        // El state identifica al usuario que inició el flujo. Si no
        // sobrevivió (expiró o el proceso se reinició), se cae al primer
        // usuario activo: la cuenta de MercadoLibre es única por sistema.
        let user_id = match params.state {
            Some(ref s) => self.state.take_oauth_state(s).await.map(|p| p.user_id),
            None => None,
        };

        let user_id = match user_id {
            Some(id) => id,
            None => {
                let fallback = UsuarioRepository::new(self.state.pool.clone())
                    .find_first_active()
                    .await?;
                match fallback {
                    Some(usuario) => usuario.id,
                    None => return Ok(error_url("invalid_state")),
                }
            }
        };

        match self.service.connect_account(&code, user_id).await {
            Ok(_) => Ok(format!("{}/admin/mercadolibre?connected=true", frontend)),
            Err(e) => {
                tracing::error!("❌ Falló el intercambio del code OAuth: {}", e);
                Ok(error_url("token_exchange_failed"))
            }
        }
    }

    pub async fn status(&self) -> Result<ConnectionStatusResponse, AppError> {
        self.service.connection_status().await
    }

    pub async fn disconnect(&self) -> Result<(), AppError> {
        self.service.disconnect_account().await
    }

    // =========================================================================
    // SINCRONIZACIÓN Y PUBLICACIONES
    // =========================================================================

    pub async fn sync(&self, user_id: Uuid) -> Result<SyncResultResponse, AppError> {
        self.service.sync_publications(user_id).await
    }

    pub async fn list_publications(
        &self,
        filters: PublicationFilters,
    ) -> Result<Paginated<PublicationResponse>, AppError> {
        let (publications, count) = self.repository.list_publications(&filters).await?;

        Ok(Paginated {
            count,
            results: publications
                .into_iter()
                .map(PublicationResponse::from)
                .collect(),
        })
    }

    pub async fn get_publication(&self, id: Uuid) -> Result<PublicationResponse, AppError> {
        let publication = self
            .repository
            .find_publication_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Publicación no encontrada".to_string()))?;

        Ok(PublicationResponse::from(publication))
    }

    /// Vinculación manual de una publicación importada a un vehículo.
    pub async fn link_publication(
        &self,
        id: Uuid,
        request: LinkPublicationRequest,
    ) -> Result<PublicationResponse, AppError> {
        let vehiculo = self
            .vehiculos
            .find_active_by_id(request.vehiculo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let publication = self.repository.link_publication(id, vehiculo.id).await?;

        self.vehiculos
            .update_ml_fields(
                vehiculo.id,
                publication.ml_status == MlPublicationStatus::Active,
                Some(&publication.ml_item_id),
                publication.ml_status.as_str(),
                "",
                &publication.ml_permalink,
            )
            .await?;

        Ok(PublicationResponse::from(publication))
    }

    pub async fn unlink_publication(&self, id: Uuid) -> Result<PublicationResponse, AppError> {
        let publication = self
            .repository
            .find_publication_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Publicación no encontrada".to_string()))?;

        // Limpiar los campos espejo antes de soltar el vínculo
        if let Some(vehiculo_id) = publication.vehiculo_id {
            self.vehiculos
                .update_ml_fields(vehiculo_id, false, None, "", "", "")
                .await?;
        }

        let publication = self.repository.unlink_publication(id).await?;
        Ok(PublicationResponse::from(publication))
    }

    pub async fn change_status(
        &self,
        id: Uuid,
        status: MlPublicationStatus,
        user_id: Uuid,
    ) -> Result<PublicationResponse, AppError> {
        let publication = self.service.change_publication_status(id, status, user_id).await?;
        Ok(PublicationResponse::from(publication))
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse, AppError> {
        self.repository.publication_statistics().await
    }

    pub async fn quota(&self) -> Result<QuotaResponse, AppError> {
        self.service.quota().await
    }

    pub async fn sync_logs(&self, filters: SyncLogFilters) -> Result<Vec<SyncLogResponse>, AppError> {
        let logs = self.repository.list_sync_logs(&filters).await?;
        Ok(logs.into_iter().map(SyncLogResponse::from).collect())
    }

    // =========================================================================
    // ACCIONES DESDE EL VEHÍCULO
    // =========================================================================

    pub async fn publicar_vehiculo(
        &self,
        vehiculo_id: Uuid,
        request: PublicarMlRequest,
        user_id: Uuid,
    ) -> Result<PublicationResponse, AppError> {
        let publication = self
            .service
            .publish_vehicle(vehiculo_id, &request, user_id)
            .await?;
        Ok(PublicationResponse::from(publication))
    }

    pub async fn pausar_vehiculo(
        &self,
        vehiculo_id: Uuid,
        user_id: Uuid,
    ) -> Result<PublicationResponse, AppError> {
        let publication = self
            .service
            .change_status_by_vehiculo(vehiculo_id, MlPublicationStatus::Paused, user_id)
            .await?;
        Ok(PublicationResponse::from(publication))
    }

    pub async fn cerrar_vehiculo(
        &self,
        vehiculo_id: Uuid,
        user_id: Uuid,
    ) -> Result<PublicationResponse, AppError> {
        let publication = self
            .service
            .change_status_by_vehiculo(vehiculo_id, MlPublicationStatus::Closed, user_id)
            .await?;
        Ok(PublicationResponse::from(publication))
    }
}
