use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::parametro_dto::{
    CreateModeloRequest, CreateParametroRequest, ModeloFilters, ParametroFilters,
    UpdateParametroRequest,
};
use crate::models::parametro::{Modelo, Parametro, TipoParametro};
use crate::repositories::parametro_repository::ParametroRepository;
use crate::utils::errors::AppError;

pub struct ParametroController {
    repository: ParametroRepository,
}

impl ParametroController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ParametroRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        tipo: TipoParametro,
        filters: ParametroFilters,
    ) -> Result<Vec<Parametro>, AppError> {
        self.repository
            .list(tipo, filters.activo, filters.search.as_deref())
            .await
    }

    pub async fn get(&self, tipo: TipoParametro, id: Uuid) -> Result<Parametro, AppError> {
        self.repository
            .find_by_id(tipo, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parámetro no encontrado".to_string()))
    }

    pub async fn create(
        &self,
        tipo: TipoParametro,
        request: CreateParametroRequest,
    ) -> Result<Parametro, AppError> {
        request.validate()?;
        self.repository
            .create(
                tipo,
                &request.nombre,
                request.activo.unwrap_or(true),
                request.orden.unwrap_or(0),
            )
            .await
    }

    pub async fn update(
        &self,
        tipo: TipoParametro,
        id: Uuid,
        request: UpdateParametroRequest,
    ) -> Result<Parametro, AppError> {
        request.validate()?;
        self.repository
            .update(tipo, id, request.nombre, request.activo, request.orden)
            .await
    }

    pub async fn delete(&self, tipo: TipoParametro, id: Uuid) -> Result<(), AppError> {
        self.repository.delete(tipo, id).await
    }

    // =========================================================================
    // MODELOS
    // =========================================================================

    pub async fn list_modelos(&self, filters: ModeloFilters) -> Result<Vec<Modelo>, AppError> {
        self.repository
            .list_modelos(filters.activo, filters.marca_id, filters.search.as_deref())
            .await
    }

    pub async fn get_modelo(&self, id: Uuid) -> Result<Modelo, AppError> {
        self.repository
            .find_modelo_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Modelo no encontrado".to_string()))
    }

    pub async fn create_modelo(&self, request: CreateModeloRequest) -> Result<Modelo, AppError> {
        request.validate()?;

        // La marca tiene que existir y ser una marca
        self.repository
            .find_by_id(TipoParametro::Marcas, request.marca_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("La marca indicada no existe".to_string()))?;

        self.repository
            .create_modelo(
                request.marca_id,
                &request.nombre,
                request.activo.unwrap_or(true),
                request.orden.unwrap_or(0),
            )
            .await
    }

    pub async fn update_modelo(
        &self,
        id: Uuid,
        request: UpdateParametroRequest,
    ) -> Result<Modelo, AppError> {
        request.validate()?;
        self.repository
            .update_modelo(id, request.nombre, request.activo, request.orden)
            .await
    }

    pub async fn delete_modelo(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.delete_modelo(id).await
    }
}
