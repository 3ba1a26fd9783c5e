use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Paginated;
use crate::dto::vehiculo_dto::{
    CreateImagenRequest, CreateVehiculoRequest, ImagenResponse, UpdateVehiculoRequest,
    VehiculoFilters, VehiculoResponse,
};
use crate::repositories::parametro_repository::ParametroRepository;
use crate::repositories::vehiculo_repository::VehiculoRepository;
use crate::utils::errors::AppError;
use crate::utils::patente::normalizar_patente;

pub struct VehiculoController {
    repository: VehiculoRepository,
    parametros: ParametroRepository,
}

impl VehiculoController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehiculoRepository::new(pool.clone()),
            parametros: ParametroRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        filters: VehiculoFilters,
    ) -> Result<Paginated<VehiculoResponse>, AppError> {
        let (vehiculos, count) = self.repository.list(&filters).await?;

        Ok(Paginated {
            count,
            results: vehiculos.into_iter().map(VehiculoResponse::from).collect(),
        })
    }

    /// Detalle con imágenes incluidas.
    pub async fn get(&self, id: Uuid) -> Result<VehiculoResponse, AppError> {
        let vehiculo = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let imagenes = self.repository.list_imagenes(id).await?;
        Ok(VehiculoResponse::from_vehiculo(vehiculo, Some(imagenes)))
    }

    pub async fn create(
        &self,
        request: CreateVehiculoRequest,
        cargado_por: Uuid,
    ) -> Result<VehiculoResponse, AppError> {
        request.validate()?;

        let patente = normalizar_patente(&request.patente);
        if patente.is_empty() {
            return Err(AppError::BadRequest("La patente es requerida".to_string()));
        }

        // El modelo tiene que pertenecer a la marca elegida
        let modelo = self
            .parametros
            .find_modelo_by_id(request.modelo_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("El modelo indicado no existe".to_string()))?;
        if modelo.marca_id != request.marca_id {
            return Err(AppError::BadRequest(
                "El modelo no pertenece a la marca indicada".to_string(),
            ));
        }

        if let (Some(s1), Some(s2)) = (request.segmento1_id, request.segmento2_id) {
            if s1 == s2 {
                return Err(AppError::BadRequest(
                    "Los segmentos no pueden repetirse".to_string(),
                ));
            }
        }

        let vehiculo = self.repository.create(&request, &patente, cargado_por).await?;
        Ok(VehiculoResponse::from(vehiculo))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehiculoRequest,
    ) -> Result<VehiculoResponse, AppError> {
        request.validate()?;

        let current = self
            .repository
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let vehiculo = self.repository.update(&current, &request).await?;
        Ok(VehiculoResponse::from(vehiculo))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repository.soft_delete(id).await
    }

    pub async fn restore(&self, id: Uuid) -> Result<VehiculoResponse, AppError> {
        let vehiculo = self.repository.restore(id).await?;
        Ok(VehiculoResponse::from(vehiculo))
    }

    pub async fn marcar_vendido(&self, id: Uuid, vendido: bool) -> Result<VehiculoResponse, AppError> {
        let vehiculo = self.repository.set_vendido(id, vendido).await?;
        Ok(VehiculoResponse::from(vehiculo))
    }

    /// Alterna el estado de reserva.
    pub async fn marcar_reservado(&self, id: Uuid) -> Result<VehiculoResponse, AppError> {
        let current = self
            .repository
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let vehiculo = self.repository.set_reservado(id, !current.reservado).await?;
        Ok(VehiculoResponse::from(vehiculo))
    }

    // =========================================================================
    // IMÁGENES
    // =========================================================================

    pub async fn list_imagenes(&self, vehiculo_id: Uuid) -> Result<Vec<ImagenResponse>, AppError> {
        self.ensure_exists(vehiculo_id).await?;

        let imagenes = self.repository.list_imagenes(vehiculo_id).await?;
        Ok(imagenes.into_iter().map(ImagenResponse::from).collect())
    }

    pub async fn add_imagen(
        &self,
        vehiculo_id: Uuid,
        request: CreateImagenRequest,
    ) -> Result<ImagenResponse, AppError> {
        request.validate()?;
        self.ensure_exists(vehiculo_id).await?;

        let imagen = self
            .repository
            .add_imagen(
                vehiculo_id,
                &request.url,
                request.orden.unwrap_or(0),
                request.es_principal.unwrap_or(false),
            )
            .await?;

        Ok(ImagenResponse::from(imagen))
    }

    pub async fn set_imagen_principal(
        &self,
        vehiculo_id: Uuid,
        imagen_id: Uuid,
    ) -> Result<ImagenResponse, AppError> {
        let imagen = self
            .repository
            .set_imagen_principal(vehiculo_id, imagen_id)
            .await?;

        Ok(ImagenResponse::from(imagen))
    }

    pub async fn delete_imagen(&self, vehiculo_id: Uuid, imagen_id: Uuid) -> Result<(), AppError> {
        self.repository.delete_imagen(vehiculo_id, imagen_id).await
    }

    async fn ensure_exists(&self, id: Uuid) -> Result<(), AppError> {
        self.repository
            .find_active_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        Ok(())
    }
}
