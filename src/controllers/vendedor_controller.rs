use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::Paginated;
use crate::dto::vendedor_dto::{
    CreateVendedorRequest, UpdateVendedorRequest, VendedorFilters, VendedorResponse,
};
use crate::repositories::vendedor_repository::VendedorRepository;
use crate::utils::errors::AppError;

pub struct VendedorController {
    repository: VendedorRepository,
}

impl VendedorController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VendedorRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        filters: VendedorFilters,
    ) -> Result<Paginated<VendedorResponse>, AppError> {
        let (vendedores, count) = self.repository.list(&filters).await?;

        Ok(Paginated {
            count,
            results: vendedores.into_iter().map(VendedorResponse::from).collect(),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<VendedorResponse, AppError> {
        let vendedor = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vendedor no encontrado".to_string()))?;

        Ok(VendedorResponse::from(vendedor))
    }

    pub async fn create(
        &self,
        request: CreateVendedorRequest,
    ) -> Result<VendedorResponse, AppError> {
        request.validate()?;
        let vendedor = self.repository.create(&request).await?;
        Ok(VendedorResponse::from(vendedor))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVendedorRequest,
    ) -> Result<VendedorResponse, AppError> {
        request.validate()?;
        let vendedor = self.repository.update(id, &request).await?;
        Ok(VendedorResponse::from(vendedor))
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<VendedorResponse, AppError> {
        let vendedor = self.repository.deactivate(id).await?;
        Ok(VendedorResponse::from(vendedor))
    }
}
