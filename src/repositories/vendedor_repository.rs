use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vendedor_dto::{CreateVendedorRequest, UpdateVendedorRequest, VendedorFilters};
use crate::models::vendedor::Vendedor;
use crate::utils::errors::AppError;

pub struct VendedorRepository {
    pool: PgPool,
}

impl VendedorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filters: &VendedorFilters) -> Result<(Vec<Vendedor>, i64), AppError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM vendedores WHERE 1=1");
        Self::apply_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC");

        let limit = filters.limit.unwrap_or(20).clamp(1, 100);
        let offset = filters.offset.unwrap_or(0).max(0);
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let vendedores = qb.build_query_as::<Vendedor>().fetch_all(&self.pool).await?;

        let mut count_qb = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM vendedores WHERE 1=1");
        Self::apply_filters(&mut count_qb, filters);
        let count: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((vendedores, count))
    }

    fn apply_filters(qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>, filters: &VendedorFilters) {
        if let Some(activo) = filters.activo {
            qb.push(" AND activo = ").push_bind(activo);
        }
        if let Some(tiene_cartel) = filters.tiene_cartel {
            qb.push(" AND tiene_cartel = ").push_bind(tiene_cartel);
        }
        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (nombre ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR apellido ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR dni ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendedor>, AppError> {
        let vendedor = sqlx::query_as::<_, Vendedor>("SELECT * FROM vendedores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vendedor)
    }

    pub async fn create(&self, request: &CreateVendedorRequest) -> Result<Vendedor, AppError> {
        let vendedor = sqlx::query_as::<_, Vendedor>(
            r#"
            INSERT INTO vendedores (
                id, nombre, apellido, email, direccion, celular, dni,
                tiene_cartel, activo, comentarios, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.nombre)
        .bind(&request.apellido)
        .bind(&request.email)
        .bind(&request.direccion)
        .bind(&request.celular)
        .bind(&request.dni)
        .bind(request.tiene_cartel.unwrap_or(false))
        .bind(request.comentarios.as_deref().unwrap_or(""))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_unique_violation)?;

        Ok(vendedor)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateVendedorRequest,
    ) -> Result<Vendedor, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vendedor no encontrado".to_string()))?;

        let vendedor = sqlx::query_as::<_, Vendedor>(
            r#"
            UPDATE vendedores
            SET nombre = $2, apellido = $3, email = $4, direccion = $5,
                celular = $6, tiene_cartel = $7, activo = $8, comentarios = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.nombre.as_ref().unwrap_or(&current.nombre))
        .bind(request.apellido.as_ref().unwrap_or(&current.apellido))
        .bind(request.email.as_ref().unwrap_or(&current.email))
        .bind(request.direccion.as_ref().unwrap_or(&current.direccion))
        .bind(request.celular.as_ref().unwrap_or(&current.celular))
        .bind(request.tiene_cartel.unwrap_or(current.tiene_cartel))
        .bind(request.activo.unwrap_or(current.activo))
        .bind(request.comentarios.as_ref().unwrap_or(&current.comentarios))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_unique_violation)?;

        Ok(vendedor)
    }

    /// Baja lógica: el vendedor queda inactivo, nunca se borra la fila
    /// porque los vehículos lo referencian.
    pub async fn deactivate(&self, id: Uuid) -> Result<Vendedor, AppError> {
        let vendedor = sqlx::query_as::<_, Vendedor>(
            "UPDATE vendedores SET activo = false, updated_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendedor no encontrado".to_string()))?;

        Ok(vendedor)
    }

    fn map_unique_violation(e: sqlx::Error) -> AppError {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Ya existe un vendedor con ese email o DNI".to_string())
            }
            _ => AppError::Database(e),
        }
    }
}
