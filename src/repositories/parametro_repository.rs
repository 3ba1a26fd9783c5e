use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::parametro::{Modelo, Parametro, TipoParametro};
use crate::utils::errors::AppError;

/// Repositorio genérico para las tablas de parámetros.
///
/// El nombre de tabla sale de la whitelist de `TipoParametro`, nunca
/// del request.
pub struct ParametroRepository {
    pool: PgPool,
}

impl ParametroRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        tipo: TipoParametro,
        activo: Option<bool>,
        search: Option<&str>,
    ) -> Result<Vec<Parametro>, AppError> {
        let mut qb = sqlx::QueryBuilder::new(format!("SELECT * FROM {} WHERE 1=1", tipo.table_name()));

        if let Some(activo) = activo {
            qb.push(" AND activo = ").push_bind(activo);
        }
        if let Some(search) = search {
            qb.push(" AND nombre ILIKE ").push_bind(format!("%{}%", search));
        }
        qb.push(" ORDER BY orden, nombre");

        let parametros = qb.build_query_as::<Parametro>().fetch_all(&self.pool).await?;

        Ok(parametros)
    }

    pub async fn find_by_id(
        &self,
        tipo: TipoParametro,
        id: Uuid,
    ) -> Result<Option<Parametro>, AppError> {
        let parametro = sqlx::query_as::<_, Parametro>(&format!(
            "SELECT * FROM {} WHERE id = $1",
            tipo.table_name()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(parametro)
    }

    pub async fn create(
        &self,
        tipo: TipoParametro,
        nombre: &str,
        activo: bool,
        orden: i32,
    ) -> Result<Parametro, AppError> {
        let parametro = sqlx::query_as::<_, Parametro>(&format!(
            r#"
            INSERT INTO {} (id, nombre, activo, orden, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
            tipo.table_name()
        ))
        .bind(Uuid::new_v4())
        .bind(nombre)
        .bind(activo)
        .bind(orden)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(parametro)
    }

    pub async fn update(
        &self,
        tipo: TipoParametro,
        id: Uuid,
        nombre: Option<String>,
        activo: Option<bool>,
        orden: Option<i32>,
    ) -> Result<Parametro, AppError> {
        let current = self
            .find_by_id(tipo, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parámetro no encontrado".to_string()))?;

        let parametro = sqlx::query_as::<_, Parametro>(&format!(
            r#"
            UPDATE {}
            SET nombre = $2, activo = $3, orden = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
            tipo.table_name()
        ))
        .bind(id)
        .bind(nombre.unwrap_or(current.nombre))
        .bind(activo.unwrap_or(current.activo))
        .bind(orden.unwrap_or(current.orden))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(parametro)
    }

    /// Elimina un parámetro. Las FKs de vehiculos son RESTRICT: si el
    /// parámetro está en uso, la query falla y se traduce a conflicto.
    pub async fn delete(&self, tipo: TipoParametro, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", tipo.table_name()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Conflict("El parámetro está en uso por vehículos".to_string())
                }
                _ => AppError::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Parámetro no encontrado".to_string()));
        }

        Ok(())
    }

    // =========================================================================
    // MODELOS (tabla con FK a marcas)
    // =========================================================================

    pub async fn list_modelos(
        &self,
        activo: Option<bool>,
        marca_id: Option<Uuid>,
        search: Option<&str>,
    ) -> Result<Vec<Modelo>, AppError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM modelos WHERE 1=1");

        if let Some(activo) = activo {
            qb.push(" AND activo = ").push_bind(activo);
        }
        if let Some(marca_id) = marca_id {
            qb.push(" AND marca_id = ").push_bind(marca_id);
        }
        if let Some(search) = search {
            qb.push(" AND nombre ILIKE ").push_bind(format!("%{}%", search));
        }
        qb.push(" ORDER BY orden, nombre");

        let modelos = qb.build_query_as::<Modelo>().fetch_all(&self.pool).await?;

        Ok(modelos)
    }

    pub async fn find_modelo_by_id(&self, id: Uuid) -> Result<Option<Modelo>, AppError> {
        let modelo = sqlx::query_as::<_, Modelo>("SELECT * FROM modelos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(modelo)
    }

    pub async fn create_modelo(
        &self,
        marca_id: Uuid,
        nombre: &str,
        activo: bool,
        orden: i32,
    ) -> Result<Modelo, AppError> {
        let modelo = sqlx::query_as::<_, Modelo>(
            r#"
            INSERT INTO modelos (id, marca_id, nombre, activo, orden, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(marca_id)
        .bind(nombre)
        .bind(activo)
        .bind(orden)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(modelo)
    }

    pub async fn update_modelo(
        &self,
        id: Uuid,
        nombre: Option<String>,
        activo: Option<bool>,
        orden: Option<i32>,
    ) -> Result<Modelo, AppError> {
        let current = self
            .find_modelo_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Modelo no encontrado".to_string()))?;

        let modelo = sqlx::query_as::<_, Modelo>(
            r#"
            UPDATE modelos
            SET nombre = $2, activo = $3, orden = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nombre.unwrap_or(current.nombre))
        .bind(activo.unwrap_or(current.activo))
        .bind(orden.unwrap_or(current.orden))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(modelo)
    }

    pub async fn delete_modelo(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM modelos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Conflict("El modelo está en uso por vehículos".to_string())
                }
                _ => AppError::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Modelo no encontrado".to_string()));
        }

        Ok(())
    }
}
