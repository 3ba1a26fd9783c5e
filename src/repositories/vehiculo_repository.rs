use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vehiculo_dto::{CreateVehiculoRequest, UpdateVehiculoRequest, VehiculoFilters};
use crate::models::vehiculo::{
    ImagenVehiculo, TipoVehiculo, Vehiculo, MAX_IMAGENES_POR_VEHICULO,
};
use crate::utils::errors::AppError;

pub struct VehiculoRepository {
    pool: PgPool,
}

impl VehiculoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CONSULTAS
    // =========================================================================

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehiculo>, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>("SELECT * FROM vehiculos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehiculo)
    }

    /// Busca por id excluyendo los eliminados con soft delete.
    pub async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Vehiculo>, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            "SELECT * FROM vehiculos WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehiculo)
    }

    /// Busca por patente normalizada, excluyendo eliminados. Es la base
    /// del matching con publicaciones de MercadoLibre.
    pub async fn find_by_patente(&self, patente: &str) -> Result<Option<Vehiculo>, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            "SELECT * FROM vehiculos WHERE patente = $1 AND deleted_at IS NULL",
        )
        .bind(patente)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehiculo)
    }

    pub async fn list(&self, filters: &VehiculoFilters) -> Result<(Vec<Vehiculo>, i64), AppError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM vehiculos WHERE 1=1");
        Self::apply_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC");

        let limit = filters.limit.unwrap_or(20).clamp(1, 100);
        let offset = filters.offset.unwrap_or(0).max(0);
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let vehiculos = qb.build_query_as::<Vehiculo>().fetch_all(&self.pool).await?;

        let mut count_qb = sqlx::QueryBuilder::new("SELECT COUNT(*) FROM vehiculos WHERE 1=1");
        Self::apply_filters(&mut count_qb, filters);
        let count: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((vehiculos, count))
    }

    fn apply_filters(qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>, filters: &VehiculoFilters) {
        // Los eliminados quedan afuera salvo pedido explícito
        if !filters.include_deleted.unwrap_or(false) {
            qb.push(" AND deleted_at IS NULL");
        }

        if let Some(tipo) = filters.tipo_vehiculo {
            qb.push(" AND tipo_vehiculo = ").push_bind(tipo);
        }

        if let Some(precio_min) = filters.precio_min {
            qb.push(" AND precio >= ").push_bind(precio_min);
        }
        if let Some(precio_max) = filters.precio_max {
            qb.push(" AND precio <= ").push_bind(precio_max);
        }
        if let Some(anio_min) = filters.anio_min {
            qb.push(" AND anio >= ").push_bind(anio_min);
        }
        if let Some(anio_max) = filters.anio_max {
            qb.push(" AND anio <= ").push_bind(anio_max);
        }
        if let Some(km_min) = filters.km_min {
            qb.push(" AND km >= ").push_bind(km_min);
        }
        if let Some(km_max) = filters.km_max {
            qb.push(" AND km <= ").push_bind(km_max);
        }

        if let Some(marca_id) = filters.marca_id {
            qb.push(" AND marca_id = ").push_bind(marca_id);
        }
        if let Some(modelo_id) = filters.modelo_id {
            qb.push(" AND modelo_id = ").push_bind(modelo_id);
        }
        if let Some(combustible_id) = filters.combustible_id {
            qb.push(" AND combustible_id = ").push_bind(combustible_id);
        }
        if let Some(caja_id) = filters.caja_id {
            qb.push(" AND caja_id = ").push_bind(caja_id);
        }
        if let Some(estado_id) = filters.estado_id {
            qb.push(" AND estado_id = ").push_bind(estado_id);
        }
        if let Some(condicion_id) = filters.condicion_id {
            qb.push(" AND condicion_id = ").push_bind(condicion_id);
        }
        if let Some(moneda_id) = filters.moneda_id {
            qb.push(" AND moneda_id = ").push_bind(moneda_id);
        }
        if let Some(segmento_id) = filters.segmento_id {
            qb.push(" AND (segmento1_id = ")
                .push_bind(segmento_id)
                .push(" OR segmento2_id = ")
                .push_bind(segmento_id)
                .push(")");
        }
        if let Some(vendedor_id) = filters.vendedor_id {
            qb.push(" AND vendedor_id = ").push_bind(vendedor_id);
        }

        if let Some(vendido) = filters.vendido {
            qb.push(" AND vendido = ").push_bind(vendido);
        }
        if let Some(reservado) = filters.reservado {
            qb.push(" AND reservado = ").push_bind(reservado);
        }
        if let Some(mostrar_en_web) = filters.mostrar_en_web {
            qb.push(" AND mostrar_en_web = ").push_bind(mostrar_en_web);
        }
        if let Some(destacar_en_web) = filters.destacar_en_web {
            qb.push(" AND destacar_en_web = ").push_bind(destacar_en_web);
        }
        if let Some(oportunidad) = filters.oportunidad {
            qb.push(" AND oportunidad = ").push_bind(oportunidad);
        }
        if let Some(publicado_en_ml) = filters.publicado_en_ml {
            qb.push(" AND publicado_en_ml = ").push_bind(publicado_en_ml);
        }
        if let Some(vtv) = filters.vtv {
            qb.push(" AND vtv = ").push_bind(vtv);
        }

        if let Some(disponible) = filters.disponible {
            if disponible {
                qb.push(" AND vendido = false AND reservado = false");
            } else {
                qb.push(" AND (vendido = true OR reservado = true)");
            }
        }

        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (patente ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR version ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR color ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    // =========================================================================
    // ESCRITURA
    // =========================================================================

    pub async fn create(
        &self,
        request: &CreateVehiculoRequest,
        patente: &str,
        cargado_por: Uuid,
    ) -> Result<Vehiculo, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            r#"
            INSERT INTO vehiculos (
                id, marca_id, modelo_id, segmento1_id, segmento2_id,
                combustible_id, caja_id, estado_id, condicion_id, moneda_id,
                vendedor_id, cargado_por,
                tipo_vehiculo, version, patente, anio, km, color,
                precio, porcentaje_financiacion, cant_duenos,
                vtv, plan_ahorro, reservado, vendido,
                mostrar_en_web, destacar_en_web, oportunidad, oportunidad_grupo, reventa,
                publicado_en_ml, ml_estado, ml_error, ml_permalink,
                comentario_carga, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21,
                $22, $23, false, false,
                $24, $25, $26, $27, $28,
                false, '', '', '',
                $29, $30, $30
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.marca_id)
        .bind(request.modelo_id)
        .bind(request.segmento1_id)
        .bind(request.segmento2_id)
        .bind(request.combustible_id)
        .bind(request.caja_id)
        .bind(request.estado_id)
        .bind(request.condicion_id)
        .bind(request.moneda_id)
        .bind(request.vendedor_id)
        .bind(cargado_por)
        .bind(request.tipo_vehiculo.unwrap_or(TipoVehiculo::Auto))
        .bind(request.version.as_deref().unwrap_or(""))
        .bind(patente)
        .bind(request.anio)
        .bind(request.km.unwrap_or(0))
        .bind(&request.color)
        .bind(request.precio)
        .bind(request.porcentaje_financiacion)
        .bind(request.cant_duenos.unwrap_or(1))
        .bind(request.vtv.unwrap_or(false))
        .bind(request.plan_ahorro.unwrap_or(false))
        .bind(request.mostrar_en_web.unwrap_or(true))
        .bind(request.destacar_en_web.unwrap_or(false))
        .bind(request.oportunidad.unwrap_or(false))
        .bind(request.oportunidad_grupo.unwrap_or(false))
        .bind(request.reventa.unwrap_or(false))
        .bind(request.comentario_carga.as_deref().unwrap_or(""))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_create_error)?;

        Ok(vehiculo)
    }

    pub async fn update(
        &self,
        current: &Vehiculo,
        request: &UpdateVehiculoRequest,
    ) -> Result<Vehiculo, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            r#"
            UPDATE vehiculos
            SET marca_id = $2, modelo_id = $3, segmento1_id = $4, segmento2_id = $5,
                combustible_id = $6, caja_id = $7, estado_id = $8, condicion_id = $9,
                moneda_id = $10, vendedor_id = $11, tipo_vehiculo = $12,
                version = $13, anio = $14, km = $15, color = $16,
                precio = $17, porcentaje_financiacion = $18, cant_duenos = $19,
                vtv = $20, plan_ahorro = $21,
                mostrar_en_web = $22, destacar_en_web = $23,
                oportunidad = $24, oportunidad_grupo = $25, reventa = $26,
                comentario_carga = $27, updated_at = $28
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(request.marca_id.unwrap_or(current.marca_id))
        .bind(request.modelo_id.unwrap_or(current.modelo_id))
        .bind(request.segmento1_id.or(current.segmento1_id))
        .bind(request.segmento2_id.or(current.segmento2_id))
        .bind(request.combustible_id.unwrap_or(current.combustible_id))
        .bind(request.caja_id.unwrap_or(current.caja_id))
        .bind(request.estado_id.unwrap_or(current.estado_id))
        .bind(request.condicion_id.unwrap_or(current.condicion_id))
        .bind(request.moneda_id.unwrap_or(current.moneda_id))
        .bind(request.vendedor_id.unwrap_or(current.vendedor_id))
        .bind(request.tipo_vehiculo.unwrap_or(current.tipo_vehiculo))
        .bind(request.version.as_ref().unwrap_or(&current.version))
        .bind(request.anio.unwrap_or(current.anio))
        .bind(request.km.unwrap_or(current.km))
        .bind(request.color.as_ref().unwrap_or(&current.color))
        .bind(request.precio.unwrap_or(current.precio))
        .bind(request.porcentaje_financiacion.or(current.porcentaje_financiacion))
        .bind(request.cant_duenos.unwrap_or(current.cant_duenos))
        .bind(request.vtv.unwrap_or(current.vtv))
        .bind(request.plan_ahorro.unwrap_or(current.plan_ahorro))
        .bind(request.mostrar_en_web.unwrap_or(current.mostrar_en_web))
        .bind(request.destacar_en_web.unwrap_or(current.destacar_en_web))
        .bind(request.oportunidad.unwrap_or(current.oportunidad))
        .bind(request.oportunidad_grupo.unwrap_or(current.oportunidad_grupo))
        .bind(request.reventa.unwrap_or(current.reventa))
        .bind(
            request
                .comentario_carga
                .as_ref()
                .unwrap_or(&current.comentario_carga),
        )
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(vehiculo)
    }

    /// Soft delete: marca deleted_at, la fila se conserva.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE vehiculos SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehículo no encontrado".to_string()));
        }

        Ok(())
    }

    pub async fn restore(&self, id: Uuid) -> Result<Vehiculo, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            r#"
            UPDATE vehiculos SET deleted_at = NULL, updated_at = $2
            WHERE id = $1 AND deleted_at IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo eliminado no encontrado".to_string()))?;

        Ok(vehiculo)
    }

    /// Marcar vendido además quita la reserva y lo saca de la web.
    pub async fn set_vendido(&self, id: Uuid, vendido: bool) -> Result<Vehiculo, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            r#"
            UPDATE vehiculos
            SET vendido = $2,
                reservado = false,
                mostrar_en_web = CASE WHEN $2 THEN false ELSE mostrar_en_web END,
                updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(vendido)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(vehiculo)
    }

    pub async fn set_reservado(&self, id: Uuid, reservado: bool) -> Result<Vehiculo, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            r#"
            UPDATE vehiculos SET reservado = $2, updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL AND vendido = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reservado)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("El vehículo no existe o ya fue vendido".to_string())
        })?;

        Ok(vehiculo)
    }

    /// Actualiza los campos espejo de MercadoLibre del vehículo.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_ml_fields(
        &self,
        id: Uuid,
        publicado_en_ml: bool,
        ml_item_id: Option<&str>,
        ml_estado: &str,
        ml_error: &str,
        ml_permalink: &str,
    ) -> Result<Vehiculo, AppError> {
        let vehiculo = sqlx::query_as::<_, Vehiculo>(
            r#"
            UPDATE vehiculos
            SET publicado_en_ml = $2, ml_item_id = $3, ml_estado = $4,
                ml_error = $5, ml_permalink = $6, ml_fecha_sync = $7, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(publicado_en_ml)
        .bind(ml_item_id)
        .bind(ml_estado)
        .bind(ml_error)
        .bind(ml_permalink)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(vehiculo)
    }

    /// Registra solo el error de sincronización sin tocar el estado local.
    pub async fn set_ml_error(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE vehiculos SET ml_error = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(error)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn map_create_error(e: sqlx::Error) -> AppError {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Ya existe un vehículo con esa patente".to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::BadRequest("Alguno de los parámetros referenciados no existe".to_string())
            }
            _ => AppError::Database(e),
        }
    }

    // =========================================================================
    // IMÁGENES
    // =========================================================================

    pub async fn list_imagenes(&self, vehiculo_id: Uuid) -> Result<Vec<ImagenVehiculo>, AppError> {
        let imagenes = sqlx::query_as::<_, ImagenVehiculo>(
            "SELECT * FROM imagenes_vehiculo WHERE vehiculo_id = $1 ORDER BY orden, created_at",
        )
        .bind(vehiculo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(imagenes)
    }

    pub async fn add_imagen(
        &self,
        vehiculo_id: Uuid,
        url: &str,
        orden: i16,
        es_principal: bool,
    ) -> Result<ImagenVehiculo, AppError> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM imagenes_vehiculo WHERE vehiculo_id = $1",
        )
        .bind(vehiculo_id)
        .fetch_one(&mut *tx)
        .await?;

        if count >= MAX_IMAGENES_POR_VEHICULO {
            return Err(AppError::Conflict(format!(
                "El vehículo ya tiene el máximo de {} imágenes",
                MAX_IMAGENES_POR_VEHICULO
            )));
        }

        // Solo una imagen principal por vehículo
        if es_principal {
            sqlx::query(
                "UPDATE imagenes_vehiculo SET es_principal = false WHERE vehiculo_id = $1",
            )
            .bind(vehiculo_id)
            .execute(&mut *tx)
            .await?;
        }

        let imagen = sqlx::query_as::<_, ImagenVehiculo>(
            r#"
            INSERT INTO imagenes_vehiculo (id, vehiculo_id, url, orden, es_principal, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehiculo_id)
        .bind(url)
        .bind(orden)
        .bind(es_principal || count == 0)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(imagen)
    }

    pub async fn set_imagen_principal(
        &self,
        vehiculo_id: Uuid,
        imagen_id: Uuid,
    ) -> Result<ImagenVehiculo, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE imagenes_vehiculo SET es_principal = false WHERE vehiculo_id = $1")
            .bind(vehiculo_id)
            .execute(&mut *tx)
            .await?;

        let imagen = sqlx::query_as::<_, ImagenVehiculo>(
            r#"
            UPDATE imagenes_vehiculo SET es_principal = true
            WHERE id = $1 AND vehiculo_id = $2
            RETURNING *
            "#,
        )
        .bind(imagen_id)
        .bind(vehiculo_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Imagen no encontrada".to_string()))?;

        tx.commit().await?;

        Ok(imagen)
    }

    pub async fn delete_imagen(&self, vehiculo_id: Uuid, imagen_id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM imagenes_vehiculo WHERE id = $1 AND vehiculo_id = $2")
                .bind(imagen_id)
                .bind(vehiculo_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Imagen no encontrada".to_string()));
        }

        Ok(())
    }
}
