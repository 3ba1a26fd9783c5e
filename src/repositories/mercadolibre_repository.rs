use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::mercadolibre_dto::{PublicationFilters, StatisticsResponse, SyncLogFilters};
use crate::models::mercadolibre::{
    MlCredential, MlPublication, MlPublicationStatus, MlSyncAction, MlSyncLog,
};
use crate::utils::errors::AppError;

/// Datos de una publicación traídos de la API, listos para persistir.
#[derive(Debug, Clone)]
pub struct UpsertPublicationData {
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
    pub created_from_system: bool,
}

pub struct MercadoLibreRepository {
    pool: PgPool,
}

impl MercadoLibreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CREDENCIALES
    // =========================================================================

    /// Credencial activa más reciente. La cuenta de la concesionaria es
    /// una sola, así que alcanza con la última conexión.
    pub async fn find_active_credential(&self) -> Result<Option<MlCredential>, AppError> {
        let credential = sqlx::query_as::<_, MlCredential>(
            "SELECT * FROM ml_credentials WHERE is_active = true ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    pub async fn find_latest_credential(&self) -> Result<Option<MlCredential>, AppError> {
        let credential = sqlx::query_as::<_, MlCredential>(
            "SELECT * FROM ml_credentials ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    /// Desactiva cualquier otra credencial activa. La cuenta conectada
    /// es una sola.
    pub async fn deactivate_other_credentials(&self, ml_user_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE ml_credentials
            SET is_active = false, access_token = '', refresh_token = '', updated_at = $2
            WHERE is_active = true AND ml_user_id <> $1
            "#,
        )
        .bind(ml_user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Guarda la credencial de una cuenta. Si la cuenta ya estaba
    /// conectada, pisa los tokens y la reactiva.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_credential(
        &self,
        user_id: Uuid,
        ml_user_id: &str,
        ml_nickname: &str,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
        scope: &str,
    ) -> Result<MlCredential, AppError> {
        let credential = sqlx::query_as::<_, MlCredential>(
            r#"
            INSERT INTO ml_credentials (
                id, user_id, ml_user_id, ml_nickname, access_token, refresh_token,
                expires_at, scope, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, $9, $9)
            ON CONFLICT (ml_user_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                ml_nickname = EXCLUDED.ml_nickname,
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at,
                scope = EXCLUDED.scope,
                is_active = true,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(ml_user_id)
        .bind(ml_nickname)
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .bind(scope)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(credential)
    }

    pub async fn update_credential_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<MlCredential, AppError> {
        let credential = sqlx::query_as::<_, MlCredential>(
            r#"
            UPDATE ml_credentials
            SET access_token = $2, refresh_token = $3, expires_at = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Credencial no encontrada".to_string()))?;

        Ok(credential)
    }

    /// Desactiva la credencial y borra los tokens almacenados. Se usa
    /// al desconectar y cuando el refresh token fue revocado
    /// (invalid_grant).
    pub async fn deactivate_credential(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE ml_credentials
            SET is_active = false, access_token = '', refresh_token = '', updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // PUBLICACIONES
    // =========================================================================

    pub async fn find_publication_by_id(&self, id: Uuid) -> Result<Option<MlPublication>, AppError> {
        let publication =
            sqlx::query_as::<_, MlPublication>("SELECT * FROM ml_publications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(publication)
    }

    pub async fn find_publication_by_ml_item_id(
        &self,
        ml_item_id: &str,
    ) -> Result<Option<MlPublication>, AppError> {
        let publication = sqlx::query_as::<_, MlPublication>(
            "SELECT * FROM ml_publications WHERE ml_item_id = $1",
        )
        .bind(ml_item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publication)
    }

    pub async fn find_publication_by_vehiculo(
        &self,
        vehiculo_id: Uuid,
    ) -> Result<Option<MlPublication>, AppError> {
        let publication = sqlx::query_as::<_, MlPublication>(
            "SELECT * FROM ml_publications WHERE vehiculo_id = $1",
        )
        .bind(vehiculo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publication)
    }

    pub async fn list_publications(
        &self,
        filters: &PublicationFilters,
    ) -> Result<(Vec<MlPublication>, i64), AppError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM ml_publications WHERE 1=1");
        Self::apply_publication_filters(&mut qb, filters);
        qb.push(" ORDER BY last_synced DESC");

        let limit = filters.limit.unwrap_or(20).clamp(1, 100);
        let offset = filters.offset.unwrap_or(0).max(0);
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let publications = qb
            .build_query_as::<MlPublication>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb =
            sqlx::QueryBuilder::new("SELECT COUNT(*) FROM ml_publications WHERE 1=1");
        Self::apply_publication_filters(&mut count_qb, filters);
        let count: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((publications, count))
    }

    fn apply_publication_filters(
        qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
        filters: &PublicationFilters,
    ) {
        if let Some(status) = filters.ml_status {
            qb.push(" AND ml_status = ").push_bind(status);
        }
        if let Some(linked) = filters.linked {
            if linked {
                qb.push(" AND vehiculo_id IS NOT NULL");
            } else {
                qb.push(" AND vehiculo_id IS NULL");
            }
        }
        if let Some(created_from_system) = filters.created_from_system {
            qb.push(" AND created_from_system = ").push_bind(created_from_system);
        }
        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (ml_title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR ml_item_id ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR patente_ml ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR marca_ml ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR modelo_ml ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Inserta o refresca el espejo local de una publicación.
    ///
    /// El vínculo con un vehículo nunca se pisa en el upsert: solo lo
    /// establecen link_publication y la creación desde el sistema.
    pub async fn upsert_publication(
        &self,
        data: &UpsertPublicationData,
        vehiculo_id: Option<Uuid>,
    ) -> Result<(MlPublication, bool), AppError> {
        let existing = self.find_publication_by_ml_item_id(&data.ml_item_id).await?;
        let is_new = existing.is_none();

        let publication = sqlx::query_as::<_, MlPublication>(
            r#"
            INSERT INTO ml_publications (
                id, vehiculo_id, ml_item_id, ml_title, ml_status, ml_price,
                ml_currency, ml_permalink, ml_thumbnail, ml_category_id, ml_listing_type,
                patente_ml, marca_ml, modelo_ml, anio_ml, km_ml,
                last_synced, sync_error, created_from_system, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, '', $18, $17, $17)
            ON CONFLICT (ml_item_id) DO UPDATE SET
                ml_title = EXCLUDED.ml_title,
                ml_status = EXCLUDED.ml_status,
                ml_price = EXCLUDED.ml_price,
                ml_currency = EXCLUDED.ml_currency,
                ml_permalink = EXCLUDED.ml_permalink,
                ml_thumbnail = EXCLUDED.ml_thumbnail,
                ml_category_id = EXCLUDED.ml_category_id,
                ml_listing_type = EXCLUDED.ml_listing_type,
                patente_ml = EXCLUDED.patente_ml,
                marca_ml = EXCLUDED.marca_ml,
                modelo_ml = EXCLUDED.modelo_ml,
                anio_ml = EXCLUDED.anio_ml,
                km_ml = EXCLUDED.km_ml,
                last_synced = EXCLUDED.last_synced,
                sync_error = '',
                vehiculo_id = COALESCE(ml_publications.vehiculo_id, EXCLUDED.vehiculo_id),
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehiculo_id)
        .bind(&data.ml_item_id)
        .bind(&data.ml_title)
        .bind(data.ml_status)
        .bind(data.ml_price)
        .bind(&data.ml_currency)
        .bind(&data.ml_permalink)
        .bind(&data.ml_thumbnail)
        .bind(&data.ml_category_id)
        .bind(&data.ml_listing_type)
        .bind(&data.patente_ml)
        .bind(&data.marca_ml)
        .bind(&data.modelo_ml)
        .bind(data.anio_ml)
        .bind(data.km_ml)
        .bind(Utc::now())
        .bind(data.created_from_system)
        .fetch_one(&self.pool)
        .await?;

        Ok((publication, is_new))
    }

    /// Vincula una publicación a un vehículo del sistema.
    pub async fn link_publication(
        &self,
        publication_id: Uuid,
        vehiculo_id: Uuid,
    ) -> Result<MlPublication, AppError> {
        let publication = sqlx::query_as::<_, MlPublication>(
            r#"
            UPDATE ml_publications SET vehiculo_id = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(publication_id)
        .bind(vehiculo_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("El vehículo ya tiene otra publicación vinculada".to_string())
            }
            _ => AppError::Database(e),
        })?
        .ok_or_else(|| AppError::NotFound("Publicación no encontrada".to_string()))?;

        Ok(publication)
    }

    pub async fn unlink_publication(&self, publication_id: Uuid) -> Result<MlPublication, AppError> {
        let publication = sqlx::query_as::<_, MlPublication>(
            r#"
            UPDATE ml_publications SET vehiculo_id = NULL, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(publication_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Publicación no encontrada".to_string()))?;

        Ok(publication)
    }

    /// Refleja localmente un cambio de estado ya confirmado por la API.
    pub async fn update_publication_status(
        &self,
        publication_id: Uuid,
        status: MlPublicationStatus,
    ) -> Result<MlPublication, AppError> {
        let publication = sqlx::query_as::<_, MlPublication>(
            r#"
            UPDATE ml_publications
            SET ml_status = $2, sync_error = '', last_synced = $3, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(publication_id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Publicación no encontrada".to_string()))?;

        Ok(publication)
    }

    /// Registra el error de la última sincronización sin tocar el estado.
    pub async fn set_publication_sync_error(
        &self,
        publication_id: Uuid,
        error: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE ml_publications SET sync_error = $2, updated_at = $3 WHERE id = $1")
            .bind(publication_id)
            .bind(error)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn publication_statistics(&self) -> Result<StatisticsResponse, AppError> {
        let row: (i64, i64, i64, i64, i64, i64, Option<DateTime<Utc>>) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE ml_status = 'active'),
                COUNT(*) FILTER (WHERE ml_status = 'paused'),
                COUNT(*) FILTER (WHERE ml_status = 'closed'),
                COUNT(*) FILTER (WHERE vehiculo_id IS NOT NULL),
                COUNT(*) FILTER (WHERE created_from_system),
                MAX(last_synced)
            FROM ml_publications
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StatisticsResponse {
            total_publications: row.0,
            active_publications: row.1,
            paused_publications: row.2,
            closed_publications: row.3,
            linked_publications: row.4,
            unlinked_publications: row.0 - row.4,
            created_from_system: row.5,
            last_sync: row.6,
        })
    }

    // =========================================================================
    // SYNC LOGS (append-only)
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_sync_log(
        &self,
        action: MlSyncAction,
        publication_id: Option<Uuid>,
        vehiculo_id: Option<Uuid>,
        user_id: Option<Uuid>,
        request_data: Option<serde_json::Value>,
        response_data: Option<serde_json::Value>,
        success: bool,
        error_message: &str,
    ) -> Result<MlSyncLog, AppError> {
        let log = sqlx::query_as::<_, MlSyncLog>(
            r#"
            INSERT INTO ml_sync_logs (
                id, action, publication_id, vehiculo_id, user_id,
                request_data, response_data, success, error_message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(action)
        .bind(publication_id)
        .bind(vehiculo_id)
        .bind(user_id)
        .bind(request_data)
        .bind(response_data)
        .bind(success)
        .bind(error_message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    /// Últimos 100 registros, más recientes primero.
    pub async fn list_sync_logs(
        &self,
        filters: &SyncLogFilters,
    ) -> Result<Vec<MlSyncLog>, AppError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM ml_sync_logs WHERE 1=1");

        if let Some(action) = filters.action {
            qb.push(" AND action = ").push_bind(action);
        }
        if let Some(success) = filters.success {
            qb.push(" AND success = ").push_bind(success);
        }
        qb.push(" ORDER BY created_at DESC LIMIT 100");

        let logs = qb.build_query_as::<MlSyncLog>().fetch_all(&self.pool).await?;

        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_support;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_idempotente_por_ml_item_id(pool: PgPool) {
        let repo = MercadoLibreRepository::new(pool.clone());
        let data = test_support::datos_publicacion("MLA111222333", "AB123CD");

        let (primera, es_nueva) = repo.upsert_publication(&data, None).await.unwrap();
        assert!(es_nueva);

        let (segunda, es_nueva) = repo.upsert_publication(&data, None).await.unwrap();
        assert!(!es_nueva);
        assert_eq!(segunda.id, primera.id);

        let (_, total) = repo
            .list_publications(&PublicationFilters::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_no_pisa_el_vinculo_existente(pool: PgPool) {
        let repo = MercadoLibreRepository::new(pool.clone());
        let usuario = test_support::crear_usuario(&pool).await;
        let vehiculo = test_support::crear_vehiculo(&pool, usuario.id, "AB123CD").await;

        let data = test_support::datos_publicacion("MLA111222333", "AB123CD");
        let (vinculada, _) = repo.upsert_publication(&data, Some(vehiculo.id)).await.unwrap();
        assert_eq!(vinculada.vehiculo_id, Some(vehiculo.id));

        // Un import posterior sin match no debe desvincular
        let (refrescada, _) = repo.upsert_publication(&data, None).await.unwrap();
        assert_eq!(refrescada.vehiculo_id, Some(vehiculo.id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_desconectar_desactiva_y_borra_tokens(pool: PgPool) {
        let repo = MercadoLibreRepository::new(pool.clone());
        let usuario = test_support::crear_usuario(&pool).await;
        let credencial = test_support::conectar_credencial(&pool, usuario.id).await;

        repo.deactivate_credential(credencial.id).await.unwrap();

        assert!(repo.find_active_credential().await.unwrap().is_none());

        let guardada = repo.find_latest_credential().await.unwrap().unwrap();
        assert!(!guardada.is_active);
        assert!(guardada.access_token.is_empty());
        assert!(guardada.refresh_token.is_empty());
    }
}
