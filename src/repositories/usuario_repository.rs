use sqlx::PgPool;
use uuid::Uuid;

use crate::models::usuario::Usuario;
use crate::utils::errors::AppError;

pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(usuario)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }

    /// Primer usuario activo del sistema. Se usa como fallback en el
    /// callback OAuth2 cuando el state no identifica al usuario.
    pub async fn find_first_active(&self) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios WHERE is_active = true ORDER BY created_at LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }
}
