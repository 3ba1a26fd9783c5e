//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use reqwest::Client;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;

/// State pendiente del flujo OAuth2 de MercadoLibre.
///
/// Se emite al generar la URL de autorización y se consume una sola vez
/// en el callback. Expira a los 15 minutos.
#[derive(Clone, Debug)]
pub struct OAuthPendingState {
    pub user_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl OAuthPendingState {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now() > self.created_at + chrono::Duration::minutes(15)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub http_client: Client,
    pub oauth_states: Arc<RwLock<HashMap<String, OAuthPendingState>>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            pool,
            config,
            http_client: Client::new(),
            oauth_states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registrar un state pendiente de autorización OAuth2
    pub async fn store_oauth_state(&self, state: String, user_id: Uuid) {
        let mut states = self.oauth_states.write().await;
        states.retain(|_, s| !s.is_expired());
        states.insert(state, OAuthPendingState::new(user_id));
    }

    /// Consumir un state del callback OAuth2 (un solo uso)
    pub async fn take_oauth_state(&self, state: &str) -> Option<OAuthPendingState> {
        let mut states = self.oauth_states.write().await;
        states.remove(state).filter(|s| !s.is_expired())
    }
}
