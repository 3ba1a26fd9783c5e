//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    // Credenciales de la app de MercadoLibre
    pub ml_app_id: String,
    pub ml_secret_key: String,
    pub ml_redirect_uri: String,
    // URLs base de MercadoLibre (overrideables para testing)
    pub ml_api_base_url: String,
    pub ml_auth_base_url: String,
    // URLs propias
    pub frontend_url: String,
    pub media_base_url: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiration: env::var("JWT_EXPIRATION")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .expect("JWT_EXPIRATION must be a valid number"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
            ml_app_id: env::var("ML_APP_ID").expect("ML_APP_ID must be set"),
            ml_secret_key: env::var("ML_SECRET_KEY").expect("ML_SECRET_KEY must be set"),
            ml_redirect_uri: env::var("ML_REDIRECT_URI").expect("ML_REDIRECT_URI must be set"),
            ml_api_base_url: env::var("ML_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.mercadolibre.com".to_string()),
            ml_auth_base_url: env::var("ML_AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://auth.mercadolibre.com.ar".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            media_base_url: env::var("MEDIA_BASE_URL").unwrap_or_default(),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
