mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Autobiliaria - Backend de inventario");
    info!("=======================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    database::run_migrations(&pool).await?;
    info!("✅ Migraciones aplicadas");

    // CORS: permisivo en desarrollo, orígenes fijos en producción
    let cors = if config.is_production() && !config.cors_origins.is_empty() {
        cors_middleware_with_origins(config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", routes::auth_routes::create_auth_router(app_state.clone()))
        .nest(
            "/api/parametros",
            routes::parametro_routes::create_parametro_router(app_state.clone()),
        )
        .nest(
            "/api/vendedores",
            routes::vendedor_routes::create_vendedor_router(app_state.clone()),
        )
        .nest(
            "/api/vehiculos",
            routes::vehiculo_routes::create_vehiculo_router(app_state.clone()),
        )
        .nest(
            "/api/mercadolibre",
            routes::mercadolibre_routes::create_mercadolibre_router(app_state.clone()),
        )
        .layer(cors)
        .with_state(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Auth:");
    info!("   POST /api/auth/login - Login");
    info!("   POST /api/auth/refresh - Renovar access token");
    info!("   GET  /api/auth/me - Usuario autenticado");
    info!("   POST /api/auth/logout - Logout");
    info!("📋 Parámetros:");
    info!("   GET/POST /api/parametros/:tipo - Listar / crear");
    info!("   GET/PUT/DELETE /api/parametros/:tipo/:id - Detalle / editar / borrar");
    info!("   GET/POST /api/parametros/modelos - Modelos por marca");
    info!("👤 Vendedores:");
    info!("   GET/POST /api/vendedores - Listar / crear");
    info!("   GET/PUT/DELETE /api/vendedores/:id - Detalle / editar / baja");
    info!("🚗 Vehículos:");
    info!("   GET/POST /api/vehiculos - Listar / crear");
    info!("   GET/PUT/DELETE /api/vehiculos/:id - Detalle / editar / soft delete");
    info!("   POST /api/vehiculos/:id/restaurar - Restaurar eliminado");
    info!("   POST /api/vehiculos/:id/marcar-vendido|marcar-reservado|marcar-disponible");
    info!("   GET/POST /api/vehiculos/:id/imagenes - Imágenes (máx. 15)");
    info!("   POST /api/vehiculos/:id/publicar-ml|pausar-ml|cerrar-ml");
    info!("🛒 MercadoLibre:");
    info!("   POST /api/mercadolibre/auth/url - Iniciar OAuth2");
    info!("   GET  /api/mercadolibre/auth/callback - Callback OAuth2");
    info!("   GET  /api/mercadolibre/status - Estado de conexión");
    info!("   DELETE /api/mercadolibre/disconnect - Desconectar cuenta");
    info!("   POST /api/mercadolibre/sync - Importar publicaciones");
    info!("   GET  /api/mercadolibre/publications - Listar publicaciones");
    info!("   GET  /api/mercadolibre/logs - Log de sincronización");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
