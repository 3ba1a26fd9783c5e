//! Fixtures compartidas para los tests que corren contra la base.
//!
//! Cada fixture usa los repositorios reales para que los datos pasen por
//! el mismo camino que en producción. Los nombres llevan un sufijo único
//! para poder crear más de un juego de datos en el mismo test.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::dto::vehiculo_dto::CreateVehiculoRequest;
use crate::dto::vendedor_dto::CreateVendedorRequest;
use crate::models::mercadolibre::{MlCredential, MlPublicationStatus};
use crate::models::parametro::TipoParametro;
use crate::models::usuario::Usuario;
use crate::models::vehiculo::Vehiculo;
use crate::repositories::mercadolibre_repository::{
    MercadoLibreRepository, UpsertPublicationData,
};
use crate::repositories::parametro_repository::ParametroRepository;
use crate::repositories::vehiculo_repository::VehiculoRepository;
use crate::repositories::vendedor_repository::VendedorRepository;

pub async fn crear_usuario(pool: &PgPool) -> Usuario {
    sqlx::query_as::<_, Usuario>(
        r#"
        INSERT INTO usuarios (
            id, email, nombre, apellido, rol, password_hash, is_active,
            created_at, updated_at
        )
        VALUES ($1, $2, 'Ana', 'Pérez', 'admin', '$2b$12$hash.de.prueba', true, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(format!("ana-{}@concesionaria.test", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .expect("no se pudo crear el usuario de prueba")
}

/// Crea un vehículo con todos sus parámetros de catálogo y su vendedor.
pub async fn crear_vehiculo(pool: &PgPool, cargado_por: Uuid, patente: &str) -> Vehiculo {
    let parametros = ParametroRepository::new(pool.clone());
    let sufijo = Uuid::new_v4();

    let marca = parametros
        .create(TipoParametro::Marcas, &format!("Ford {}", sufijo), true, 0)
        .await
        .expect("marca de prueba");
    let modelo = parametros
        .create_modelo(marca.id, &format!("Focus {}", sufijo), true, 0)
        .await
        .expect("modelo de prueba");
    let combustible = parametros
        .create(TipoParametro::Combustibles, &format!("Nafta {}", sufijo), true, 0)
        .await
        .expect("combustible de prueba");
    let caja = parametros
        .create(TipoParametro::Cajas, &format!("Manual {}", sufijo), true, 0)
        .await
        .expect("caja de prueba");
    let estado = parametros
        .create(TipoParametro::Estados, &format!("Usado {}", sufijo), true, 0)
        .await
        .expect("estado de prueba");
    let condicion = parametros
        .create(TipoParametro::Condiciones, &format!("Muy bueno {}", sufijo), true, 0)
        .await
        .expect("condición de prueba");
    let moneda = parametros
        .create(TipoParametro::Monedas, &format!("Pesos {}", sufijo), true, 0)
        .await
        .expect("moneda de prueba");

    let vendedor = VendedorRepository::new(pool.clone())
        .create(&CreateVendedorRequest {
            nombre: "Juan".to_string(),
            apellido: "García".to_string(),
            email: format!("juan-{}@vendedores.test", sufijo),
            direccion: "Av. Siempreviva 742".to_string(),
            celular: "1155550000".to_string(),
            dni: sufijo.simple().to_string()[..8].to_string(),
            tiene_cartel: None,
            comentarios: None,
        })
        .await
        .expect("vendedor de prueba");

    VehiculoRepository::new(pool.clone())
        .create(
            &CreateVehiculoRequest {
                marca_id: marca.id,
                modelo_id: modelo.id,
                segmento1_id: None,
                segmento2_id: None,
                combustible_id: combustible.id,
                caja_id: caja.id,
                estado_id: estado.id,
                condicion_id: condicion.id,
                moneda_id: moneda.id,
                vendedor_id: vendedor.id,
                tipo_vehiculo: None,
                version: None,
                patente: patente.to_string(),
                anio: 2020,
                km: Some(45_000),
                color: "Gris".to_string(),
                precio: Decimal::new(10_500_000, 0),
                porcentaje_financiacion: None,
                cant_duenos: None,
                vtv: None,
                plan_ahorro: None,
                mostrar_en_web: None,
                destacar_en_web: None,
                oportunidad: None,
                oportunidad_grupo: None,
                reventa: None,
                comentario_carga: None,
            },
            patente,
            cargado_por,
        )
        .await
        .expect("vehículo de prueba")
}

/// Credencial activa con el token lejos de la ventana de renovación.
pub async fn conectar_credencial(pool: &PgPool, user_id: Uuid) -> MlCredential {
    conectar_credencial_con_expiracion(pool, user_id, Utc::now() + Duration::hours(5)).await
}

pub async fn conectar_credencial_con_expiracion(
    pool: &PgPool,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> MlCredential {
    MercadoLibreRepository::new(pool.clone())
        .upsert_credential(
            user_id,
            "123456789",
            "CONCESIONARIA_TEST",
            "APP_USR-access-de-prueba",
            "TG-refresh-de-prueba",
            expires_at,
            "offline_access read write",
        )
        .await
        .expect("credencial de prueba")
}

/// Datos mínimos de una publicación importada, con estado activo.
pub fn datos_publicacion(ml_item_id: &str, patente_ml: &str) -> UpsertPublicationData {
    UpsertPublicationData {
        ml_item_id: ml_item_id.to_string(),
        ml_title: format!("Ford Focus 2020 {}", patente_ml),
        ml_status: MlPublicationStatus::Active,
        ml_price: Decimal::new(10_500_000, 0),
        ml_currency: "ARS".to_string(),
        ml_permalink: format!("https://auto.mercadolibre.com.ar/{}", ml_item_id),
        ml_thumbnail: String::new(),
        ml_category_id: "MLA1744".to_string(),
        ml_listing_type: "free".to_string(),
        patente_ml: patente_ml.to_string(),
        marca_ml: "Ford".to_string(),
        modelo_ml: "Focus".to_string(),
        anio_ml: Some(2020),
        km_ml: Some(45_000),
        created_from_system: false,
    }
}

/// Config de prueba apuntando la API de MercadoLibre a una URL local.
pub fn config_de_prueba(ml_api_base_url: &str) -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: "secreto-de-test".to_string(),
        jwt_expiration: 3600,
        cors_origins: Vec::new(),
        ml_app_id: "app-de-prueba".to_string(),
        ml_secret_key: "secret-de-prueba".to_string(),
        ml_redirect_uri: "http://localhost/callback".to_string(),
        ml_api_base_url: ml_api_base_url.to_string(),
        ml_auth_base_url: ml_api_base_url.to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        media_base_url: "https://media.concesionaria.test".to_string(),
    }
}

/// Levanta un servidor local que responde siempre con el mismo status y
/// body, y devuelve su URL base. Reemplaza a la API de MercadoLibre.
pub async fn servidor_api(
    status: axum::http::StatusCode,
    body: serde_json::Value,
) -> String {
    use axum::response::IntoResponse;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("no se pudo bindear el servidor de prueba");
    let addr = listener.local_addr().expect("dirección del servidor de prueba");

    let app = axum::Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, axum::Json(body)).into_response() }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}
