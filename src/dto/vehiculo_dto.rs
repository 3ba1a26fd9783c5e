use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehiculo::{ImagenVehiculo, TipoVehiculo, Vehiculo};

/// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehiculoRequest {
    pub marca_id: Uuid,
    pub modelo_id: Uuid,
    pub segmento1_id: Option<Uuid>,
    pub segmento2_id: Option<Uuid>,
    pub combustible_id: Uuid,
    pub caja_id: Uuid,
    pub estado_id: Uuid,
    pub condicion_id: Uuid,
    pub moneda_id: Uuid,
    pub vendedor_id: Uuid,

    pub tipo_vehiculo: Option<TipoVehiculo>,

    #[validate(length(max = 100))]
    pub version: Option<String>,

    #[validate(length(min = 6, max = 10))]
    pub patente: String,

    #[validate(range(min = 1900, max = 2100))]
    pub anio: i32,

    #[validate(range(min = 0))]
    pub km: Option<i32>,

    #[validate(length(min = 1, max = 50))]
    pub color: String,

    pub precio: Decimal,

    pub porcentaje_financiacion: Option<Decimal>,

    #[validate(range(min = 1))]
    pub cant_duenos: Option<i16>,

    pub vtv: Option<bool>,
    pub plan_ahorro: Option<bool>,
    pub mostrar_en_web: Option<bool>,
    pub destacar_en_web: Option<bool>,
    pub oportunidad: Option<bool>,
    pub oportunidad_grupo: Option<bool>,
    pub reventa: Option<bool>,

    pub comentario_carga: Option<String>,
}

/// Request para actualizar un vehículo
///
/// La patente es inmutable: no se acepta en updates.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehiculoRequest {
    pub marca_id: Option<Uuid>,
    pub modelo_id: Option<Uuid>,
    pub segmento1_id: Option<Uuid>,
    pub segmento2_id: Option<Uuid>,
    pub combustible_id: Option<Uuid>,
    pub caja_id: Option<Uuid>,
    pub estado_id: Option<Uuid>,
    pub condicion_id: Option<Uuid>,
    pub moneda_id: Option<Uuid>,
    pub vendedor_id: Option<Uuid>,

    pub tipo_vehiculo: Option<TipoVehiculo>,

    #[validate(length(max = 100))]
    pub version: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub anio: Option<i32>,

    #[validate(range(min = 0))]
    pub km: Option<i32>,

    #[validate(length(min = 1, max = 50))]
    pub color: Option<String>,

    pub precio: Option<Decimal>,

    pub porcentaje_financiacion: Option<Decimal>,

    #[validate(range(min = 1))]
    pub cant_duenos: Option<i16>,

    pub vtv: Option<bool>,
    pub plan_ahorro: Option<bool>,
    pub mostrar_en_web: Option<bool>,
    pub destacar_en_web: Option<bool>,
    pub oportunidad: Option<bool>,
    pub oportunidad_grupo: Option<bool>,
    pub reventa: Option<bool>,

    pub comentario_carga: Option<String>,
}

/// Filtros de búsqueda de vehículos
#[derive(Debug, Default, Deserialize)]
pub struct VehiculoFilters {
    pub tipo_vehiculo: Option<TipoVehiculo>,

    pub precio_min: Option<Decimal>,
    pub precio_max: Option<Decimal>,
    pub anio_min: Option<i32>,
    pub anio_max: Option<i32>,
    pub km_min: Option<i32>,
    pub km_max: Option<i32>,

    pub marca_id: Option<Uuid>,
    pub modelo_id: Option<Uuid>,
    pub combustible_id: Option<Uuid>,
    pub caja_id: Option<Uuid>,
    pub estado_id: Option<Uuid>,
    pub condicion_id: Option<Uuid>,
    pub moneda_id: Option<Uuid>,
    pub segmento_id: Option<Uuid>,
    pub vendedor_id: Option<Uuid>,

    pub vendido: Option<bool>,
    pub reservado: Option<bool>,
    pub mostrar_en_web: Option<bool>,
    pub destacar_en_web: Option<bool>,
    pub oportunidad: Option<bool>,
    pub publicado_en_ml: Option<bool>,
    pub vtv: Option<bool>,

    pub disponible: Option<bool>,
    pub include_deleted: Option<bool>,

    pub search: Option<String>,

    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request para subir una imagen (se registra la URL, no el archivo)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateImagenRequest {
    #[validate(url)]
    pub url: String,

    pub orden: Option<i16>,

    pub es_principal: Option<bool>,
}

/// Response de imagen
#[derive(Debug, Serialize)]
pub struct ImagenResponse {
    pub id: String,
    pub url: String,
    pub orden: i16,
    pub es_principal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ImagenVehiculo> for ImagenResponse {
    fn from(img: ImagenVehiculo) -> Self {
        Self {
            id: img.id.to_string(),
            url: img.url,
            orden: img.orden,
            es_principal: img.es_principal,
            created_at: img.created_at,
        }
    }
}

/// Response completa de vehículo
#[derive(Debug, Serialize)]
pub struct VehiculoResponse {
    pub id: String,

    pub marca_id: String,
    pub modelo_id: String,
    pub segmento1_id: Option<String>,
    pub segmento2_id: Option<String>,
    pub combustible_id: String,
    pub caja_id: String,
    pub estado_id: String,
    pub condicion_id: String,
    pub moneda_id: String,
    pub vendedor_id: String,
    pub cargado_por: String,

    pub tipo_vehiculo: TipoVehiculo,
    pub version: String,
    pub patente: String,
    pub anio: i32,
    pub km: i32,
    pub color: String,
    pub precio: Decimal,
    pub precio_financiado: Decimal,
    pub porcentaje_financiacion: Option<Decimal>,
    pub cant_duenos: i16,

    pub vtv: bool,
    pub plan_ahorro: bool,
    pub reservado: bool,
    pub vendido: bool,
    pub disponible: bool,

    pub mostrar_en_web: bool,
    pub destacar_en_web: bool,
    pub oportunidad: bool,
    pub oportunidad_grupo: bool,
    pub reventa: bool,

    pub publicado_en_ml: bool,
    pub ml_item_id: Option<String>,
    pub ml_estado: String,
    pub ml_fecha_sync: Option<DateTime<Utc>>,
    pub ml_error: String,
    pub ml_permalink: String,

    pub comentario_carga: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagenes: Option<Vec<ImagenResponse>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VehiculoResponse {
    pub fn from_vehiculo(v: Vehiculo, imagenes: Option<Vec<ImagenVehiculo>>) -> Self {
        Self {
            id: v.id.to_string(),
            marca_id: v.marca_id.to_string(),
            modelo_id: v.modelo_id.to_string(),
            segmento1_id: v.segmento1_id.map(|s| s.to_string()),
            segmento2_id: v.segmento2_id.map(|s| s.to_string()),
            combustible_id: v.combustible_id.to_string(),
            caja_id: v.caja_id.to_string(),
            estado_id: v.estado_id.to_string(),
            condicion_id: v.condicion_id.to_string(),
            moneda_id: v.moneda_id.to_string(),
            vendedor_id: v.vendedor_id.to_string(),
            cargado_por: v.cargado_por.to_string(),
            tipo_vehiculo: v.tipo_vehiculo,
            precio_financiado: v.precio_financiado(),
            disponible: v.disponible(),
            version: v.version,
            patente: v.patente,
            anio: v.anio,
            km: v.km,
            color: v.color,
            precio: v.precio,
            porcentaje_financiacion: v.porcentaje_financiacion,
            cant_duenos: v.cant_duenos,
            vtv: v.vtv,
            plan_ahorro: v.plan_ahorro,
            reservado: v.reservado,
            vendido: v.vendido,
            mostrar_en_web: v.mostrar_en_web,
            destacar_en_web: v.destacar_en_web,
            oportunidad: v.oportunidad,
            oportunidad_grupo: v.oportunidad_grupo,
            reventa: v.reventa,
            publicado_en_ml: v.publicado_en_ml,
            ml_item_id: v.ml_item_id,
            ml_estado: v.ml_estado,
            ml_fecha_sync: v.ml_fecha_sync,
            ml_error: v.ml_error,
            ml_permalink: v.ml_permalink,
            comentario_carga: v.comentario_carga,
            imagenes: imagenes.map(|imgs| imgs.into_iter().map(ImagenResponse::from).collect()),
            created_at: v.created_at,
            updated_at: v.updated_at,
            deleted_at: v.deleted_at,
        }
    }
}

impl From<Vehiculo> for VehiculoResponse {
    fn from(v: Vehiculo) -> Self {
        Self::from_vehiculo(v, None)
    }
}

/// Request de publicación en MercadoLibre desde un vehículo
#[derive(Debug, Default, Deserialize)]
pub struct PublicarMlRequest {
    pub titulo: Option<String>,
    pub puertas: Option<String>,
}
