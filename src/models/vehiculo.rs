//! Modelo de Vehículo
//!
//! Este módulo contiene el struct Vehiculo, la entidad central del
//! inventario, y sus imágenes asociadas. Incluye los campos espejo de
//! la sincronización con MercadoLibre y el soft delete vía deleted_at.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Máximo de imágenes por vehículo
pub const MAX_IMAGENES_POR_VEHICULO: i64 = 15;

/// Tipo de vehículo - mapea al ENUM tipo_vehiculo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "tipo_vehiculo", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoVehiculo {
    Auto,
    Camioneta,
    Camion,
    Moto,
}

impl TipoVehiculo {
    /// Categoría de MercadoLibre Argentina (MLA) para este tipo
    pub fn ml_category_id(&self) -> &'static str {
        match self {
            TipoVehiculo::Auto | TipoVehiculo::Camioneta => "MLA1744",
            TipoVehiculo::Moto => "MLA1763",
            TipoVehiculo::Camion => "MLA1753",
        }
    }

    /// Cantidad de puertas por defecto para la publicación
    pub fn puertas_default(&self) -> &'static str {
        match self {
            TipoVehiculo::Auto | TipoVehiculo::Camioneta => "4",
            TipoVehiculo::Camion => "2",
            TipoVehiculo::Moto => "0",
        }
    }
}

/// Vehículo principal - mapea a la tabla vehiculos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehiculo {
    pub id: Uuid,

    // Relaciones con parámetros
    pub marca_id: Uuid,
    pub modelo_id: Uuid,
    pub segmento1_id: Option<Uuid>,
    pub segmento2_id: Option<Uuid>,
    pub combustible_id: Uuid,
    pub caja_id: Uuid,
    pub estado_id: Uuid,
    pub condicion_id: Uuid,
    pub moneda_id: Uuid,

    // Relaciones con vendedores y usuarios
    pub vendedor_id: Uuid,
    pub cargado_por: Uuid,

    // Campos generales
    pub tipo_vehiculo: TipoVehiculo,
    pub version: String,
    pub patente: String,
    pub anio: i32,
    pub km: i32,
    pub color: String,
    pub precio: Decimal,
    pub porcentaje_financiacion: Option<Decimal>,
    pub cant_duenos: i16,

    // Estado del vehículo
    pub vtv: bool,
    pub plan_ahorro: bool,
    pub reservado: bool,
    pub vendido: bool,

    // Visibilidad web
    pub mostrar_en_web: bool,
    pub destacar_en_web: bool,
    pub oportunidad: bool,
    pub oportunidad_grupo: bool,
    pub reventa: bool,

    // MercadoLibre - tracking de sincronización
    pub publicado_en_ml: bool,
    pub ml_item_id: Option<String>,
    pub ml_estado: String,
    pub ml_fecha_sync: Option<DateTime<Utc>>,
    pub ml_error: String,
    pub ml_permalink: String,

    // Otros
    pub comentario_carga: String,

    // Auditoría
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Vehiculo {
    /// Verifica si el vehículo fue eliminado (soft delete)
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Verifica si el vehículo está disponible para venta
    pub fn disponible(&self) -> bool {
        !self.vendido && !self.reservado && !self.is_deleted()
    }

    /// Calcula precio con financiación si aplica
    pub fn precio_financiado(&self) -> Decimal {
        match self.porcentaje_financiacion {
            Some(porcentaje) => self.precio + self.precio * porcentaje / Decimal::from(100),
            None => self.precio,
        }
    }
}

/// Imagen asociada a un vehículo - mapea a la tabla imagenes_vehiculo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImagenVehiculo {
    pub id: Uuid,
    pub vehiculo_id: Uuid,
    pub url: String,
    pub orden: i16,
    pub es_principal: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn vehiculo_base() -> Vehiculo {
        Vehiculo {
            id: Uuid::new_v4(),
            marca_id: Uuid::new_v4(),
            modelo_id: Uuid::new_v4(),
            segmento1_id: None,
            segmento2_id: None,
            combustible_id: Uuid::new_v4(),
            caja_id: Uuid::new_v4(),
            estado_id: Uuid::new_v4(),
            condicion_id: Uuid::new_v4(),
            moneda_id: Uuid::new_v4(),
            vendedor_id: Uuid::new_v4(),
            cargado_por: Uuid::new_v4(),
            tipo_vehiculo: TipoVehiculo::Auto,
            version: String::new(),
            patente: "AB123CD".to_string(),
            anio: 2020,
            km: 45000,
            color: "Gris".to_string(),
            precio: Decimal::from(10_000_000),
            porcentaje_financiacion: None,
            cant_duenos: 1,
            vtv: false,
            plan_ahorro: false,
            reservado: false,
            vendido: false,
            mostrar_en_web: true,
            destacar_en_web: false,
            oportunidad: false,
            oportunidad_grupo: false,
            reventa: false,
            publicado_en_ml: false,
            ml_item_id: None,
            ml_estado: String::new(),
            ml_fecha_sync: None,
            ml_error: String::new(),
            ml_permalink: String::new(),
            comentario_carga: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_disponible() {
        let mut v = vehiculo_base();
        assert!(v.disponible());

        v.reservado = true;
        assert!(!v.disponible());

        v.reservado = false;
        v.deleted_at = Some(Utc::now());
        assert!(!v.disponible());
    }

    #[test]
    fn test_precio_financiado() {
        let mut v = vehiculo_base();
        assert_eq!(v.precio_financiado(), Decimal::from(10_000_000));

        v.porcentaje_financiacion = Some(Decimal::from(10));
        assert_eq!(v.precio_financiado(), Decimal::from(11_000_000));
    }

    #[test]
    fn test_categoria_ml_por_tipo() {
        assert_eq!(TipoVehiculo::Auto.ml_category_id(), "MLA1744");
        assert_eq!(TipoVehiculo::Moto.ml_category_id(), "MLA1763");
        assert_eq!(TipoVehiculo::Camion.ml_category_id(), "MLA1753");
    }
}
