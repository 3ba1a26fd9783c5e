//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod mercadolibre;
pub mod parametro;
pub mod usuario;
pub mod vehiculo;
pub mod vendedor;
