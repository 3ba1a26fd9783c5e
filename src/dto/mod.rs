//! DTOs de la API
//!
//! Requests y responses serializables de cada recurso.

pub mod auth_dto;
pub mod common;
pub mod mercadolibre_dto;
pub mod parametro_dto;
pub mod vehiculo_dto;
pub mod vendedor_dto;
