//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula las queries SQL de una entidad.

pub mod mercadolibre_repository;
pub mod parametro_repository;
pub mod usuario_repository;
pub mod vehiculo_repository;
pub mod vendedor_repository;
