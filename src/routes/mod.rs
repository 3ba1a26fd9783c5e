//! Rutas de la API

pub mod auth_routes;
pub mod mercadolibre_routes;
pub mod parametro_routes;
pub mod vehiculo_routes;
pub mod vendedor_routes;
