//! Controladores HTTP

pub mod auth_controller;
pub mod mercadolibre_controller;
pub mod parametro_controller;
pub mod vehiculo_controller;
pub mod vendedor_controller;
