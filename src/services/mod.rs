//! Servicios de negocio

pub mod auth_service;
pub mod jwt_service;
pub mod ml_client;
pub mod ml_sync_service;
