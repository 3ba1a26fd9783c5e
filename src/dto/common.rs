use serde::Serialize;

/// Response genérica de la API
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

/// Página de resultados con el total para el frontend
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub results: Vec<T>,
}

