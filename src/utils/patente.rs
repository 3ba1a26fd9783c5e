//! Extracción y normalización de patentes argentinas
//!
//! Soporta el formato viejo (ABC123) y el nuevo (AB123CD), con o sin
//! espacios internos. Se usa para el matching entre publicaciones de
//! MercadoLibre y vehículos del inventario.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Nuevo: AA 123 BB o AA123BB
    static ref PATENTE_NUEVA: Regex =
        Regex::new(r"\b([A-Z]{2}\s?\d{3}\s?[A-Z]{2})\b").unwrap();
    // Viejo: ABC 123 o ABC123
    static ref PATENTE_VIEJA: Regex =
        Regex::new(r"\b([A-Z]{3}\s?\d{3})\b").unwrap();
}

/// Normaliza una patente: sin espacios ni guiones, en mayúsculas.
pub fn normalizar_patente(patente: &str) -> String {
    patente
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

/// Extrae una patente de un título de publicación.
///
/// Prueba primero el formato nuevo y después el viejo. Retorna la
/// patente normalizada, o `None` si el título no contiene ninguna.
pub fn extraer_patente_de_titulo(titulo: &str) -> Option<String> {
    let titulo_upper = titulo.to_uppercase();

    for pattern in [&*PATENTE_NUEVA, &*PATENTE_VIEJA] {
        if let Some(cap) = pattern.captures(&titulo_upper) {
            return Some(normalizar_patente(&cap[1]));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formato_nuevo_sin_espacios() {
        assert_eq!(
            extraer_patente_de_titulo("Ford Focus AB123CD"),
            Some("AB123CD".to_string())
        );
    }

    #[test]
    fn test_formato_nuevo_con_espacios() {
        assert_eq!(
            extraer_patente_de_titulo("Toyota Hilux 2021 AB 123 CD impecable"),
            Some("AB123CD".to_string())
        );
    }

    #[test]
    fn test_formato_viejo_con_espacio() {
        assert_eq!(
            extraer_patente_de_titulo("Peugeot 308 ABC 123"),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_formato_viejo_sin_espacio() {
        assert_eq!(
            extraer_patente_de_titulo("Chevrolet Corsa ABC123 full"),
            Some("ABC123".to_string())
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            extraer_patente_de_titulo("vw gol ab123cd"),
            Some("AB123CD".to_string())
        );
    }

    #[test]
    fn test_titulo_sin_patente() {
        assert_eq!(extraer_patente_de_titulo("Fiat Cronos 1.3 GSE 2022"), None);
    }

    #[test]
    fn test_normalizar() {
        assert_eq!(normalizar_patente("ab 123-cd"), "AB123CD");
        assert_eq!(normalizar_patente("ABC 123"), "ABC123");
    }
}
