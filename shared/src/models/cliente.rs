//! Cliente Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Client entity (identified by cédula or RIF)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cliente {
    pub id: i32,
    pub cedula_rif: String,
    pub nombre: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub estado: String,
}

/// Create / update client payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClienteInput {
    #[validate(length(min = 1, max = 20, message = "Faltan datos"))]
    pub cedula_rif: String,
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    #[validate(length(max = 100))]
    pub telefono: Option<String>,
    #[validate(length(max = 500))]
    pub direccion: Option<String>,
}

/// `GET /api/clientes` filters; `nombre` wins over `cedula`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClienteQuery {
    pub nombre: Option<String>,
    pub cedula: Option<String>,
}

/// Search mode derived from [`ClienteQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClienteFiltro {
    Todos,
    /// ILIKE on nombre or direccion
    Nombre(String),
    /// ILIKE on cedula_rif
    Cedula(String),
}

impl ClienteQuery {
    pub fn filtro(&self) -> ClienteFiltro {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        if let Some(nombre) = non_empty(&self.nombre) {
            ClienteFiltro::Nombre(nombre)
        } else if let Some(cedula) = non_empty(&self.cedula) {
            ClienteFiltro::Cedula(cedula)
        } else {
            ClienteFiltro::Todos
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtro_precedence() {
        let q = ClienteQuery {
            nombre: Some("Ana".into()),
            cedula: Some("V-1".into()),
        };
        assert_eq!(q.filtro(), ClienteFiltro::Nombre("Ana".into()));

        let q = ClienteQuery {
            nombre: Some("  ".into()),
            cedula: Some("V-1".into()),
        };
        assert_eq!(q.filtro(), ClienteFiltro::Cedula("V-1".into()));

        assert_eq!(ClienteQuery::default().filtro(), ClienteFiltro::Todos);
    }
}
