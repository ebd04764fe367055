//! Proveedor Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Supplier entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Proveedor {
    pub id: i32,
    pub nombre: String,
    pub contacto: Option<String>,
    pub direccion: Option<String>,
}

/// Create / update supplier payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProveedorInput {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    #[validate(length(max = 100))]
    pub contacto: Option<String>,
    #[validate(length(max = 500))]
    pub direccion: Option<String>,
}
