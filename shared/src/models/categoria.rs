//! Categoria Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Categoria {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
}

/// Create / update category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoriaInput {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub descripcion: String,
}
