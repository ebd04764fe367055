//! Product transformation (one origin product into several outputs)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One output of a transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformacionSalida {
    pub producto_destino_id: i32,
    pub cantidad_destino: Decimal,
}

/// `POST /api/transformaciones` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformacionCreate {
    pub producto_origen_id: i32,
    pub cantidad_origen: Decimal,
    /// Weighed origin; defaults to `cantidad_origen`
    pub peso_origen_real: Option<Decimal>,
    pub observaciones: Option<String>,
    #[serde(default)]
    pub detalles: Vec<TransformacionSalida>,
}

impl TransformacionCreate {
    pub fn peso_real(&self) -> Decimal {
        self.peso_origen_real.unwrap_or(self.cantidad_origen)
    }
}

/// `POST /api/transformaciones` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformacionCreada {
    pub message: String,
    pub id: i32,
}

/// History row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Transformacion {
    pub id: i32,
    pub fecha_transformacion: DateTime<Utc>,
    pub cantidad_origen: Decimal,
    pub peso_origen_real: Option<Decimal>,
    pub observaciones: Option<String>,
    pub nombre_origen: String,
    pub usuario: String,
}

/// Output row of a stored transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TransformacionDetalle {
    pub producto_destino_id: i32,
    pub cantidad_destino: Decimal,
    pub nombre_producto: String,
}
