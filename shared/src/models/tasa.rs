//! Exchange rate (Bs per USD) model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stored exchange rate row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TasaCambio {
    pub id: i32,
    pub tasa_bs: Decimal,
    pub fuente: String,
    pub activo: bool,
    pub fecha_actualizacion: DateTime<Utc>,
}

/// Where the reported rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuenteTasa {
    /// The official-rate API answered with a usable value
    ApiOficial,
    /// Last stored rate or the built-in default
    Fallback,
}

impl FuenteTasa {
    pub fn nombre(&self) -> &'static str {
        match self {
            FuenteTasa::ApiOficial => "Dólar Oficial",
            FuenteTasa::Fallback => "Dólar Oficial (Fallback)",
        }
    }
}

/// `GET /api/tasa-cambio/actual` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasaActual {
    pub tasa_bs: Decimal,
    pub fecha_actualizacion: DateTime<Utc>,
    pub fuente: FuenteTasa,
    pub nombre: String,
}

impl TasaActual {
    pub fn new(tasa_bs: Decimal, fecha_actualizacion: DateTime<Utc>, fuente: FuenteTasa) -> Self {
        Self {
            tasa_bs,
            fecha_actualizacion,
            fuente,
            nombre: fuente.nombre().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuente_serialization() {
        assert_eq!(
            serde_json::to_string(&FuenteTasa::ApiOficial).unwrap(),
            "\"api_oficial\""
        );
        assert_eq!(
            serde_json::to_string(&FuenteTasa::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    #[test]
    fn test_tasa_actual_body() {
        let tasa = TasaActual::new(Decimal::new(21637, 2), Utc::now(), FuenteTasa::Fallback);
        let json = serde_json::to_value(&tasa).unwrap();
        assert_eq!(json["tasa_bs"], 216.37);
        assert_eq!(json["fuente"], "fallback");
        assert_eq!(json["nombre"], "Dólar Oficial (Fallback)");
        assert!(json["fecha_actualizacion"].is_string());
    }
}
