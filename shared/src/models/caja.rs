//! Cash-register closure (cierre de caja)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const ESTADO_CIERRE_COMPLETADO: &str = "completado";

/// `POST /api/cierre-caja` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CierreCajaCreate {
    /// Defaults to today
    pub fecha: Option<NaiveDate>,
    pub efectivo_inicial: Decimal,
    pub efectivo_final: Decimal,
    #[serde(default)]
    pub total_ventas: Decimal,
    #[serde(default)]
    pub total_ventas_efectivo: Decimal,
    #[serde(default)]
    pub total_ventas_tarjeta: Decimal,
    #[serde(default)]
    pub total_ventas_transferencia: Decimal,
    #[serde(default)]
    pub total_ventas_pago_movil: Decimal,
    /// Computed server-side when omitted
    pub diferencia: Option<Decimal>,
}

impl CierreCajaCreate {
    /// Cash counted minus cash expected (opening float + cash sales)
    pub fn diferencia_calculada(&self) -> Decimal {
        self.diferencia.unwrap_or(
            self.efectivo_final - self.efectivo_inicial - self.total_ventas_efectivo,
        )
    }
}

/// Stored closure row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CierreCaja {
    pub id: i32,
    pub fecha: NaiveDate,
    pub usuario_id: i32,
    pub efectivo_inicial: Decimal,
    pub efectivo_final: Decimal,
    pub total_ventas: Decimal,
    pub total_ventas_efectivo: Decimal,
    pub total_ventas_tarjeta: Decimal,
    pub total_ventas_transferencia: Decimal,
    pub total_ventas_pago_movil: Decimal,
    pub diferencia: Decimal,
    pub estado: String,
    pub fecha_creacion: DateTime<Utc>,
}

/// `POST /api/cierre-caja` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CierreCajaResponse {
    pub cierre: CierreCaja,
}

/// Sales total of one payment method for a day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TotalMetodo {
    pub metodo_pago: String,
    pub cantidad_ventas: i64,
    pub total: Decimal,
}

/// `GET /api/cierre-caja/resumen` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumenCaja {
    pub fecha: NaiveDate,
    pub total_ventas: Decimal,
    pub total_ventas_efectivo: Decimal,
    pub total_ventas_tarjeta: Decimal,
    pub total_ventas_transferencia: Decimal,
    pub total_ventas_pago_movil: Decimal,
    pub por_metodo: Vec<TotalMetodo>,
}

impl ResumenCaja {
    /// Fold per-method totals into the closure buckets.
    ///
    /// `punto_venta` counts as card; `mixto` only reaches `total_ventas`.
    pub fn new(fecha: NaiveDate, por_metodo: Vec<TotalMetodo>) -> Self {
        let mut resumen = Self {
            fecha,
            total_ventas: Decimal::ZERO,
            total_ventas_efectivo: Decimal::ZERO,
            total_ventas_tarjeta: Decimal::ZERO,
            total_ventas_transferencia: Decimal::ZERO,
            total_ventas_pago_movil: Decimal::ZERO,
            por_metodo: Vec::new(),
        };
        for m in &por_metodo {
            resumen.total_ventas += m.total;
            match m.metodo_pago.as_str() {
                "efectivo_bs" | "efectivo_usd" | "efectivo" => {
                    resumen.total_ventas_efectivo += m.total
                }
                "tarjeta" | "punto_venta" => resumen.total_ventas_tarjeta += m.total,
                "transferencia" => resumen.total_ventas_transferencia += m.total,
                "pago_movil" => resumen.total_ventas_pago_movil += m.total,
                _ => {}
            }
        }
        resumen.por_metodo = por_metodo;
        resumen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metodo(nombre: &str, total: i64) -> TotalMetodo {
        TotalMetodo {
            metodo_pago: nombre.into(),
            cantidad_ventas: 1,
            total: Decimal::from(total),
        }
    }

    #[test]
    fn test_diferencia_calculada() {
        let payload: CierreCajaCreate = serde_json::from_str(
            r#"{"efectivo_inicial":100,"efectivo_final":450,"total_ventas_efectivo":340}"#,
        )
        .unwrap();
        assert_eq!(payload.diferencia_calculada(), Decimal::from(10));

        let explicit = CierreCajaCreate {
            diferencia: Some(Decimal::from(-5)),
            ..payload
        };
        assert_eq!(explicit.diferencia_calculada(), Decimal::from(-5));
    }

    #[test]
    fn test_resumen_buckets() {
        let fecha = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let resumen = ResumenCaja::new(
            fecha,
            vec![
                metodo("efectivo_bs", 100),
                metodo("efectivo_usd", 50),
                metodo("punto_venta", 30),
                metodo("tarjeta", 20),
                metodo("pago_movil", 10),
                metodo("mixto", 5),
            ],
        );
        assert_eq!(resumen.total_ventas, Decimal::from(215));
        assert_eq!(resumen.total_ventas_efectivo, Decimal::from(150));
        assert_eq!(resumen.total_ventas_tarjeta, Decimal::from(50));
        assert_eq!(resumen.total_ventas_pago_movil, Decimal::from(10));
        assert_eq!(resumen.total_ventas_transferencia, Decimal::ZERO);
        assert_eq!(resumen.por_metodo.len(), 6);
    }
}
