//! Venta Model
//!
//! Sale header, lines and the money helpers shared by the sale
//! transaction, the sale detail view and the invoice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::producto::round_money;

pub const ESTADO_COMPLETADA: &str = "completada";

/// Default general VAT rate (percent) when none is configured
pub const DEFAULT_IVA_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 0);

/// Largest line quantity the `NUMERIC(12, 3)` columns hold (999999999.999)
pub const MAX_CANTIDAD: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 3);

/// Largest unit price the `NUMERIC(14, 2)` columns hold (999999999999.99)
pub const MAX_PRECIO: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

/// One requested sale line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetalleVentaInput {
    pub id_producto: i32,
    pub cantidad: Decimal,
    pub precio_unitario: Decimal,
}

impl DetalleVentaInput {
    /// `None` on overflow
    pub fn subtotal(&self) -> Option<Decimal> {
        self.cantidad.checked_mul(self.precio_unitario)
    }
}

/// `POST /api/ventas` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentaCreate {
    pub id_cliente: Option<i32>,
    pub metodo_pago: String,
    #[serde(default)]
    pub detalles: Vec<DetalleVentaInput>,
    /// Free-form breakdown of mixed payments
    pub detalles_pago: Option<Value>,
    pub referencia_pago: Option<String>,
    pub banco_pago: Option<String>,
    pub monto_recibido: Option<Decimal>,
}

impl VentaCreate {
    /// Σ cantidad × precio_unitario, `None` on overflow
    pub fn total(&self) -> Option<Decimal> {
        total_lineas(&self.detalles)
    }

    /// Cash payment methods compute change from `monto_recibido`.
    pub fn es_efectivo(&self) -> bool {
        self.metodo_pago.starts_with("efectivo")
    }
}

/// Σ cantidad × precio_unitario over sale lines, `None` on overflow
pub fn total_lineas(detalles: &[DetalleVentaInput]) -> Option<Decimal> {
    detalles.iter().try_fold(Decimal::ZERO, |acc, linea| {
        acc.checked_add(linea.subtotal()?)
    })
}

/// VAT amount of `subtotal` at `rate` percent, rounded to cents
pub fn calcular_iva(subtotal: Decimal, rate: Decimal) -> Decimal {
    round_money(subtotal * rate / Decimal::ONE_HUNDRED)
}

/// Summary returned after a committed sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentaCreada {
    pub id: i32,
    pub fecha_venta: DateTime<Utc>,
    pub total: Decimal,
}

/// `POST /api/ventas` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentaCreadaResponse {
    pub mensaje: String,
    pub venta: VentaCreada,
}

/// Sale listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VentaResumen {
    pub id: i32,
    pub id_usuario: Option<i32>,
    pub id_cliente: Option<i32>,
    pub metodo_pago: String,
    pub estado: String,
    pub fecha_venta: DateTime<Utc>,
    pub referencia_pago: Option<String>,
    pub banco_pago: Option<String>,
    pub monto_recibido: Option<Decimal>,
    pub cambio: Option<Decimal>,
    pub tasa_cambio: Option<Decimal>,
    pub cliente_nombre: Option<String>,
    pub total: Decimal,
}

/// Sale header joined with client and seller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct VentaCabecera {
    pub id: i32,
    pub fecha_venta: DateTime<Utc>,
    pub metodo_pago: String,
    pub estado: String,
    pub referencia_pago: Option<String>,
    pub banco_pago: Option<String>,
    pub monto_recibido: Option<Decimal>,
    pub cambio: Option<Decimal>,
    pub tasa_cambio: Option<Decimal>,
    pub cliente_nombre: Option<String>,
    pub cedula_rif: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub vendedor_nombre: Option<String>,
}

/// Stored sale line joined with its product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DetalleVenta {
    pub id: i32,
    pub id_venta: i32,
    pub id_producto: i32,
    pub cantidad: Decimal,
    pub precio_unitario: Decimal,
    pub producto_nombre: Option<String>,
    pub unidad_medida: Option<String>,
}

impl DetalleVenta {
    pub fn subtotal(&self) -> Decimal {
        self.cantidad * self.precio_unitario
    }
}

/// Client block of the sale detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClienteVenta {
    pub nombre: Option<String>,
    pub cedula_rif: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

/// `GET /api/ventas/{id}` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentaDetalle {
    pub id: i32,
    pub fecha_venta: DateTime<Utc>,
    pub cliente: ClienteVenta,
    pub vendedor: Option<String>,
    pub metodo_pago: String,
    pub tasa_cambio: Option<Decimal>,
    pub detalles: Vec<DetalleVenta>,
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub iva_rate: Decimal,
    pub total: Decimal,
}

impl VentaDetalle {
    pub fn new(cabecera: VentaCabecera, detalles: Vec<DetalleVenta>, iva_rate: Decimal) -> Self {
        let subtotal: Decimal = detalles.iter().map(DetalleVenta::subtotal).sum();
        let iva = calcular_iva(subtotal, iva_rate);
        Self {
            id: cabecera.id,
            fecha_venta: cabecera.fecha_venta,
            cliente: ClienteVenta {
                nombre: cabecera.cliente_nombre,
                cedula_rif: cabecera.cedula_rif,
                telefono: cabecera.telefono,
                direccion: cabecera.direccion,
            },
            vendedor: cabecera.vendedor_nombre,
            metodo_pago: cabecera.metodo_pago,
            tasa_cambio: cabecera.tasa_cambio,
            detalles,
            subtotal,
            iva,
            iva_rate,
            total: subtotal + iva,
        }
    }
}

/// Top-selling product of a day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TopProducto {
    pub nombre: String,
    pub cantidad: Decimal,
    pub total: Decimal,
}

/// `?fecha=YYYY-MM-DD` filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FechaQuery {
    pub fecha: Option<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linea(id: i32, cantidad: Decimal, precio: Decimal) -> DetalleVentaInput {
        DetalleVentaInput {
            id_producto: id,
            cantidad,
            precio_unitario: precio,
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let detalles = vec![
            linea(1, Decimal::new(15, 1), Decimal::from(100)), // 1.5 kg × 100
            linea(2, Decimal::from(2), Decimal::new(4525, 2)), // 2 × 45.25
        ];
        assert_eq!(total_lineas(&detalles), Some(Decimal::new(2405, 1)));
        assert_eq!(total_lineas(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_total_overflow_is_none() {
        let huge = linea(1, Decimal::from_scientific("1e20").unwrap(), Decimal::from_scientific("1e10").unwrap());
        assert_eq!(huge.subtotal(), None);
        assert_eq!(total_lineas(&[huge]), None);

        let max = linea(1, Decimal::MAX, Decimal::ONE);
        assert_eq!(total_lineas(&[max.clone(), max]), None);
    }

    #[test]
    fn test_column_limits() {
        assert_eq!(MAX_CANTIDAD.to_string(), "999999999.999");
        assert_eq!(MAX_PRECIO.to_string(), "999999999999.99");
    }

    #[test]
    fn test_calcular_iva() {
        assert_eq!(
            calcular_iva(Decimal::from(100), DEFAULT_IVA_RATE),
            Decimal::from(16)
        );
        assert_eq!(
            calcular_iva(Decimal::new(1999, 2), DEFAULT_IVA_RATE),
            Decimal::new(320, 2)
        );
    }

    #[test]
    fn test_es_efectivo() {
        let mut venta: VentaCreate =
            serde_json::from_str(r#"{"metodo_pago":"efectivo_bs","detalles":[]}"#).unwrap();
        assert!(venta.es_efectivo());
        venta.metodo_pago = "pago_movil".into();
        assert!(!venta.es_efectivo());
    }

    #[test]
    fn test_venta_detalle_totals() {
        let cabecera = VentaCabecera {
            id: 7,
            fecha_venta: Utc::now(),
            metodo_pago: "tarjeta".into(),
            estado: ESTADO_COMPLETADA.into(),
            referencia_pago: None,
            banco_pago: None,
            monto_recibido: None,
            cambio: None,
            tasa_cambio: Some(Decimal::new(21637, 2)),
            cliente_nombre: Some("Ana".into()),
            cedula_rif: Some("V-123".into()),
            telefono: None,
            direccion: None,
            vendedor_nombre: Some("Luis".into()),
        };
        let detalles = vec![DetalleVenta {
            id: 1,
            id_venta: 7,
            id_producto: 3,
            cantidad: Decimal::from(2),
            precio_unitario: Decimal::from(50),
            producto_nombre: Some("Muslo".into()),
            unidad_medida: Some("kg".into()),
        }];
        let detalle = VentaDetalle::new(cabecera, detalles, DEFAULT_IVA_RATE);
        assert_eq!(detalle.subtotal, Decimal::from(100));
        assert_eq!(detalle.iva, Decimal::from(16));
        assert_eq!(detalle.total, Decimal::from(116));
        assert_eq!(detalle.cliente.nombre.as_deref(), Some("Ana"));
    }
}
