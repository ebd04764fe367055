//! Compra Model (supplier purchases)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::configuracion::Empresa;
use super::venta::calcular_iva;

/// Purchase status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoCompra {
    Pendiente,
    Parcial,
    Recibida,
}

impl EstadoCompra {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoCompra::Pendiente => "pendiente",
            EstadoCompra::Parcial => "parcial",
            EstadoCompra::Recibida => "recibida",
        }
    }

    /// Status after a receipt, from `(ordered, received)` quantities per line.
    pub fn tras_recepcion(lineas: &[(Decimal, Decimal)]) -> Self {
        if lineas.iter().any(|(ordered, received)| received < ordered) {
            EstadoCompra::Parcial
        } else {
            EstadoCompra::Recibida
        }
    }
}

/// Purchase header joined with supplier and buyer names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Compra {
    pub id: i32,
    pub id_proveedor: Option<i32>,
    pub id_usuario: Option<i32>,
    pub num_factura: Option<String>,
    pub observaciones: Option<String>,
    pub estado: String,
    pub total: Decimal,
    pub fecha_compra: DateTime<Utc>,
    pub fecha_recepcion: Option<DateTime<Utc>>,
    pub proveedor_nombre: Option<String>,
    pub usuario_nombre: Option<String>,
}

/// Purchase line joined with its product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DetalleCompra {
    pub id: i32,
    pub id_compra: i32,
    pub id_producto: i32,
    pub cantidad: Decimal,
    pub precio_compra: Decimal,
    pub cantidad_recibida: Decimal,
    pub lote: Option<String>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub producto_nombre: Option<String>,
    pub unidad_medida: Option<String>,
}

impl DetalleCompra {
    pub fn total_linea(&self) -> Decimal {
        self.cantidad * self.precio_compra
    }
}

/// `GET /api/compras/{id}` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompraConDetalles {
    pub compra: Compra,
    pub detalles: Vec<DetalleCompra>,
}

/// `GET /api/compras` filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompraQuery {
    pub estado: Option<String>,
    pub proveedor_id: Option<i32>,
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
}

/// Requested purchase line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetalleCompraInput {
    pub id_producto: i32,
    pub cantidad: Decimal,
    pub precio_compra: Decimal,
}

/// `POST /api/compras` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompraCreate {
    pub id_proveedor: i32,
    pub num_factura: Option<String>,
    pub observaciones: Option<String>,
    #[serde(default)]
    pub detalles: Vec<DetalleCompraInput>,
}

/// Received quantity for one purchase line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetalleRecibido {
    pub id_detalle: i32,
    /// Cumulative quantity received so far for the line
    pub cantidad_recibida: Decimal,
    pub lote: Option<String>,
    pub fecha_vencimiento: Option<NaiveDate>,
}

/// `PUT /api/compras/{id}/recibir` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecibirCompra {
    #[serde(default)]
    pub detalles_recibidos: Vec<DetalleRecibido>,
}

/// `PUT /api/compras/{id}/recibir` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecepcionResponse {
    pub mensaje: String,
    pub estado: EstadoCompra,
}

impl RecepcionResponse {
    pub fn new(estado: EstadoCompra) -> Self {
        let mensaje = match estado {
            EstadoCompra::Recibida => "Compra completamente recibida",
            _ => "Compra recibida parcialmente",
        };
        Self {
            mensaje: mensaje.to_string(),
            estado,
        }
    }
}

// ── Purchase invoice ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturaEmpresa {
    pub nombre: String,
    pub rif: String,
    pub telefono: String,
    pub direccion: String,
    pub mensaje: String,
}

impl From<Option<Empresa>> for FacturaEmpresa {
    fn from(empresa: Option<Empresa>) -> Self {
        let empresa = empresa.unwrap_or_default();
        let or = |v: Option<String>, default: &str| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            nombre: or(empresa.nombre_empresa, "Na'Guara"),
            rif: or(empresa.rif, "J-123456789"),
            telefono: or(empresa.telefono, "(0412) 123-4567"),
            direccion: or(empresa.direccion, "Caracas, Venezuela"),
            mensaje: or(empresa.mensaje_factura, "¡Gracias por su compra!"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FacturaProveedor {
    pub nombre: Option<String>,
    pub contacto: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturaCompraInfo {
    pub id: i32,
    pub numero_factura: String,
    pub fecha_compra: DateTime<Utc>,
    pub fecha_recepcion: Option<DateTime<Utc>>,
    pub estado: String,
    pub comprador: Option<String>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturaLinea {
    pub producto: Option<String>,
    pub unidad_medida: Option<String>,
    pub cantidad: Decimal,
    pub precio_unitario: Decimal,
    pub total_linea: Decimal,
    pub lote: Option<String>,
    pub fecha_vencimiento: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturaTotales {
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub iva_rate: Decimal,
    pub total: Decimal,
}

/// `GET /api/compras/{id}/factura` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacturaCompra {
    pub empresa: FacturaEmpresa,
    pub proveedor: FacturaProveedor,
    pub compra: FacturaCompraInfo,
    pub detalles: Vec<FacturaLinea>,
    pub totales: FacturaTotales,
}

impl FacturaCompra {
    pub fn new(
        compra: Compra,
        proveedor: FacturaProveedor,
        detalles: Vec<DetalleCompra>,
        empresa: Option<Empresa>,
        iva_rate: Decimal,
    ) -> Self {
        let subtotal: Decimal = detalles.iter().map(DetalleCompra::total_linea).sum();
        let iva = calcular_iva(subtotal, iva_rate);
        let numero_factura = compra
            .num_factura
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| numero_compra(compra.id));
        Self {
            empresa: empresa.into(),
            proveedor,
            compra: FacturaCompraInfo {
                id: compra.id,
                numero_factura,
                fecha_compra: compra.fecha_compra,
                fecha_recepcion: compra.fecha_recepcion,
                estado: compra.estado,
                comprador: compra.usuario_nombre,
                observaciones: compra.observaciones,
            },
            detalles: detalles
                .into_iter()
                .map(|d| FacturaLinea {
                    total_linea: d.total_linea(),
                    producto: d.producto_nombre,
                    unidad_medida: d.unidad_medida,
                    cantidad: d.cantidad,
                    precio_unitario: d.precio_compra,
                    lote: d.lote,
                    fecha_vencimiento: d.fecha_vencimiento,
                })
                .collect(),
            totales: FacturaTotales {
                subtotal,
                iva,
                iva_rate,
                total: subtotal + iva,
            },
        }
    }
}

/// Fallback purchase document number, e.g. `COMP-000042`
pub fn numero_compra(id: i32) -> String {
    format!("COMP-{id:06}")
}

// ── Statistics ──────────────────────────────────────────────────────

/// `?mes=&año=` filter of the purchase statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstadisticasQuery {
    pub mes: Option<u32>,
    #[serde(rename = "año")]
    pub anio: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EstadisticasCompras {
    pub total_compras: i64,
    pub total_invertido: Decimal,
    pub promedio_compra: Decimal,
    pub compras_pendientes: i64,
    pub compras_recibidas: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TopProveedor {
    pub id: i32,
    pub nombre: String,
    pub total_compras: i64,
    pub total_comprado: Decimal,
}

/// `GET /api/compras/stats/estadisticas` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstadisticasResponse {
    pub estadisticas: EstadisticasCompras,
    pub top_proveedores: Vec<TopProveedor>,
}
