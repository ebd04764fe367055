//! Business configuration: company data, VAT, payment methods, dashboard

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Company singleton printed on invoices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Empresa {
    #[serde(default)]
    pub id: Option<i32>,
    pub nombre_empresa: Option<String>,
    pub rif: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub email: Option<String>,
    pub mensaje_factura: Option<String>,
}

/// `PUT /api/empresa` payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmpresaInput {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre_empresa: String,
    #[validate(length(max = 20))]
    pub rif: Option<String>,
    #[validate(length(max = 100))]
    pub telefono: Option<String>,
    #[validate(length(max = 500))]
    pub direccion: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 500))]
    pub mensaje_factura: Option<String>,
}

/// `GET/PUT /api/configuracion/negocio` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigNegocio {
    pub iva_rate: Decimal,
}

/// VAT rate row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TasaIva {
    pub id: i32,
    pub tasa: Decimal,
    pub descripcion: Option<String>,
    pub tipo: String,
    pub estado: String,
    pub fecha_actualizacion: Option<DateTime<Utc>>,
}

/// Payment method configuration row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MetodoPago {
    pub id: String,
    pub nombre: String,
    pub habilitado: bool,
}

/// `PUT /api/configuracion/metodos-pago/{metodo}` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetodoPagoUpdate {
    pub habilitado: bool,
}

/// Payment methods seeded when the table is empty, as `(metodo_id, nombre)`
pub const METODOS_PAGO_DEFAULT: [(&str, &str); 7] = [
    ("efectivo_bs", "Efectivo Bs"),
    ("efectivo_usd", "Efectivo USD"),
    ("tarjeta", "Tarjeta"),
    ("transferencia", "Transferencia"),
    ("pago_movil", "Pago Móvil"),
    ("punto_venta", "Punto de Venta"),
    ("mixto", "Pago Mixto"),
];

/// `GET /api/dashboard/stats` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_productos: i64,
    pub ventas_hoy: i64,
    pub total_proveedores: i64,
    pub productos_stock_minimo: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_field_names() {
        let stats = DashboardStats {
            total_productos: 3,
            ventas_hoy: 1,
            total_proveedores: 2,
            productos_stock_minimo: 0,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalProductos"], 3);
        assert_eq!(json["ventasHoy"], 1);
        assert_eq!(json["totalProveedores"], 2);
        assert_eq!(json["productosStockMinimo"], 0);
    }

    #[test]
    fn test_default_methods_unique() {
        let mut ids: Vec<_> = METODOS_PAGO_DEFAULT.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), METODOS_PAGO_DEFAULT.len());
    }
}
