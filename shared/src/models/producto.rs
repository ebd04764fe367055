//! Producto Model

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pagination::Pagination;

/// Product row joined with category / supplier / VAT names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Producto {
    pub id: i32,
    pub nombre: String,
    /// Price in Bolívares
    pub precio_venta: Decimal,
    pub precio_dolares: Option<Decimal>,
    pub costo_compra: Option<Decimal>,
    /// Fractional (kg)
    pub stock: Decimal,
    pub stock_minimo: Decimal,
    pub unidad_medida: String,
    pub categoria_id: Option<i32>,
    pub id_provedores: Option<i32>,
    pub id_tasa_iva: Option<i32>,
    pub estado: String,
    pub categoria: Option<String>,
    pub proveedor: Option<String>,
    pub tasa_iva: Option<Decimal>,
}

/// Product as listed to the POS, with USD price resolved at the current rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductoListado {
    #[serde(flatten)]
    pub producto: Producto,
    pub tasa_cambio_actual: Decimal,
}

impl ProductoListado {
    /// Fill `precio_dolares` from the stored value or from `precio_venta / tasa`.
    pub fn new(mut producto: Producto, tasa: Decimal) -> Self {
        let usd = producto
            .precio_dolares
            .or_else(|| precio_en_dolares(producto.precio_venta, tasa));
        producto.precio_dolares = usd.map(round_money);
        Self {
            producto,
            tasa_cambio_actual: tasa,
        }
    }
}

/// `GET /api/productos` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductoPage {
    pub productos: Vec<ProductoListado>,
    pub pagination: Pagination,
}

/// Query string of the product listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductoQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub categoria_id: Option<i32>,
    pub search: Option<String>,
    /// Only products at or below their minimum stock
    #[serde(default)]
    pub stock_alerts: bool,
    /// Include products with zero stock (hidden by default)
    #[serde(default)]
    pub include_zero_stock: bool,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductoCreate {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    pub precio_venta: Decimal,
    pub precio_dolares: Option<Decimal>,
    pub costo_compra: Option<Decimal>,
    #[serde(default)]
    pub stock: Decimal,
    pub stock_minimo: Option<Decimal>,
    #[validate(length(min = 1, max = 20))]
    pub unidad_medida: String,
    pub categoria_id: Option<i32>,
    pub id_provedores: Option<i32>,
    pub id_tasa_iva: Option<i32>,
}

/// Update product payload
///
/// `motivo_ajuste` is mandatory when `stock` differs from the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductoUpdate {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    pub precio_venta: Decimal,
    pub precio_dolares: Option<Decimal>,
    pub costo_compra: Option<Decimal>,
    pub stock: Decimal,
    pub stock_minimo: Option<Decimal>,
    #[validate(length(min = 1, max = 20))]
    pub unidad_medida: String,
    pub categoria_id: Option<i32>,
    pub id_provedores: Option<i32>,
    pub id_tasa_iva: Option<i32>,
    pub estado: Option<String>,
    #[validate(length(max = 500))]
    pub motivo_ajuste: Option<String>,
}

/// `PUT /api/productos/{id}/stock` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDecrement {
    pub cantidad: Decimal,
}

/// Price in USD at `tasa` Bs/USD; `None` for a non-positive rate.
pub fn precio_en_dolares(precio_bs: Decimal, tasa: Decimal) -> Option<Decimal> {
    if tasa <= Decimal::ZERO {
        return None;
    }
    precio_bs.checked_div(tasa).map(round_money)
}

/// Round to 2 decimal places, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producto(precio_dolares: Option<Decimal>) -> Producto {
        Producto {
            id: 1,
            nombre: "Pechuga".into(),
            precio_venta: Decimal::from(1000),
            precio_dolares,
            costo_compra: None,
            stock: Decimal::new(125, 1),
            stock_minimo: Decimal::from(2),
            unidad_medida: "kg".into(),
            categoria_id: None,
            id_provedores: None,
            id_tasa_iva: None,
            estado: "Activo".into(),
            categoria: Some("Pollo".into()),
            proveedor: None,
            tasa_iva: None,
        }
    }

    #[test]
    fn test_precio_en_dolares() {
        assert_eq!(precio_en_dolares(Decimal::from(1000), Decimal::new(21637, 2)), Some(Decimal::new(462, 2)));
        assert_eq!(precio_en_dolares(Decimal::from(100), Decimal::ZERO), None);
    }

    #[test]
    fn test_listado_computes_missing_usd() {
        let listed = ProductoListado::new(producto(None), Decimal::from(200));
        assert_eq!(listed.producto.precio_dolares, Some(Decimal::new(500, 2)));
        assert_eq!(listed.tasa_cambio_actual, Decimal::from(200));
    }

    #[test]
    fn test_listado_keeps_stored_usd() {
        let listed = ProductoListado::new(producto(Some(Decimal::new(4999, 3))), Decimal::from(200));
        assert_eq!(listed.producto.precio_dolares, Some(Decimal::new(500, 2)));
    }

    #[test]
    fn test_listado_serializes_flat() {
        let listed = ProductoListado::new(producto(None), Decimal::from(200));
        let json = serde_json::to_value(&listed).unwrap();
        assert_eq!(json["nombre"], "Pechuga");
        assert_eq!(json["precio_dolares"], 5.0);
        assert_eq!(json["tasa_cambio_actual"], 200.0);
    }

    #[test]
    fn test_query_flags_default_false() {
        let q: ProductoQuery = serde_json::from_str("{}").unwrap();
        assert!(!q.stock_alerts);
        assert!(!q.include_zero_stock);
    }
}
