//! Data models
//!
//! Shared between naguara-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i32` (PostgreSQL SERIAL); money and stock are `Decimal` (NUMERIC).

pub mod backup;
pub mod caja;
pub mod categoria;
pub mod cliente;
pub mod compra;
pub mod configuracion;
pub mod pagination;
pub mod producto;
pub mod proveedor;
pub mod tasa;
pub mod transformacion;
pub mod usuario;
pub mod venta;

// Re-exports
pub use backup::*;
pub use caja::*;
pub use categoria::*;
pub use cliente::*;
pub use compra::*;
pub use configuracion::*;
pub use pagination::*;
pub use producto::*;
pub use proveedor::*;
pub use tasa::*;
pub use transformacion::*;
pub use usuario::*;
pub use venta::*;
