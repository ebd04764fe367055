//! PostgreSQL data access
//!
//! Free async functions over `&PgPool` (or an open transaction). Each
//! multi-statement write runs inside a single transaction that is either
//! committed or dropped, which rolls it back.

pub mod caja;
pub mod categorias;
pub mod clientes;
pub mod compras;
pub mod configuracion;
pub mod productos;
pub mod proveedores;
pub mod tasas;
pub mod transformaciones;
pub mod usuarios;
pub mod ventas;

/// `%term%` pattern for ILIKE searches
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pollo"), "%pollo%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
