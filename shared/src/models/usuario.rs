//! Usuario Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const ROL_ADMINISTRADOR: &str = "Administrador";
pub const ROL_VENDEDOR: &str = "Vendedor";

pub const ESTADO_ACTIVO: &str = "Activo";
pub const ESTADO_INACTIVO: &str = "Inactivo";

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rol {
    Administrador,
    Vendedor,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Administrador => ROL_ADMINISTRADOR,
            Rol::Vendedor => ROL_VENDEDOR,
        }
    }

    /// Parse a stored role; unknown values get the least privileged role.
    pub fn parse(value: &str) -> Self {
        if value == ROL_ADMINISTRADOR {
            Rol::Administrador
        } else {
            Rol::Vendedor
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Rol::Administrador)
    }
}

impl Default for Rol {
    fn default() -> Self {
        Rol::Vendedor
    }
}

/// User row (without password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Usuario {
    pub id: i32,
    pub nombre: String,
    pub nombre_usuario: String,
    pub rol: String,
    pub estado: String,
    pub fecha_creacion: Option<DateTime<Utc>>,
}

/// User row used by login (includes the bcrypt hash, never serialized)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UsuarioCredenciales {
    pub id: i32,
    pub nombre: String,
    pub rol: String,
    pub password: String,
}

/// Identity stored in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub nombre: String,
    pub rol: String,
}

impl SessionUser {
    pub fn rol(&self) -> Rol {
        Rol::parse(&self.rol)
    }
}

/// Register / create user payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsuarioCreate {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100, message = "Faltan datos"))]
    pub nombre_usuario: String,
    #[validate(length(min = 1, max = 128, message = "Faltan datos"))]
    pub password: String,
    pub rol: Option<Rol>,
}

/// Update user payload (password optional)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsuarioUpdate {
    #[validate(length(min = 1, max = 200, message = "Faltan datos"))]
    pub nombre: String,
    #[validate(length(min = 1, max = 100, message = "Faltan datos"))]
    pub nombre_usuario: String,
    #[validate(length(max = 128))]
    pub password: Option<String>,
    pub rol: Rol,
    pub estado: Option<String>,
}

/// Change user status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioEstadoUpdate {
    pub estado: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub nombre_usuario: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rol_parse() {
        assert_eq!(Rol::parse("Administrador"), Rol::Administrador);
        assert_eq!(Rol::parse("Vendedor"), Rol::Vendedor);
        assert_eq!(Rol::parse("root"), Rol::Vendedor);
        assert!(Rol::Administrador.is_admin());
        assert!(!Rol::Vendedor.is_admin());
    }

    #[test]
    fn test_create_defaults_to_vendedor() {
        let payload: UsuarioCreate = serde_json::from_str(
            r#"{"nombre":"Ana","nombre_usuario":"ana","password":"x"}"#,
        )
        .unwrap();
        assert_eq!(payload.rol.unwrap_or_default(), Rol::Vendedor);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let payload = UsuarioCreate {
            nombre: "Ana".into(),
            nombre_usuario: String::new(),
            password: "x".into(),
            rol: None,
        };
        assert!(payload.validate().is_err());
    }
}
