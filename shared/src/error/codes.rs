//! Unified error codes for the Na'Guara service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Sale / cash-register errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors (products, categories, suppliers, clients)
//! - 7xxx: Purchase / transformation errors
//! - 8xxx: User / backup errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can
/// branch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Row is still referenced by other rows (FK violation)
    ReferenceConflict = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Unknown or inactive user
    UserNotFoundOrInactive = 1002,
    /// Password mismatch
    WrongPassword = 1003,
    /// Session token is invalid or expired
    SessionExpired = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Administrator role is required
    AdminRequired = 2003,
    /// A user tried to deactivate their own account
    CannotDeactivateSelf = 2006,

    // ==================== 4xxx: Sale ====================
    /// Sale not found
    SaleNotFound = 4001,
    /// Sale has no lines
    SaleEmpty = 4002,
    /// Sale transaction failed (rolled back)
    SaleFailed = 4003,
    /// Not enough stock for a line
    InsufficientStock = 4004,
    /// A cash-register closure already exists for that day and user
    CashClosureExists = 4101,

    // ==================== 5xxx: Payment ====================
    /// Payment method unknown
    PaymentMethodNotFound = 5001,
    /// Payment method disabled in configuration
    PaymentMethodDisabled = 5002,
    /// Cash received does not cover the total
    PaymentInsufficientAmount = 5003,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Stock adjustment without a reason
    AdjustmentReasonRequired = 6002,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6103,
    /// Supplier not found
    SupplierNotFound = 6201,
    /// Client not found
    ClientNotFound = 6301,
    /// Client with the same cedula/RIF exists
    ClientExists = 6302,
    /// VAT rate not found
    TaxRateNotFound = 6401,

    // ==================== 7xxx: Purchase / Transformation ====================
    /// Purchase not found
    PurchaseNotFound = 7001,
    /// Purchase already fully received
    PurchaseAlreadyReceived = 7002,
    /// Purchase line not found
    PurchaseLineNotFound = 7003,
    /// Received quantity exceeds the ordered quantity
    ReceiveExceedsOrdered = 7004,
    /// Transformation not found
    TransformationNotFound = 7501,
    /// Transformation has no outputs
    TransformationEmpty = 7502,

    // ==================== 8xxx: User / Backup ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// Backup file not found
    BackupNotFound = 8501,
    /// Backup file name rejected
    BackupInvalidName = 8502,
    /// Backup creation failed
    BackupFailed = 8503,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default user-facing message (Spanish, shown verbatim by the frontend)
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operación exitosa",
            ErrorCode::Unknown => "Error desconocido",
            ErrorCode::ValidationFailed => "Datos inválidos",
            ErrorCode::NotFound => "Recurso no encontrado",
            ErrorCode::AlreadyExists => "El registro ya existe",
            ErrorCode::InvalidRequest => "Solicitud inválida",
            ErrorCode::RequiredField => "Faltan datos",
            ErrorCode::ReferenceConflict => "El registro está en uso por otros datos",

            // Auth
            ErrorCode::NotAuthenticated => "No autorizado",
            ErrorCode::UserNotFoundOrInactive => "Usuario no encontrado o inactivo",
            ErrorCode::WrongPassword => "Contraseña incorrecta",
            ErrorCode::SessionExpired => "La sesión ha expirado",

            // Permission
            ErrorCode::PermissionDenied => "Permiso denegado",
            ErrorCode::AdminRequired => "Solo administradores pueden realizar esta acción",
            ErrorCode::CannotDeactivateSelf => "No puedes desactivar tu propio usuario",

            // Sale
            ErrorCode::SaleNotFound => "Venta no encontrada",
            ErrorCode::SaleEmpty => "La venta debe tener al menos un producto",
            ErrorCode::SaleFailed => "Error al procesar la venta",
            ErrorCode::InsufficientStock => "Stock insuficiente",
            ErrorCode::CashClosureExists => {
                "Ya existe un cierre de caja para esta fecha y usuario"
            }

            // Payment
            ErrorCode::PaymentMethodNotFound => "Método no encontrado",
            ErrorCode::PaymentMethodDisabled => "El método de pago está deshabilitado",
            ErrorCode::PaymentInsufficientAmount => "El monto recibido es insuficiente",

            // Catalog
            ErrorCode::ProductNotFound => "Producto no encontrado",
            ErrorCode::AdjustmentReasonRequired => {
                "Debe indicar un motivo para actualizar el inventario"
            }
            ErrorCode::CategoryNotFound => "Categoría no encontrada",
            ErrorCode::CategoryNameExists => "Ya existe una categoría con ese nombre",
            ErrorCode::SupplierNotFound => "Proveedor no encontrado",
            ErrorCode::ClientNotFound => "Cliente no encontrado",
            ErrorCode::ClientExists => "Ya existe un cliente con esta cédula/RIF",
            ErrorCode::TaxRateNotFound => "Tasa de IVA no encontrada",

            // Purchase / Transformation
            ErrorCode::PurchaseNotFound => "Compra no encontrada",
            ErrorCode::PurchaseAlreadyReceived => "La compra ya fue recibida completamente",
            ErrorCode::PurchaseLineNotFound => "Detalle de compra no encontrado",
            ErrorCode::ReceiveExceedsOrdered => {
                "La cantidad recibida supera la cantidad ordenada"
            }
            ErrorCode::TransformationNotFound => "Transformación no encontrada",
            ErrorCode::TransformationEmpty => {
                "Debe especificar al menos un producto de salida"
            }

            // User / Backup
            ErrorCode::UserNotFound => "Usuario no encontrado",
            ErrorCode::UsernameExists => "Nombre de usuario ya existe",
            ErrorCode::BackupNotFound => "Backup no encontrado",
            ErrorCode::BackupInvalidName => "Nombre de archivo de backup inválido",
            ErrorCode::BackupFailed => "Error creando backup",

            // System
            ErrorCode::InternalError => "Error del servidor",
            ErrorCode::DatabaseError => "Error de base de datos",
            ErrorCode::NetworkError => "Error de red",
            ErrorCode::TimeoutError => "Tiempo de espera agotado",
            ErrorCode::ConfigError => "Error de configuración",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            9 => Ok(ErrorCode::ReferenceConflict),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::UserNotFoundOrInactive),
            1003 => Ok(ErrorCode::WrongPassword),
            1005 => Ok(ErrorCode::SessionExpired),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::CannotDeactivateSelf),

            // Sale
            4001 => Ok(ErrorCode::SaleNotFound),
            4002 => Ok(ErrorCode::SaleEmpty),
            4003 => Ok(ErrorCode::SaleFailed),
            4004 => Ok(ErrorCode::InsufficientStock),
            4101 => Ok(ErrorCode::CashClosureExists),

            // Payment
            5001 => Ok(ErrorCode::PaymentMethodNotFound),
            5002 => Ok(ErrorCode::PaymentMethodDisabled),
            5003 => Ok(ErrorCode::PaymentInsufficientAmount),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::AdjustmentReasonRequired),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6201 => Ok(ErrorCode::SupplierNotFound),
            6301 => Ok(ErrorCode::ClientNotFound),
            6302 => Ok(ErrorCode::ClientExists),
            6401 => Ok(ErrorCode::TaxRateNotFound),

            // Purchase / Transformation
            7001 => Ok(ErrorCode::PurchaseNotFound),
            7002 => Ok(ErrorCode::PurchaseAlreadyReceived),
            7003 => Ok(ErrorCode::PurchaseLineNotFound),
            7004 => Ok(ErrorCode::ReceiveExceedsOrdered),
            7501 => Ok(ErrorCode::TransformationNotFound),
            7502 => Ok(ErrorCode::TransformationEmpty),

            // User / Backup
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8501 => Ok(ErrorCode::BackupNotFound),
            8502 => Ok(ErrorCode::BackupInvalidName),
            8503 => Ok(ErrorCode::BackupFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::InsufficientStock.code(), 4004);
        assert_eq!(ErrorCode::ClientExists.code(), 6302);
        assert_eq!(ErrorCode::PurchaseNotFound.code(), 7001);
        assert_eq!(ErrorCode::UsernameExists.code(), 8002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_matches_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::ReferenceConflict,
            ErrorCode::NotAuthenticated,
            ErrorCode::UserNotFoundOrInactive,
            ErrorCode::WrongPassword,
            ErrorCode::SessionExpired,
            ErrorCode::PermissionDenied,
            ErrorCode::AdminRequired,
            ErrorCode::CannotDeactivateSelf,
            ErrorCode::SaleNotFound,
            ErrorCode::SaleEmpty,
            ErrorCode::SaleFailed,
            ErrorCode::InsufficientStock,
            ErrorCode::CashClosureExists,
            ErrorCode::PaymentMethodNotFound,
            ErrorCode::PaymentMethodDisabled,
            ErrorCode::PaymentInsufficientAmount,
            ErrorCode::ProductNotFound,
            ErrorCode::AdjustmentReasonRequired,
            ErrorCode::CategoryNotFound,
            ErrorCode::CategoryNameExists,
            ErrorCode::SupplierNotFound,
            ErrorCode::ClientNotFound,
            ErrorCode::ClientExists,
            ErrorCode::TaxRateNotFound,
            ErrorCode::PurchaseNotFound,
            ErrorCode::PurchaseAlreadyReceived,
            ErrorCode::PurchaseLineNotFound,
            ErrorCode::ReceiveExceedsOrdered,
            ErrorCode::TransformationNotFound,
            ErrorCode::TransformationEmpty,
            ErrorCode::UserNotFound,
            ErrorCode::UsernameExists,
            ErrorCode::BackupNotFound,
            ErrorCode::BackupInvalidName,
            ErrorCode::BackupFailed,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::NetworkError,
            ErrorCode::TimeoutError,
            ErrorCode::ConfigError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::ClientExists).unwrap();
        assert_eq!(json, "6302");
        let code: ErrorCode = serde_json::from_str("1001").unwrap();
        assert_eq!(code, ErrorCode::NotAuthenticated);
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(ErrorCode::NotAuthenticated.message(), "No autorizado");
        assert_eq!(ErrorCode::WrongPassword.message(), "Contraseña incorrecta");
        assert!(ErrorCode::InsufficientStock.message().starts_with("Stock insuficiente"));
    }
}
