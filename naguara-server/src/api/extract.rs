//! Request extractors that reject with the JSON error body

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shared::error::AppError;
use validator::{Validate, ValidationErrors};

/// `Json<T>` whose rejection is an [`AppError`]
///
/// Missing or mistyped fields answer 400 `Faltan datos`; malformed JSON
/// answers 400 `Solicitud inválida`.
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// [`AppJson`] that also runs the payload's `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(value) = AppJson::<T>::from_request(req, state).await?;
        validate(&value)?;
        Ok(ValidatedJson(value))
    }
}

pub fn json_rejection(rejection: JsonRejection) -> AppError {
    let motivo = rejection.body_text();
    let err = match rejection {
        JsonRejection::JsonDataError(_) => AppError::required_fields(),
        _ => AppError::invalid_request("Solicitud inválida"),
    };
    err.with_detail("motivo", motivo)
}

pub fn validate<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(validation_error)
}

/// Map `validator` errors to a 400; the first rule message wins.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<(String, Option<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()));
            (field.to_string(), message)
        })
        .collect();
    fields.sort();

    let message = fields
        .iter()
        .find_map(|(_, m)| m.clone())
        .unwrap_or_else(|| "Datos inválidos".to_string());
    let campos: Vec<String> = fields.into_iter().map(|(field, _)| field).collect();

    let err = if message == shared::error::ErrorCode::RequiredField.message() {
        AppError::required_fields()
    } else {
        AppError::validation(message)
    };
    err.with_detail("campos", campos)
}
