use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Per-field messages keyed Laravel-style: `nit`, `numero_habitaciones`,
/// `room_types.2.accommodation`, ...
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Validation {
        message: String,
        errors: FieldErrors,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    errors: FieldErrors,
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.clone()]);
        ApiError::Validation {
            message,
            errors,
        }
    }

    /// Flattens `validator` derive output into the field-keyed shape,
    /// including nested list fields (`room_types.{index}.{field}`).
    pub fn from_validator(e: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        flatten_validator_errors("", &e, &mut errors);
        ApiError::Validation {
            message: "the given data was invalid".to_string(),
            errors,
        }
    }
}

fn flatten_validator_errors(
    prefix: &str,
    source: &validator::ValidationErrors,
    out: &mut FieldErrors,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in source.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("{} is invalid ({})", key, e.code),
                    })
                    .collect();
                out.insert(key, messages);
            }
            ValidationErrorsKind::Struct(nested) => {
                flatten_validator_errors(&key, nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_validator_errors(&format!("{}.{}", key, index), nested, out);
                }
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        // Unique violations past the pre-check are races, not bugs; surface
        // them as conflicts rather than raw store errors.
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return ApiError::Conflict(format!("uniqueness conflict: {}", db.message()));
            }
        }
        ApiError::Database(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, errors) = match self {
            ApiError::Validation { message, errors } => (message.as_str(), errors.clone()),
            ApiError::Database(e) => {
                log::error!("database error: {}", e);
                ("internal server error", FieldErrors::new())
            }
            other => (other_message(other), FieldErrors::new()),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { message, errors })
    }
}

fn other_message(e: &ApiError) -> &str {
    match e {
        ApiError::NotFound(m) | ApiError::Conflict(m) | ApiError::Forbidden(m) => m,
        _ => "internal server error",
    }
}
