use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const CONNECTION_UNAVAILABLE_MESSAGE: &str = "Failed to connect to the database";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    ConfigurationMissing(Vec<String>),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("{0}")]
    MissingIdentity(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingIdentity(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidBody(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigurationMissing(_)
            | AppError::ConfigError(_)
            | AppError::ConnectionUnavailable(_)
            | AppError::DatabaseError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// First human-readable message out of a set of field validation failures.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field.clone(), e)))
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("{} is invalid ({})", field, e.code),
        })
        .next()
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::MissingIdentity(msg) => ErrorResponse {
                message: msg.clone(),
                errors: None,
                error: None,
            },
            AppError::InvalidBody(msg) => ErrorResponse {
                message: INVALID_BODY_MESSAGE.to_string(),
                errors: Some(msg.clone()),
                error: None,
            },
            AppError::ValidationError(errs) => ErrorResponse {
                message: INVALID_BODY_MESSAGE.to_string(),
                errors: Some(first_validation_message(errs)),
                error: None,
            },
            AppError::ConnectionUnavailable(err) => {
                tracing::error!(error = %err, "Database connection unavailable");
                ErrorResponse {
                    message: CONNECTION_UNAVAILABLE_MESSAGE.to_string(),
                    errors: None,
                    error: None,
                }
            }
            // Internal detail goes to the log only.
            other => {
                tracing::error!(error = ?other, "Request failed");
                ErrorResponse {
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                    errors: None,
                    error: Some(
                        match other {
                            AppError::DatabaseError(_) => "Database error",
                            AppError::ConfigurationMissing(_) | AppError::ConfigError(_) => {
                                "Configuration error"
                            }
                            _ => "Internal server error",
                        }
                        .to_string(),
                    ),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Query cannot be empty"))]
        query: String,
    }

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let (status, body) =
            render(AppError::MissingIdentity("Missing x-userid header".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Missing x-userid header");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn validation_error_reports_first_message() {
        let errs = Probe {
            query: String::new(),
        }
        .validate()
        .unwrap_err();

        let (status, body) = render(AppError::from(errs)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], INVALID_BODY_MESSAGE);
        assert_eq!(body["errors"], "Query cannot be empty");
    }

    #[tokio::test]
    async fn connection_unavailable_has_fixed_message() {
        let (status, body) = render(AppError::ConnectionUnavailable(anyhow::anyhow!(
            "pool timed out while waiting for an open connection"
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({ "message": CONNECTION_UNAVAILABLE_MESSAGE })
        );
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_source_text() {
        let (status, body) = render(AppError::InternalError(anyhow::anyhow!(
            "password authentication failed for user \"jiji\""
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("password"));
    }

    #[test]
    fn configuration_missing_lists_every_name() {
        let err = AppError::ConfigurationMissing(vec![
            "POSTGRES_HOST".to_string(),
            "POSTGRES_PASSWORD".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing required environment variables: POSTGRES_HOST, POSTGRES_PASSWORD"
        );
    }
}
