use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest, Request,
    },
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// Request body that has been both decoded and validated.
///
/// `application/x-www-form-urlencoded` bodies are decoded as a form; anything
/// else goes through the JSON decoder. Decoding failures (bad JSON, wrong
/// content type, missing or mistyped fields) and validation failures both
/// reject with a 400 whose `errors` field carries a single readable message.
pub struct ValidatedBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedBody<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(form_rejection_to_error)?;
            value
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(json_rejection_to_error)?;
            value
        };

        value.validate()?;

        Ok(ValidatedBody(value))
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn json_rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    };
    AppError::InvalidBody(message)
}

fn form_rejection_to_error(rejection: FormRejection) -> AppError {
    AppError::InvalidBody(rejection.body_text())
}
