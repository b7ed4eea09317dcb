use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// One failed input rule, shaped like the `errors[]` items clients already parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: Some(param.into()),
        }
    }

    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("user already exist")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("post already liked")]
    AlreadyLiked,
    #[error("post not yet liked")]
    NotYetLiked,
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateEmail
            | AppError::InvalidCredentials
            | AppError::AlreadyLiked
            | AppError::NotYetLiked => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::DuplicateEmail => json!({ "errors": [FieldError::message("User already exist")] }),
            AppError::InvalidCredentials => json!({
                "errors": [FieldError::message("You have entered an invalid email or password")]
            }),
            AppError::AlreadyLiked => json!({ "errors": [FieldError::message("cannot like post twice")] }),
            AppError::NotYetLiked => {
                json!({ "errors": [FieldError::message("Post has not yet been liked")] })
            }
            AppError::Unauthenticated(msg) | AppError::NotFound(msg) => json!({ "msg": msg }),
            AppError::Forbidden => json!({ "msg": "User not authorized to make this request" }),
            AppError::Internal(e) => {
                error!(error = ?e, "unhandled server error");
                json!({ "msg": "Server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::message(rejection.body_text())])
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}
