use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Errors that are meant to be shown to the API client. Implementing types
/// decide which status code and machine-readable code the response carries;
/// the error's `Display` output becomes the message.
pub trait ApiRequestError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str {
        "ERR"
    }
}

pub enum AppError {
    /// An error the client can act on.
    Request {
        code: &'static str,
        msg: String,
        status: StatusCode,
    },

    /// Everything else. The details are logged but never leave the server.
    Internal(eyre::Report),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::Request { code, msg, status } => (
                status,
                ErrorResponse {
                    code,
                    msg: Some(msg),
                },
            ),
            AppError::Internal(report) => {
                tracing::error!(?report, "Unhandled error while serving a request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        code: "SERVER_ERR",
                        msg: Some("Internal server error".into()),
                    },
                )
            }
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: ApiRequestError,
{
    fn from(e: E) -> Self {
        AppError::Request {
            code: e.error_code(),
            msg: e.to_string(),
            status: e.status_code(),
        }
    }
}

impl From<(&'static str, StatusCode)> for AppError {
    fn from((msg, status): (&'static str, StatusCode)) -> Self {
        AppError::Request {
            code: "ERR",
            msg: msg.into(),
            status,
        }
    }
}

impl From<(String, StatusCode)> for AppError {
    fn from((msg, status): (String, StatusCode)) -> Self {
        AppError::Request {
            code: "ERR",
            msg,
            status,
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::Internal(eyre::Report::new(e))
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for AppError {
    fn from(e: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        AppError::Internal(eyre::Report::new(e))
    }
}
