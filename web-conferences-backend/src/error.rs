use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;
use tracing::error;
use web_conferences_config::ConfigError;
use web_conferences_database::DatabaseError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("header error: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),
    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),
    #[error("user authorization required")]
    Unauthenticated,
    #[error("Invalid access token.")]
    InvalidAccessToken,
    #[error("user not authorized to perform that action")]
    Unauthorized,
    #[error("The specified resource does not exist.")]
    NotFound,
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    errors: Vec<ErrorMessage>,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidAccessToken | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            // a non numeric id can't name an existing context
            Self::NotFound | Self::Path(_) => StatusCode::NOT_FOUND,
            Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Database(_) | Self::File(_) | Self::Header(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    const fn status_label(&self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated | Self::InvalidAccessToken => Some("unauthenticated"),
            Self::Unauthorized => Some("unauthorized"),
            Self::NotFound | Self::Path(_) => Some("not_found"),
            Self::Query(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::File(_)
            | Self::Header(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("{self}");
            "An error occurred.".to_owned()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            status: self.status_label(),
            errors: vec![ErrorMessage { message }],
        };
        (status, Json(body)).into_response()
    }
}
