use axum::{http::StatusCode, response::IntoResponse};

use crate::layout;

#[derive(Debug, thiserror::Error)]
pub enum BaseplateError {
    #[error("400 Bad Request")]
    BadRequest,

    #[error("401 Unauthorized")]
    Unauthorized,

    #[error("403 Forbidden")]
    Forbidden,

    #[error("404 Not Found")]
    NotFound,

    #[error(transparent)]
    Layout(#[from] layout::Error),

    #[error("500 Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<tower_sessions::session::Error> for BaseplateError {
    fn from(error: tower_sessions::session::Error) -> Self {
        Self::Internal(error.into())
    }
}

impl BaseplateError {
    pub fn status(&self) -> StatusCode {
        use BaseplateError::*;

        match self {
            BadRequest => StatusCode::BAD_REQUEST,
            Unauthorized => StatusCode::UNAUTHORIZED,
            Forbidden => StatusCode::FORBIDDEN,
            NotFound | Layout(layout::Error::UnknownRegion { .. }) => StatusCode::NOT_FOUND,
            Layout(_) | Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BaseplateError {
    fn into_response(self) -> axum::response::Response {
        let code = self.status();

        match self {
            BaseplateError::Layout(ref inner) if code.is_server_error() => {
                tracing::error!("Page composition failed: {inner}");
            }
            BaseplateError::Internal(ref inner) => {
                tracing::error!("Internal server error: {inner}");
            }
            _ => {}
        }

        (code, code.canonical_reason().unwrap_or_default()).into_response()
    }
}
