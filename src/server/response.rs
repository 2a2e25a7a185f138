use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::error::MemeError;

impl ResponseError for MemeError {
    fn status_code(&self) -> StatusCode {
        match self {
            MemeError::MissingImage
            | MemeError::NoImage
            | MemeError::UnsupportedMedia(_)
            | MemeError::InvalidStyle(_)
            | MemeError::SerializationError(_) => StatusCode::BAD_REQUEST,
            MemeError::AllModelsFailed { .. } | MemeError::Provider(_) => StatusCode::BAD_GATEWAY,
            MemeError::RenderSourceUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MemeError::ConfigError(_) => StatusCode::SERVICE_UNAVAILABLE,
            MemeError::Io(_) | MemeError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected: {}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.user_message() }))
    }
}
