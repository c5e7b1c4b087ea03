use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::usecases::errors::ServiceError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ServiceError::Internal(cause) => {
                // Never leak the cause to the client
                error!(status = status.as_u16(), error = ?cause, "http: internal error");
                self.to_string()
            }
            other => {
                warn!(status = status.as_u16(), error = %other, "http: request rejected");
                other.to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}
