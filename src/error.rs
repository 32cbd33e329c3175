use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::engine::EngineError;
use crate::params::ParameterError;

/// Request-terminating failures, mapped onto HTTP statuses at the transport
/// boundary. Audit-logging failures are deliberately absent: they are
/// reported out-of-band and never change a request's outcome.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("generation timed out")]
    Timeout,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Parameter(_) => StatusCode::BAD_REQUEST,
            ServiceError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_errors_are_client_errors() {
        let err = ServiceError::from(ParameterError::Temperature {
            value: "abc".to_owned(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_errors_are_server_errors() {
        let err = ServiceError::from(EngineError::Generation("model exploded".to_owned()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        assert_eq!(
            ServiceError::Timeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
