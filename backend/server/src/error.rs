use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use process::store::StoreError;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Ingestion already running")]
    IngestInFlight,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload | AppError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            AppError::IngestInFlight => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Config(_) | AppError::Io(_) => {
                error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
