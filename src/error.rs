use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum ColgadosError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unexpected upstream payload: {0}")]
    UpstreamPayload(String),

    #[error("SharePoint authentication failed: {0}")]
    SharePointAuth(String),
}

impl IntoResponse for ColgadosError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ColgadosError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("No se encontro {what}."))
            }
            ColgadosError::Reqwest(_)
            | ColgadosError::UpstreamPayload(_)
            | ColgadosError::SharePointAuth(_) => (
                StatusCode::BAD_GATEWAY,
                "El servicio externo no respondio correctamente.".to_string(),
            ),
            ColgadosError::Json(_)
            | ColgadosError::UrlParse(_)
            | ColgadosError::Io(_)
            | ColgadosError::DatabaseError(_)
            | ColgadosError::Template(_)
            | ColgadosError::Join(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ocurrio un error interno del servidor.".to_string(),
            ),
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Html(error_page(status, &message))).into_response()
    }
}

/// Standalone error page, rendered without the template engine.
fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\"><title>{code}</title></head>\
         <body><h1>{code}</h1><p>{message}</p><a href=\"/\">Inicio</a></body></html>",
        code = status.as_u16(),
        message = html_escape::encode_text(message),
    )
}
