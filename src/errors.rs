use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with `success: false`.
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The body was not the expected envelope or record shape.
    #[error("{0}")]
    Malformed(String),
}

impl ApiError {
    /// Operator-facing text, prefixed with `context` for server errors.
    pub fn describe(&self, context: &str) -> String {
        match self {
            ApiError::Server(message) => format!("{context}: {message}"),
            ApiError::Transport(err) => format!("Erro de conexão: {err}"),
            ApiError::Malformed(detail) => format!("Resposta inválida do servidor: {detail}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to build backend client: {0}")]
    Client(#[from] reqwest::Error),
}
