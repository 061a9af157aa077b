//! Shared error types across clima crates.

use thiserror::Error;

/// Client- and metric-facing error categories (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The `ciudad` parameter was absent or blank.
    MissingCity,
    /// Upstream could not be reached (network, DNS, timeout).
    ConnectionError,
    /// Upstream answered with a body we could not understand.
    InvalidResponse,
    /// Upstream answered with a non-success status.
    NotFound,
    /// Invalid configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ErrorKind {
    /// Label used for the `error_type` metric dimension.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingCity => "missing_city",
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        }
    }

    /// HTTP status code returned to the caller.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::MissingCity => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::ConnectionError | ErrorKind::InvalidResponse => 502,
            ErrorKind::Config | ErrorKind::Internal => 500,
        }
    }

    /// Fixed message placed in the `error` field of the JSON body.
    pub fn public_message(self) -> &'static str {
        match self {
            ErrorKind::MissingCity => "Debe ingresar una ciudad",
            ErrorKind::NotFound => "Ciudad no encontrada",
            ErrorKind::ConnectionError => "No se pudo conectar con el servicio de clima",
            ErrorKind::InvalidResponse => "Respuesta inválida del servicio de clima",
            ErrorKind::Config | ErrorKind::Internal => "Error interno",
        }
    }
}

/// Outcome of a failed upstream call, in classification order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was received (connect, DNS, timeout, body read).
    #[error("upstream connection failed: {0}")]
    Connection(String),
    /// A response arrived but its body is not the expected shape.
    #[error("upstream payload invalid: {0}")]
    BadPayload(String),
    /// A well-formed response with a non-success status.
    #[error("upstream returned status {status}")]
    NotFound { status: u16 },
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ClimaError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum ClimaError {
    #[error("missing city parameter")]
    MissingCity,
    #[error("upstream connection error: {0}")]
    UpstreamConnection(String),
    #[error("upstream payload error: {0}")]
    UpstreamPayload(String),
    #[error("city not found")]
    CityNotFound,
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ClimaError {
    /// Map internal error to a stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClimaError::MissingCity => ErrorKind::MissingCity,
            ClimaError::UpstreamConnection(_) => ErrorKind::ConnectionError,
            ClimaError::UpstreamPayload(_) => ErrorKind::InvalidResponse,
            ClimaError::CityNotFound => ErrorKind::NotFound,
            ClimaError::Config(_) => ErrorKind::Config,
            ClimaError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<FetchError> for ClimaError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Connection(msg) => ClimaError::UpstreamConnection(msg),
            FetchError::BadPayload(msg) => ClimaError::UpstreamPayload(msg),
            FetchError::NotFound { .. } => ClimaError::CityNotFound,
        }
    }
}
