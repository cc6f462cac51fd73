use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by ingestion, derivation and chart resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("malformed date in field `{field}`: {value}")]
    MalformedDate { field: String, value: String },

    #[error("source `{source_name}` unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("unknown base field `{0}`")]
    UnknownBaseField(String),

    #[error("unknown chart `{0}`")]
    UnknownChart(String),

    #[error("unknown series `{0}`")]
    UnknownSeries(String),

    #[error("invalid population {value} for `{output}`")]
    InvalidPopulation { output: String, value: f64 },

    #[error("unknown region `{0}`")]
    UnknownRegion(String),

    #[error("window for `{0}` must be at least 1")]
    InvalidWindow(String),
}

impl SeriesError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown source `{0}` (expected san-antonio, us or state:<code>)")]
    UnknownSource(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("cannot load populations from {path}: {reason}")]
    Population { path: String, reason: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

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

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        let status = match &err {
            SeriesError::UnknownChart(_) => StatusCode::NOT_FOUND,
            SeriesError::UnknownSeries(_) | SeriesError::UnknownBaseField(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SeriesError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SeriesError::MalformedDate { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
