use std::fmt;

use serde::Serialize;
use ts_rs::TS;

use crate::argspec::ParseError;
use crate::executor::ExecError;
use crate::settings::SettingsError;
use crate::templates::GenerationError;

/// Request-level error. Serialized as `{"code": ..., "detail": ...}` so
/// clients can match on the code.
///
/// Compile failures are not errors; they come back as a
/// [`crate::model::CodeResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "code", content = "detail")]
#[ts(export)]
pub enum AppError {
    ParseError {
        message: String,
        line: usize,
        /// Snake-case parse failure kind, e.g. `invalid_literal`.
        kind: String,
    },
    GenerationError { message: String },
    UnsupportedLanguage { language: String },
    ToolingError { message: String },
    Timeout { message: String },
    Cancelled,
    /// A `request_id` that is already in flight.
    DuplicateRequest { request_id: String },
    /// A caller-supplied `request_id` outside `[A-Za-z0-9_-]{1,64}`.
    InvalidRequestId { request_id: String },
    ConfigError { message: String },
    IoError { message: String },
}

impl AppError {
    /// The serialized `code` tag.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ParseError { .. } => "ParseError",
            AppError::GenerationError { .. } => "GenerationError",
            AppError::UnsupportedLanguage { .. } => "UnsupportedLanguage",
            AppError::ToolingError { .. } => "ToolingError",
            AppError::Timeout { .. } => "Timeout",
            AppError::Cancelled => "Cancelled",
            AppError::DuplicateRequest { .. } => "DuplicateRequest",
            AppError::InvalidRequestId { .. } => "InvalidRequestId",
            AppError::ConfigError { .. } => "ConfigError",
            AppError::IoError { .. } => "IoError",
        }
    }

    /// True for errors caused by what the caller submitted rather than by
    /// the service or its toolchain.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::ParseError { .. }
                | AppError::GenerationError { .. }
                | AppError::UnsupportedLanguage { .. }
                | AppError::InvalidRequestId { .. }
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ParseError { message, line, .. } => write!(f, "line {line}: {message}"),
            AppError::GenerationError { message } => write!(f, "Generation error: {message}"),
            AppError::UnsupportedLanguage { language } => {
                write!(f, "Unsupported language: {language}")
            }
            AppError::ToolingError { message } => write!(f, "Tooling error: {message}"),
            AppError::Timeout { message } => write!(f, "Timed out: {message}"),
            AppError::Cancelled => write!(f, "Execution cancelled"),
            AppError::DuplicateRequest { request_id } => {
                write!(f, "Request {request_id} is already running")
            }
            AppError::InvalidRequestId { request_id } => write!(
                f,
                "Invalid request id {request_id:?}: use 1-64 of A-Z a-z 0-9 _ -"
            ),
            AppError::ConfigError { message } => write!(f, "Config error: {message}"),
            AppError::IoError { message } => write!(f, "I/O error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ParseError> for AppError {
    fn from(e: ParseError) -> Self {
        AppError::ParseError {
            kind: e.kind_name().to_string(),
            message: e.message,
            line: e.line,
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        match e {
            GenerationError::UnsupportedLanguage(language) => AppError::UnsupportedLanguage {
                language: language.to_string(),
            },
            other => AppError::GenerationError {
                message: other.to_string(),
            },
        }
    }
}

impl From<ExecError> for AppError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Tooling { message } => AppError::ToolingError { message },
            e @ ExecError::Timeout { .. } => AppError::Timeout {
                message: e.to_string(),
            },
            ExecError::Cancelled => AppError::Cancelled,
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::ConfigError {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::IoError {
            message: e.to_string(),
        }
    }
}
