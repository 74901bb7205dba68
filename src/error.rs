use crate::export::ExportError;
use plate_protocol::WellIdError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    Unsupported,
    Io,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl EngineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }
}

impl Error for EngineError {}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl From<WellIdError> for EngineError {
    fn from(err: WellIdError) -> Self {
        Self::invalid_input(err.to_string())
    }
}

impl From<ExportError> for EngineError {
    fn from(err: ExportError) -> Self {
        let code = match &err {
            ExportError::Io { .. } => ErrorCode::Io,
            ExportError::DpiOutOfRange(_)
            | ExportError::Render(
                plate_render::RenderError::InvalidDpi(_) | plate_render::RenderError::TooLarge { .. },
            ) => {
                ErrorCode::InvalidInput
            }
            _ => ErrorCode::Internal,
        };
        Self::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_input(format!("Invalid JSON: {err}"))
    }
}
