use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{Language, TypedArgument};

/// How an execution ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RunStatus {
    /// The program ran. `error` may still hold runtime stderr.
    Ok,
    /// The toolchain rejected the program; `error` holds its diagnostics.
    CompileError,
}

/// Captured output of one execution. Both text fields are always present,
/// empty rather than absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CodeResult {
    pub output: String,
    pub error: String,
    pub status: RunStatus,
}

impl CodeResult {
    pub fn ran(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
            status: RunStatus::Ok,
        }
    }

    pub fn compile_error(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
            status: RunStatus::CompileError,
        }
    }

    pub fn is_compile_error(&self) -> bool {
        self.status == RunStatus::CompileError
    }
}

/// Everything needed to synthesize and run one submission. Built per
/// request and consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub arguments: Vec<TypedArgument>,
    pub solution: String,
    pub language: Language,
}
