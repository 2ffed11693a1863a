//! Compile-and-run pipeline for generated programs.
//!
//! Every execution gets its own scope directory under the work root, so
//! concurrent requests for the same language never share files.

pub mod process;
pub mod scope;
pub mod toolchain;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::generator::write_source;
use crate::model::{CodeResult, Language};

use self::process::run_process;
use self::scope::ExecutionScope;
pub use self::toolchain::{FailureDetection, Toolchain};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compile => "compile",
            Stage::Run => "run",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// Creating, writing or deleting files, or spawning a tool, failed.
    #[error("{message}")]
    Tooling { message: String },
    #[error("{stage} step timed out after {}s", .after.as_secs_f64())]
    Timeout { stage: Stage, after: Duration },
    #[error("execution cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub work_root: PathBuf,
    pub toolchain: Toolchain,
    pub compile_timeout: Duration,
    pub run_timeout: Duration,
    pub failure_detection: FailureDetection,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            work_root: crate::paths::default_work_root(),
            toolchain: Toolchain::default(),
            compile_timeout: Duration::from_secs(10),
            run_timeout: Duration::from_secs(5),
            failure_detection: FailureDetection::default(),
        }
    }
}

pub struct Executor {
    config: ExecutorConfig,
    next_request: AtomicU64,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            next_request: AtomicU64::new(1),
        }
    }

    /// A fresh identifier for callers that did not supply one.
    pub fn next_request_id(&self) -> String {
        self.next_request.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Write `source` into a new scope, compile it, run it and return what
    /// it printed.
    ///
    /// A failed compile is a normal result with
    /// [`crate::model::RunStatus::CompileError`]. Timeouts and cancellation
    /// kill the child and delete the scope before returning the error.
    pub async fn execute(
        &self,
        request_id: &str,
        language: Language,
        source: &str,
        cancel: &AtomicBool,
    ) -> Result<CodeResult, ExecError> {
        let started = Instant::now();
        let scope = ExecutionScope::create(&self.config.work_root, request_id)?;
        write_source(scope.path(), language, source).map_err(|e| ExecError::Tooling {
            message: e.to_string(),
        })?;

        let tools = &self.config.toolchain;
        let compiled = run_process(
            tools.compile_command(language, scope.path()),
            Stage::Compile,
            self.config.compile_timeout,
            cancel,
        )
        .await?;

        let artifacts = toolchain::artifacts(language);
        if self.config.failure_detection.is_failure(language, &compiled) {
            log::info!(
                "request {request_id}: {language} failed to compile in {:?}",
                started.elapsed()
            );
            scope.close(artifacts)?;
            return Ok(CodeResult::compile_error(compiled.stdout, compiled.stderr));
        }

        let result = match tools.run_command(language, scope.path()) {
            Some(command) => {
                let ran = run_process(command, Stage::Run, self.config.run_timeout, cancel).await?;
                CodeResult::ran(ran.stdout, ran.stderr)
            }
            None => CodeResult::ran(compiled.stdout, compiled.stderr),
        };

        scope.close(artifacts)?;
        log::info!(
            "request {request_id}: {language} ran in {:?}",
            started.elapsed()
        );
        Ok(result)
    }
}
