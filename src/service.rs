//! The request pipeline shared by the HTTP API and the CLI:
//! parse, check the language, generate, execute.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::argspec;
use crate::backends::resolve_backend;
use crate::error::AppError;
use crate::generator::generate_program;
use crate::model::{CodeResult, ExecutionRequest, Language};
use crate::state::{check_cancelled, AppState};

/// Resolve a wire language name against the enabled set.
pub fn resolve_language(state: &AppState, name: &str) -> Result<Language, AppError> {
    Language::from_name(name)
        .filter(|l| state.settings.is_enabled(*l) && state.templates.contains(*l))
        .ok_or_else(|| AppError::UnsupportedLanguage {
            language: name.trim().to_string(),
        })
}

/// Parse the argument text and bundle it with the solution. Fails before
/// anything is generated or spawned.
pub fn prepare(
    state: &AppState,
    input: &str,
    solution: &str,
    language: &str,
) -> Result<ExecutionRequest, AppError> {
    let language = resolve_language(state, language)?;
    let arguments = argspec::parse(input)?;
    Ok(ExecutionRequest {
        arguments,
        solution: solution.to_string(),
        language,
    })
}

/// Synthesize the complete program for `request` without running it.
pub fn synthesize(state: &AppState, request: &ExecutionRequest) -> Result<String, AppError> {
    let backend = resolve_backend(request.language, &state.templates)?;
    Ok(generate_program(
        &request.arguments,
        &request.solution,
        backend.as_ref(),
    )?)
}

/// Generate and run `request` in its own scope.
pub async fn execute(
    state: &AppState,
    request_id: &str,
    request: &ExecutionRequest,
    cancel: &AtomicBool,
) -> Result<CodeResult, AppError> {
    let started = Instant::now();
    let source = synthesize(state, request)?;
    check_cancelled(cancel)?;

    let result = state
        .executor
        .execute(request_id, request.language, &source, cancel)
        .await;
    match &result {
        Ok(r) => log::info!(
            "request {request_id}: {} with {} argument(s) finished as {:?} in {:?}",
            request.language,
            request.arguments.len(),
            r.status,
            started.elapsed()
        ),
        Err(e) => log::warn!("request {request_id}: {} failed: {e}", request.language),
    }
    Ok(result?)
}

/// [`prepare`] then [`execute`], registering the request for cancellation.
pub async fn execute_text(
    state: &AppState,
    request_id: Option<&str>,
    input: &str,
    solution: &str,
    language: &str,
) -> Result<CodeResult, AppError> {
    let request = prepare(state, input, solution, language)?;
    let request_id = match request_id {
        Some(id) => id.to_string(),
        None => state.executor.next_request_id(),
    };
    let guard = state.register(&request_id)?;
    execute(state, guard.request_id(), &request, guard.flag()).await
}
