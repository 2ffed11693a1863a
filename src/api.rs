use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use ts_rs::TS;

use crate::error::AppError;
use crate::model::Language;
use crate::service;
use crate::state::AppState;

// ── Response types ───────────────────────────────────────────────

#[derive(Serialize)]
struct ApiOk<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ApiErr {
    ok: bool,
    error: String,
    code: String,
}

fn ok_json<T: Serialize>(data: T) -> Response {
    Json(ApiOk { ok: true, data }).into_response()
}

fn err_json(status: StatusCode, code: &str, msg: String) -> Response {
    (
        status,
        Json(ApiErr {
            ok: false,
            error: msg,
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn app_err(e: &AppError) -> Response {
    err_json(status_for(e), e.code(), e.to_string())
}

/// HTTP status for a failed request.
pub fn status_for(e: &AppError) -> StatusCode {
    if e.is_client_error() {
        return StatusCode::BAD_REQUEST;
    }
    match e {
        AppError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
        AppError::Cancelled | AppError::DuplicateRequest { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ── Request types ────────────────────────────────────────────────

/// Body of `POST /execute`.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct ExecuteBody {
    /// Argument specification, one `<literal> => <type>` per line.
    #[serde(default)]
    pub input: String,
    /// The submitted solution.
    pub text: String,
    pub lang: String,
    /// Optional caller-chosen id, usable with `POST /cancel/{id}`.
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct InfoResponse {
    pub languages: Vec<Language>,
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────

async fn get_info(Extension(state): Extension<Arc<AppState>>) -> Response {
    let languages = state.templates.languages();
    let names: Vec<&str> = languages.iter().map(|l| l.name()).collect();
    ok_json(InfoResponse {
        message: format!("Of languages we support: {}", names.join(", ")),
        languages,
    })
}

async fn post_execute(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<ExecuteBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return err_json(StatusCode::BAD_REQUEST, "InvalidBody", rejection.body_text())
        }
    };
    match service::execute_text(
        &state,
        body.request_id.as_deref(),
        &body.input,
        &body.text,
        &body.lang,
    )
    .await
    {
        Ok(result) => ok_json(result),
        Err(e) => app_err(&e),
    }
}

async fn post_cancel(
    Extension(state): Extension<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Response {
    if state.cancel(&request_id) {
        log::info!("request {request_id}: cancel requested");
        ok_json(serde_json::json!({ "cancelled": request_id }))
    } else {
        err_json(
            StatusCode::NOT_FOUND,
            "NotFound",
            format!("no running request {request_id}"),
        )
    }
}

// ── Server startup ───────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/info", get(get_info))
        .route("/execute", post(post_execute))
        .route("/cancel/{request_id}", post(post_cancel))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

/// Serve until Ctrl-C or SIGTERM. In-flight requests are dropped on
/// shutdown, which kills their child processes and removes their scopes.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!(
        "listening on http://{} ({})",
        listener.local_addr()?,
        state
            .templates
            .languages()
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    log::info!("shutdown signal received");
}
