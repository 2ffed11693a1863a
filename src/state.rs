use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::AppError;
use crate::executor::{ExecError, Executor};
use crate::settings::Settings;
use crate::templates::TemplateStore;

/// Longest caller-supplied request id accepted.
pub const MAX_REQUEST_ID_LEN: usize = 64;

/// Request ids become part of a directory name, so only
/// `[A-Za-z0-9_-]{1,64}` is accepted.
pub fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

// ── Application State ──────────────────────────────────────────────

/// State shared by the HTTP handlers and the CLI.
pub struct AppState {
    pub settings: Settings,
    pub templates: TemplateStore,
    pub executor: Executor,
    /// Cancel flags of in-flight executions, keyed by request id.
    cancellations: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

impl AppState {
    /// Load templates for every enabled language and build the executor.
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let templates = TemplateStore::load(&settings.templates_root(), &settings.languages)?;
        Ok(Self::with_templates(settings, templates))
    }

    pub fn with_templates(settings: Settings, templates: TemplateStore) -> Self {
        let executor = Executor::new(settings.executor_config());
        Self {
            settings,
            templates,
            executor,
            cancellations: Mutex::new(HashMap::new()),
        }
    }

    /// Register a cancel flag for `request_id`. The flag is removed when the
    /// returned guard drops.
    pub fn register(&self, request_id: &str) -> Result<CancelGuard<'_>, AppError> {
        if !is_valid_request_id(request_id) {
            return Err(AppError::InvalidRequestId {
                request_id: request_id.to_string(),
            });
        }
        let mut map = self.cancellations.lock();
        if map.contains_key(request_id) {
            return Err(AppError::DuplicateRequest {
                request_id: request_id.to_string(),
            });
        }
        let flag = Arc::new(AtomicBool::new(false));
        map.insert(request_id.to_string(), flag.clone());
        Ok(CancelGuard {
            state: self,
            request_id: request_id.to_string(),
            flag,
        })
    }

    /// Raise the cancel flag of an in-flight request. Returns false if no
    /// such request is running.
    pub fn cancel(&self, request_id: &str) -> bool {
        match self.cancellations.lock().get(request_id) {
            Some(flag) => {
                flag.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.cancellations.lock().len()
    }
}

pub struct CancelGuard<'a> {
    state: &'a AppState,
    request_id: String,
    flag: Arc<AtomicBool>,
}

impl CancelGuard<'_> {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn flag(&self) -> &AtomicBool {
        &self.flag
    }
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        self.state.cancellations.lock().remove(&self.request_id);
    }
}

// ── Cancellation helpers ───────────────────────────────────────────

const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Resolves once `flag` is raised.
pub async fn wait_for_cancel(flag: &AtomicBool) {
    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(CANCEL_POLL).await;
    }
}

pub fn check_cancelled(flag: &AtomicBool) -> Result<(), ExecError> {
    if flag.load(Ordering::Relaxed) {
        Err(ExecError::Cancelled)
    } else {
        Ok(())
    }
}
