//! Well-known file and directory names.
//!
//! Other modules take paths from here instead of hard-coding them.

use std::path::{Path, PathBuf};

// ── Leaf names ───────────────────────────────────────────────────

pub const CONFIG_DIR: &str = "config";
pub const CONFIG_FILE: &str = "crackview.json";
pub const TEMPLATES_DIR: &str = "templates";
pub const WORK_DIR: &str = "crackview";

// ── Path functions ───────────────────────────────────────────────

/// `config/crackview.json`, relative to the working directory.
pub fn default_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Root under which per-request scopes are created when none is configured.
pub fn default_work_root() -> PathBuf {
    std::env::temp_dir().join(WORK_DIR)
}

/// Templates shipped with the crate.
pub fn bundled_templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(TEMPLATES_DIR)
}

/// The configured templates directory, or the bundled one when the
/// configured path is the default name and does not exist here.
pub fn resolve_templates_dir(configured: &Path) -> PathBuf {
    if configured.exists() || configured != Path::new(TEMPLATES_DIR) {
        configured.to_path_buf()
    } else {
        bundled_templates_dir()
    }
}
