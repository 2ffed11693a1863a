use std::io;
use std::path::Path;

use tempfile::TempDir;

use super::toolchain::Artifact;
use super::ExecError;

/// A private directory for one request's generated files.
///
/// Dropping the scope removes the directory and everything in it, which
/// covers timeouts, cancellation and dropped request futures. The success
/// path calls [`ExecutionScope::close`] instead so that a failed deletion
/// is reported rather than ignored.
#[derive(Debug)]
pub struct ExecutionScope {
    dir: TempDir,
    request_id: String,
}

impl ExecutionScope {
    pub fn create(work_root: &Path, request_id: &str) -> Result<Self, ExecError> {
        std::fs::create_dir_all(work_root).map_err(|e| tooling("create work root", work_root, &e))?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("crackview-{request_id}-"))
            .tempdir_in(work_root)
            .map_err(|e| tooling("create scope in", work_root, &e))?;
        log::debug!("request {request_id}: scope {}", dir.path().display());
        Ok(Self {
            dir,
            request_id: request_id.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete `artifacts`, then the scope itself. Artifacts that were never
    /// produced (e.g. no executable after a failed compile) are skipped.
    pub fn close(self, artifacts: &[Artifact]) -> Result<(), ExecError> {
        for artifact in artifacts {
            match artifact {
                Artifact::File(name) => remove_if_present(&self.path().join(name))?,
                Artifact::ClassFiles => {
                    let entries = std::fs::read_dir(self.path())
                        .map_err(|e| tooling("list", self.path(), &e))?;
                    for entry in entries {
                        let path = entry.map_err(|e| tooling("list", self.path(), &e))?.path();
                        if path.extension().is_some_and(|ext| ext == "class") {
                            remove_if_present(&path)?;
                        }
                    }
                }
            }
        }
        let path = self.path().to_path_buf();
        self.dir.close().map_err(|e| tooling("remove", &path, &e))?;
        log::debug!("request {}: scope {} removed", self.request_id, path.display());
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), ExecError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(tooling("remove", path, &e)),
    }
}

fn tooling(action: &str, path: &Path, e: &io::Error) -> ExecError {
    ExecError::Tooling {
        message: format!("failed to {action} {}: {e}", path.display()),
    }
}
