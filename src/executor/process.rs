use std::process::Stdio;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tokio::process::Command;

use super::{ExecError, Stage};

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Kills the child's process group on drop. On unix the child leads its own
/// group, so this also reaches anything the submitted program spawned.
struct ProcessGroup {
    #[cfg_attr(not(unix), allow(dead_code))]
    leader: Option<u32>,
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(pgid) = self.leader.and_then(|id| libc::pid_t::try_from(id).ok()) {
            // SAFETY: killpg takes no pointers; a group that is already gone
            // just yields ESRCH.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
}

/// Run `command` to completion, capturing both streams.
///
/// The child and every process it started are killed if `timeout` elapses
/// or `cancel` is raised, when the returned future is dropped before it
/// resolves, and once the child itself has exited.
pub async fn run_process(
    mut command: Command,
    stage: Stage,
    timeout: Duration,
    cancel: &AtomicBool,
) -> Result<ProcessOutput, ExecError> {
    let program = command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned();
    log::debug!("{stage}: spawning {program}");

    #[cfg(unix)]
    command.process_group(0);
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ExecError::Tooling {
            message: format!("failed to run {program}: {e}"),
        })?;
    let _group = ProcessGroup { leader: child.id() };

    tokio::select! {
        result = child.wait_with_output() => {
            let output = result.map_err(|e| ExecError::Tooling {
                message: format!("{program} did not complete: {e}"),
            })?;
            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                success: output.status.success(),
            })
        }
        () = tokio::time::sleep(timeout) => {
            log::warn!("{stage}: {program} killed after {}s", timeout.as_secs_f64());
            Err(ExecError::Timeout { stage, after: timeout })
        }
        () = crate::state::wait_for_cancel(cancel) => {
            log::warn!("{stage}: {program} cancelled");
            Err(ExecError::Cancelled)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Instant;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[tokio::test]
    async fn captures_both_streams() {
        let out = run_process(
            sh("echo 42; echo oops >&2"),
            Stage::Run,
            Duration::from_secs(5),
            &AtomicBool::new(false),
        )
        .await
        .unwrap();
        assert_eq!(out.stdout, "42\n");
        assert_eq!(out.stderr, "oops\n");
        assert!(out.success);
    }

    #[tokio::test]
    async fn non_zero_exit_is_not_an_error() {
        let out = run_process(sh("exit 3"), Stage::Run, Duration::from_secs(5), &AtomicBool::new(false))
            .await
            .unwrap();
        assert!(!out.success);
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let started = Instant::now();
        let err = run_process(
            sh("exec sleep 5"),
            Stage::Run,
            Duration::from_millis(200),
            &AtomicBool::new(false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecError::Timeout { stage: Stage::Run, .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_background_children() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let script = format!("(sleep 1; touch '{}') & exec sleep 5", marker.display());
        let err = run_process(
            sh(&script),
            Stage::Run,
            Duration::from_millis(200),
            &AtomicBool::new(false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecError::Timeout { .. }));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stragglers_are_killed_after_normal_exit() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let script = format!(
            "(sleep 1; touch '{}') >/dev/null 2>&1 & echo done",
            marker.display()
        );
        let out = run_process(sh(&script), Stage::Run, Duration::from_secs(5), &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(out.stdout, "done\n");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn cancel_flag_stops_the_child() {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            flag.store(true, Ordering::Relaxed);
        });
        let err = run_process(sh("exec sleep 5"), Stage::Compile, Duration::from_secs(10), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Cancelled));
    }

    #[tokio::test]
    async fn missing_program_is_a_tooling_error() {
        let err = run_process(
            Command::new("crackview-no-such-program"),
            Stage::Compile,
            Duration::from_secs(1),
            &AtomicBool::new(false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecError::Tooling { .. }));
    }
}
