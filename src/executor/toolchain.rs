use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use ts_rs::TS;

use crate::model::Language;

use super::process::ProcessOutput;

/// External program names, resolved through `PATH` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Toolchain {
    pub python: String,
    pub cpp: String,
    pub javac: String,
    pub java: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            python: "python3".into(),
            cpp: "c++".into(),
            javac: "javac".into(),
            java: "java".into(),
        }
    }
}

const CPP_EXECUTABLE: &str = "main";
const JAVA_MAIN_CLASS: &str = "Main";

impl Toolchain {
    /// First step for `language`, run inside `scope`. For the interpreted
    /// language this is the execution itself.
    pub fn compile_command(&self, language: Language, scope: &Path) -> Command {
        let source = language.source_file_name();
        let mut cmd = match language {
            Language::Python => {
                let mut cmd = Command::new(&self.python);
                cmd.arg(source);
                cmd
            }
            Language::Cpp => {
                let mut cmd = Command::new(&self.cpp);
                cmd.args(["-o", CPP_EXECUTABLE, source]);
                cmd
            }
            Language::Java => {
                let mut cmd = Command::new(&self.javac);
                cmd.arg(source);
                cmd
            }
        };
        cmd.current_dir(scope);
        cmd
    }

    /// Second step, or `None` when the first step already produced the
    /// program's output.
    pub fn run_command(&self, language: Language, scope: &Path) -> Option<Command> {
        let mut cmd = match language {
            Language::Python => return None,
            Language::Cpp => Command::new(scope.join(CPP_EXECUTABLE)),
            Language::Java => {
                let mut cmd = Command::new(&self.java);
                cmd.arg("-cp").arg(scope).arg(JAVA_MAIN_CLASS);
                cmd
            }
        };
        cmd.current_dir(scope);
        Some(cmd)
    }
}

/// Files a language leaves behind in its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    File(&'static str),
    /// Every `*.class` file; javac emits one per top-level and nested class.
    ClassFiles,
}

pub fn artifacts(language: Language) -> &'static [Artifact] {
    match language {
        Language::Python => &[Artifact::File("main.py")],
        Language::Cpp => &[Artifact::File("main.cpp"), Artifact::File(CPP_EXECUTABLE)],
        Language::Java => &[Artifact::File("Main.java"), Artifact::ClassFiles],
    }
}

/// How a finished toolchain step is judged to have failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FailureDetection {
    /// Case-insensitive marker substring in stderr (`error` for compiled
    /// languages, `traceback` for Python). A program that merely prints
    /// the marker to stderr is misclassified.
    #[default]
    StderrHeuristic,
    /// Non-zero exit status.
    ExitStatus,
}

impl FailureDetection {
    pub fn is_failure(self, language: Language, output: &ProcessOutput) -> bool {
        match self {
            FailureDetection::StderrHeuristic => output
                .stderr
                .to_lowercase()
                .contains(failure_marker(language)),
            FailureDetection::ExitStatus => !output.success,
        }
    }
}

fn failure_marker(language: Language) -> &'static str {
    match language {
        Language::Python => "traceback",
        Language::Cpp | Language::Java => "error",
    }
}
