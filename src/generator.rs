//! Whole-program synthesis: every parsed argument declared under a
//! positional binding name, then the solution call, then the submitted code.

use std::path::{Path, PathBuf};

use crate::backends::LanguageBackend;
use crate::model::{Language, TypedArgument};

pub use crate::templates::GenerationError;

/// Binding name for the argument at `index`. Names are positional so that
/// they can never collide with identifiers in the submitted solution's
/// parameter list.
pub fn binding_name(index: usize) -> String {
    format!("input_{index}")
}

/// Render the complete source file for `arguments` and `solution`.
pub fn generate_program(
    arguments: &[TypedArgument],
    solution: &str,
    backend: &dyn LanguageBackend,
) -> Result<String, GenerationError> {
    let names: Vec<String> = (0..arguments.len()).map(binding_name).collect();
    let declarations = arguments
        .iter()
        .zip(&names)
        .map(|(argument, name)| argument.generate(name, backend))
        .collect::<Result<Vec<_>, _>>()?;

    let block = backend.argument_block(&declarations.join("\n"), &names.join(", "))?;
    backend.program(&block, solution)
}

/// Write `contents` as the language's source file inside `dir`.
pub fn write_source(
    dir: &Path,
    language: Language,
    contents: &str,
) -> Result<PathBuf, GenerationError> {
    let path = dir.join(language.source_file_name());
    std::fs::write(&path, contents).map_err(|e| GenerationError::WriteSource {
        path: path.clone(),
        message: e.to_string(),
    })?;
    Ok(path)
}
