pub mod cpp;
pub mod java;
pub mod python;

use std::sync::Arc;

use crate::model::{CollectionKind, Language, TypeTag, Value};
use crate::templates::{GenerationError, LanguageTemplates, TemplateStore};

/// Per-language code generation. A backend knows how its language spells
/// types and literals and how it declares and fills each collection shape;
/// the argument model decides what to ask for and in which order.
///
/// Every method returning `Result` fills one of the language's templates.
pub trait LanguageBackend: Send + Sync {
    fn language(&self) -> Language;

    /// Target-language name for a scalar type.
    fn map_type(&self, tag: TypeTag) -> String;

    /// Boxed name, for languages whose generic containers cannot hold
    /// primitives. Defaults to [`LanguageBackend::map_type`].
    fn wrapper_type(&self, tag: TypeTag) -> String {
        self.map_type(tag)
    }

    /// Source spelling of a literal value.
    fn render_literal(&self, value: &Value) -> String {
        render_literal(value, false)
    }

    /// Declaration of a scalar bound to `name`.
    fn simple(&self, name: &str, tag: TypeTag, literal: &str) -> Result<String, GenerationError>;

    /// Fragment adding one rendered element to collection `name`.
    fn add_element(&self, kind: CollectionKind, name: &str, literal: &str) -> String;

    /// Declaration of collection `name` wrapping its concatenated fragments.
    fn init_collection(
        &self,
        kind: CollectionKind,
        name: &str,
        element: TypeTag,
        elements: &str,
    ) -> Result<String, GenerationError>;

    /// Fragment adding one rendered key/value pair to map `name`.
    fn add_entry(&self, name: &str, key: &str, value: &str) -> String;

    /// Declaration of map `name` wrapping its concatenated entry fragments.
    fn init_map(
        &self,
        name: &str,
        key: TypeTag,
        value: TypeTag,
        entries: &str,
    ) -> Result<String, GenerationError>;

    /// All argument declarations followed by the call into the solution.
    fn argument_block(&self, declarations: &str, names: &str) -> Result<String, GenerationError>;

    /// The complete program.
    fn program(&self, argument_block: &str, solution: &str) -> Result<String, GenerationError>;
}

/// Resolve a language to its backend, bound to that language's templates.
pub fn resolve_backend(
    language: Language,
    store: &TemplateStore,
) -> Result<Box<dyn LanguageBackend>, GenerationError> {
    let templates = store.get(language)?;
    Ok(backend_for(templates))
}

/// Wrap already-loaded templates in the backend for their language.
pub fn backend_for(templates: Arc<LanguageTemplates>) -> Box<dyn LanguageBackend> {
    match templates.language() {
        Language::Python => Box::new(python::PythonBackend::new(templates)),
        Language::Java => Box::new(java::JavaBackend::new(templates)),
        Language::Cpp => Box::new(cpp::CppBackend::new(templates)),
    }
}

// ── Shared type-name and literal helpers ─────────────────────────

pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Literal spelling shared by all three languages; they only differ in the
/// case of boolean keywords.
pub(crate) fn render_literal(value: &Value, capitalize_bool: bool) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        // Debug formatting always keeps a decimal point or exponent, so a
        // whole float still reads as a float (`3.0`, not `3`).
        Value::Float(f) => format!("{f:?}"),
        Value::Bool(b) if capitalize_bool => capitalize_first(&b.to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Str(s) => quote(s),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
