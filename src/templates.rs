//! File-backed code templates, one directory per language.
//!
//! Each template is plain target-language text with `%v` placeholders that
//! are filled strictly in order. Placeholder counts are checked once at load
//! time against what the generator supplies for that template, so a broken
//! template fails the service at startup rather than a request at runtime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::model::Language;

pub const PLACEHOLDER: &str = "%v";

// ── Errors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("template {} could not be read: {message}", .path.display())]
    MissingTemplate { path: PathBuf, message: String },
    #[error("template {template} has {found} placeholders, expected {expected}")]
    PlaceholderCount {
        template: String,
        expected: usize,
        found: usize,
    },
    #[error("no templates loaded for {0}")]
    UnsupportedLanguage(Language),
    #[error("failed to write {}: {message}", .path.display())]
    WriteSource { path: PathBuf, message: String },
}

// ── Template kinds ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Declaration of a single scalar.
    Scalar,
    /// Array declaration wrapping the concatenated element fragments.
    Array,
    /// Set declaration wrapping the concatenated element fragments.
    Set,
    /// Map declaration wrapping the concatenated entry fragments.
    Map,
    /// All argument declarations plus the call into the solution.
    Arguments,
    /// The complete program: argument block and submitted solution.
    Main,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::Scalar,
        TemplateKind::Array,
        TemplateKind::Set,
        TemplateKind::Map,
        TemplateKind::Arguments,
        TemplateKind::Main,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Scalar => "simple.txt",
            TemplateKind::Array => "array.txt",
            TemplateKind::Set => "set.txt",
            TemplateKind::Map => "map.txt",
            TemplateKind::Arguments => "arguments.txt",
            TemplateKind::Main => "main.txt",
        }
    }

    /// Number of values the backend for `language` passes to this template.
    /// Must stay in step with the `fill` calls in `backends/`.
    pub fn arity(self, language: Language) -> usize {
        match (self, language) {
            (TemplateKind::Scalar | TemplateKind::Array | TemplateKind::Set, Language::Python)
            | (TemplateKind::Map, Language::Python)
            | (TemplateKind::Arguments | TemplateKind::Main, _) => 2,
            (TemplateKind::Scalar | TemplateKind::Array | TemplateKind::Set, Language::Cpp)
            | (TemplateKind::Scalar, Language::Java) => 3,
            (TemplateKind::Array | TemplateKind::Set, Language::Java)
            | (TemplateKind::Map, Language::Cpp) => 4,
            (TemplateKind::Map, Language::Java) => 6,
        }
    }
}

// ── Templates ────────────────────────────────────────────────────

/// A parsed template: literal text split around its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    pieces: Vec<String>,
}

impl Template {
    pub fn parse(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            pieces: text.split(PLACEHOLDER).map(str::to_string).collect(),
        }
    }

    pub fn placeholders(&self) -> usize {
        self.pieces.len().saturating_sub(1)
    }

    /// Substitute `values` in order. Substituted text is never rescanned, so
    /// a value containing `%v` is copied through untouched.
    pub fn fill(&self, values: &[&str]) -> Result<String, GenerationError> {
        if values.len() != self.placeholders() {
            return Err(GenerationError::PlaceholderCount {
                template: self.name.clone(),
                expected: values.len(),
                found: self.placeholders(),
            });
        }

        let capacity = self.pieces.iter().map(String::len).sum::<usize>()
            + values.iter().map(|v| v.len()).sum::<usize>();
        let mut out = String::with_capacity(capacity);
        let mut pieces = self.pieces.iter();
        if let Some(first) = pieces.next() {
            out.push_str(first);
        }
        for (value, piece) in values.iter().zip(pieces) {
            out.push_str(value);
            out.push_str(piece);
        }
        Ok(out)
    }
}

/// The six templates for one language.
#[derive(Debug, Clone)]
pub struct LanguageTemplates {
    language: Language,
    templates: HashMap<TemplateKind, Template>,
}

impl LanguageTemplates {
    /// Read and validate `dir/<kind>.txt` for every template kind.
    pub fn load(language: Language, dir: &Path) -> Result<Self, GenerationError> {
        let mut templates = HashMap::new();
        for kind in TemplateKind::ALL {
            let path = dir.join(kind.file_name());
            let text = std::fs::read_to_string(&path).map_err(|e| {
                GenerationError::MissingTemplate {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;
            templates.insert(kind, Self::checked(language, kind, &text)?);
        }
        Ok(Self {
            language,
            templates,
        })
    }

    /// Build from in-memory sources, validated the same way as [`Self::load`].
    pub fn from_sources(
        language: Language,
        sources: &[(TemplateKind, &str)],
    ) -> Result<Self, GenerationError> {
        let mut templates = HashMap::new();
        for &(kind, text) in sources {
            templates.insert(kind, Self::checked(language, kind, text)?);
        }
        for kind in TemplateKind::ALL {
            if !templates.contains_key(&kind) {
                return Err(GenerationError::MissingTemplate {
                    path: PathBuf::from(language.name()).join(kind.file_name()),
                    message: "not provided".into(),
                });
            }
        }
        Ok(Self {
            language,
            templates,
        })
    }

    fn checked(
        language: Language,
        kind: TemplateKind,
        text: &str,
    ) -> Result<Template, GenerationError> {
        // Fragments are spliced into other templates; the file's own final
        // newline is not part of the fragment.
        let text = if kind == TemplateKind::Main {
            text
        } else {
            text.strip_suffix('\n')
                .map_or(text, |t| t.strip_suffix('\r').unwrap_or(t))
        };
        let template = Template::parse(format!("{}/{}", language.name(), kind.file_name()), text);
        let expected = kind.arity(language);
        let found = template.placeholders();
        if found != expected {
            return Err(GenerationError::PlaceholderCount {
                template: template.name,
                expected,
                found,
            });
        }
        Ok(template)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn fill(&self, kind: TemplateKind, values: &[&str]) -> Result<String, GenerationError> {
        self.templates
            .get(&kind)
            .ok_or(GenerationError::UnsupportedLanguage(self.language))?
            .fill(values)
    }
}

/// Templates for every enabled language, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    languages: HashMap<Language, Arc<LanguageTemplates>>,
}

impl TemplateStore {
    /// Load `root/<language>/` for each language in `languages`.
    pub fn load(root: &Path, languages: &[Language]) -> Result<Self, GenerationError> {
        let mut store = Self::default();
        for &language in languages {
            let templates = LanguageTemplates::load(language, &root.join(language.name()))?;
            log::debug!("loaded templates for {language} from {}", root.display());
            store.insert(templates);
        }
        Ok(store)
    }

    pub fn insert(&mut self, templates: LanguageTemplates) {
        self.languages
            .insert(templates.language(), Arc::new(templates));
    }

    pub fn get(&self, language: Language) -> Result<Arc<LanguageTemplates>, GenerationError> {
        self.languages
            .get(&language)
            .cloned()
            .ok_or(GenerationError::UnsupportedLanguage(language))
    }

    pub fn contains(&self, language: Language) -> bool {
        self.languages.contains_key(&language)
    }

    /// Loaded languages in a stable order.
    pub fn languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|l| self.languages.contains_key(l))
            .collect()
    }
}

/// Directory holding the templates shipped with the crate.
pub fn bundled_dir() -> PathBuf {
    crate::paths::bundled_templates_dir()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_positional_and_single_pass() {
        let t = Template::parse("t", "%v = [%v]");
        assert_eq!(t.placeholders(), 2);
        assert_eq!(t.fill(&["xs", "1,%v,"]).unwrap(), "xs = [1,%v,]");
    }

    #[test]
    fn fill_rejects_wrong_value_count() {
        let t = Template::parse("t", "%v = %v");
        let err = t.fill(&["x"]).unwrap_err();
        assert!(matches!(err, GenerationError::PlaceholderCount { found: 2, .. }));
    }

    #[test]
    fn bundled_templates_load_for_every_language() {
        let store = TemplateStore::load(&bundled_dir(), &Language::ALL).unwrap();
        assert_eq!(store.languages(), Language::ALL.to_vec());
    }

    #[test]
    fn load_validates_placeholder_counts() {
        let err = LanguageTemplates::from_sources(
            Language::Python,
            &[
                (TemplateKind::Scalar, "%v = %v = %v\n"),
                (TemplateKind::Array, "%v = [%v]"),
                (TemplateKind::Set, "%v = set([%v])"),
                (TemplateKind::Map, "%v = {%v}"),
                (TemplateKind::Arguments, "%v\n%v"),
                (TemplateKind::Main, "%v\n%v\n"),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GenerationError::PlaceholderCount {
                template: "python/simple.txt".into(),
                expected: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateStore::load(dir.path(), &[Language::Cpp]).unwrap_err();
        assert!(matches!(err, GenerationError::MissingTemplate { .. }));
    }

    #[test]
    fn unloaded_language_is_unsupported() {
        let store = TemplateStore::load(&bundled_dir(), &[Language::Python]).unwrap();
        assert!(store.contains(Language::Python));
        assert_eq!(
            store.get(Language::Java).unwrap_err(),
            GenerationError::UnsupportedLanguage(Language::Java)
        );
    }
}
