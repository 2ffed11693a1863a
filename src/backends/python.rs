use std::sync::Arc;

use crate::model::{CollectionKind, Language, TypeTag, Value};
use crate::templates::{GenerationError, LanguageTemplates, TemplateKind};

use super::{render_literal, LanguageBackend};

/// Dynamically typed: declarations never name a type, so the type tags only
/// matter for documentation and the literal spelling.
pub struct PythonBackend {
    templates: Arc<LanguageTemplates>,
}

impl PythonBackend {
    pub fn new(templates: Arc<LanguageTemplates>) -> Self {
        Self { templates }
    }
}

impl LanguageBackend for PythonBackend {
    fn language(&self) -> Language {
        Language::Python
    }

    fn map_type(&self, tag: TypeTag) -> String {
        match tag {
            TypeTag::Integer => "int",
            TypeTag::Float => "float",
            TypeTag::Boolean => "bool",
            TypeTag::String => "str",
        }
        .to_string()
    }

    fn render_literal(&self, value: &Value) -> String {
        render_literal(value, true)
    }

    fn simple(&self, name: &str, _tag: TypeTag, literal: &str) -> Result<String, GenerationError> {
        self.templates.fill(TemplateKind::Scalar, &[name, literal])
    }

    fn add_element(&self, _kind: CollectionKind, _name: &str, literal: &str) -> String {
        format!("{literal},")
    }

    fn init_collection(
        &self,
        kind: CollectionKind,
        name: &str,
        _element: TypeTag,
        elements: &str,
    ) -> Result<String, GenerationError> {
        let template = match kind {
            CollectionKind::Array => TemplateKind::Array,
            CollectionKind::Set => TemplateKind::Set,
        };
        self.templates.fill(template, &[name, elements])
    }

    fn add_entry(&self, _name: &str, key: &str, value: &str) -> String {
        format!("{key}:{value},")
    }

    fn init_map(
        &self,
        name: &str,
        _key: TypeTag,
        _value: TypeTag,
        entries: &str,
    ) -> Result<String, GenerationError> {
        self.templates.fill(TemplateKind::Map, &[name, entries])
    }

    fn argument_block(&self, declarations: &str, names: &str) -> Result<String, GenerationError> {
        self.templates
            .fill(TemplateKind::Arguments, &[declarations, names])
    }

    fn program(&self, argument_block: &str, solution: &str) -> Result<String, GenerationError> {
        self.templates
            .fill(TemplateKind::Main, &[argument_block, solution])
    }
}
