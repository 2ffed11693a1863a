use std::sync::Arc;

use crate::model::{CollectionKind, Language, TypeTag};
use crate::templates::{GenerationError, LanguageTemplates, TemplateKind};

use super::LanguageBackend;

/// Collections are declared empty and then filled statement by statement,
/// which keeps every shape valid under older standards without brace
/// initialization.
pub struct CppBackend {
    templates: Arc<LanguageTemplates>,
}

impl CppBackend {
    pub fn new(templates: Arc<LanguageTemplates>) -> Self {
        Self { templates }
    }
}

impl LanguageBackend for CppBackend {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn map_type(&self, tag: TypeTag) -> String {
        match tag {
            TypeTag::Integer => "int",
            TypeTag::Float => "double",
            TypeTag::Boolean => "bool",
            TypeTag::String => "string",
        }
        .to_string()
    }

    fn simple(&self, name: &str, tag: TypeTag, literal: &str) -> Result<String, GenerationError> {
        self.templates
            .fill(TemplateKind::Scalar, &[&self.map_type(tag), name, literal])
    }

    fn add_element(&self, kind: CollectionKind, name: &str, literal: &str) -> String {
        match kind {
            CollectionKind::Array => format!(" {name}.push_back({literal});"),
            CollectionKind::Set => format!(" {name}.insert({literal});"),
        }
    }

    fn init_collection(
        &self,
        kind: CollectionKind,
        name: &str,
        element: TypeTag,
        elements: &str,
    ) -> Result<String, GenerationError> {
        let template = match kind {
            CollectionKind::Array => TemplateKind::Array,
            CollectionKind::Set => TemplateKind::Set,
        };
        self.templates
            .fill(template, &[&self.map_type(element), name, elements])
    }

    fn add_entry(&self, name: &str, key: &str, value: &str) -> String {
        format!(" {name}[{key}] = {value};")
    }

    fn init_map(
        &self,
        name: &str,
        key: TypeTag,
        value: TypeTag,
        entries: &str,
    ) -> Result<String, GenerationError> {
        self.templates.fill(
            TemplateKind::Map,
            &[&self.map_type(key), &self.map_type(value), name, entries],
        )
    }

    fn argument_block(&self, declarations: &str, names: &str) -> Result<String, GenerationError> {
        let indented = declarations
            .lines()
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.templates
            .fill(TemplateKind::Arguments, &[&indented, names])
    }

    fn program(&self, argument_block: &str, solution: &str) -> Result<String, GenerationError> {
        self.templates
            .fill(TemplateKind::Main, &[argument_block, solution])
    }
}
