use std::sync::Arc;

use crate::model::{CollectionKind, Language, TypeTag};
use crate::templates::{GenerationError, LanguageTemplates, TemplateKind};

use super::{capitalize_first, LanguageBackend};

/// Arrays use primitive element types; sets and maps need boxed ones and are
/// filled with instance-initializer blocks (`new HashSet<T>() {{ add(..); }}`).
pub struct JavaBackend {
    templates: Arc<LanguageTemplates>,
}

impl JavaBackend {
    pub fn new(templates: Arc<LanguageTemplates>) -> Self {
        Self { templates }
    }
}

impl LanguageBackend for JavaBackend {
    fn language(&self) -> Language {
        Language::Java
    }

    fn map_type(&self, tag: TypeTag) -> String {
        match tag {
            TypeTag::Integer => "int",
            TypeTag::Float => "double",
            TypeTag::Boolean => "boolean",
            TypeTag::String => "String",
        }
        .to_string()
    }

    fn wrapper_type(&self, tag: TypeTag) -> String {
        match tag {
            TypeTag::Integer => "Integer".to_string(),
            other => capitalize_first(&self.map_type(other)),
        }
    }

    fn simple(&self, name: &str, tag: TypeTag, literal: &str) -> Result<String, GenerationError> {
        self.templates
            .fill(TemplateKind::Scalar, &[&self.map_type(tag), name, literal])
    }

    fn add_element(&self, kind: CollectionKind, _name: &str, literal: &str) -> String {
        match kind {
            CollectionKind::Array => format!("{literal},"),
            CollectionKind::Set => format!(" add({literal});"),
        }
    }

    fn init_collection(
        &self,
        kind: CollectionKind,
        name: &str,
        element: TypeTag,
        elements: &str,
    ) -> Result<String, GenerationError> {
        match kind {
            CollectionKind::Array => {
                let ty = self.map_type(element);
                self.templates
                    .fill(TemplateKind::Array, &[&ty, name, &ty, elements])
            }
            CollectionKind::Set => {
                let ty = self.wrapper_type(element);
                self.templates
                    .fill(TemplateKind::Set, &[&ty, name, &ty, elements])
            }
        }
    }

    fn add_entry(&self, _name: &str, key: &str, value: &str) -> String {
        format!(" put({key}, {value});")
    }

    fn init_map(
        &self,
        name: &str,
        key: TypeTag,
        value: TypeTag,
        entries: &str,
    ) -> Result<String, GenerationError> {
        let k = self.wrapper_type(key);
        let v = self.wrapper_type(value);
        self.templates
            .fill(TemplateKind::Map, &[&k, &v, name, &k, &v, entries])
    }

    fn argument_block(&self, declarations: &str, names: &str) -> Result<String, GenerationError> {
        // Declarations live inside `main`; indent them to match the call.
        let indented = declarations
            .lines()
            .map(|line| format!("        {line}"))
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
