use std::fmt;

use serde::Serialize;

use crate::backends::LanguageBackend;
use crate::templates::GenerationError;

// ── Type tags ─────────────────────────────────────────────────────

/// The four scalar kinds an argument (or a collection member) can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Integer,
    Float,
    Boolean,
    String,
}

impl TypeTag {
    pub const ALL: [TypeTag; 4] = [
        TypeTag::Integer,
        TypeTag::Float,
        TypeTag::Boolean,
        TypeTag::String,
    ];

    /// Resolve a scalar type name as written in a type annotation.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(TypeTag::Integer),
            "float" => Some(TypeTag::Float),
            "bool" => Some(TypeTag::Boolean),
            "string" => Some(TypeTag::String),
            _ => None,
        }
    }

    /// The annotation spelling, inverse of [`TypeTag::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Integer => "int",
            TypeTag::Float => "float",
            TypeTag::Boolean => "bool",
            TypeTag::String => "string",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Values ────────────────────────────────────────────────────────

/// A single parsed literal. The variant is the resolved type; nothing
/// downstream re-derives it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// 32-bit so every backend's `int` can hold it.
    Int(i32),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Str(_) => TypeTag::String,
        }
    }
}

// ── Arguments ─────────────────────────────────────────────────────

/// One parsed argument, in one of the four supported shapes.
///
/// Collections carry their element type explicitly so that empty literals
/// still know what to declare. Every member of a collection has exactly the
/// declared tag; the parser is the only producer and upholds this.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum TypedArgument {
    Scalar {
        value: Value,
    },
    Array {
        elements: Vec<Value>,
        element_type: TypeTag,
    },
    Set {
        elements: Vec<Value>,
        element_type: TypeTag,
    },
    Map {
        pairs: Vec<(Value, Value)>,
        key_type: TypeTag,
        value_type: TypeTag,
    },
}

/// Array and set share their assembly logic and differ only in the
/// target-language idiom, which the backend selects by this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Array,
    Set,
}

impl TypedArgument {
    pub fn scalar(value: Value) -> Self {
        TypedArgument::Scalar { value }
    }

    /// Short human-readable shape, e.g. `[]int` or `{}string,bool`.
    pub fn annotation(&self) -> String {
        match self {
            TypedArgument::Scalar { value } => value.tag().name().to_string(),
            TypedArgument::Array { element_type, .. } => format!("[]{element_type}"),
            TypedArgument::Set { element_type, .. } => format!("(){element_type}"),
            TypedArgument::Map {
                key_type,
                value_type,
                ..
            } => format!("{{}}{key_type},{value_type}"),
        }
    }

    /// Number of members for composites, 1 for scalars.
    pub fn len(&self) -> usize {
        match self {
            TypedArgument::Scalar { .. } => 1,
            TypedArgument::Array { elements, .. } | TypedArgument::Set { elements, .. } => {
                elements.len()
            }
            TypedArgument::Map { pairs, .. } => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declaration of this argument bound to `name` in the backend's
    /// language. Collections are assembled from one fragment per member,
    /// in input order, wrapped by the shape's declaration.
    pub fn generate(
        &self,
        name: &str,
        backend: &dyn LanguageBackend,
    ) -> Result<String, GenerationError> {
        match self {
            TypedArgument::Scalar { value } => {
                backend.simple(name, value.tag(), &backend.render_literal(value))
            }
            TypedArgument::Array {
                elements,
                element_type,
            } => collection(backend, CollectionKind::Array, name, *element_type, elements),
            TypedArgument::Set {
                elements,
                element_type,
            } => collection(backend, CollectionKind::Set, name, *element_type, elements),
            TypedArgument::Map {
                pairs,
                key_type,
                value_type,
            } => {
                let entries: String = pairs
                    .iter()
                    .map(|(k, v)| {
                        backend.add_entry(name, &backend.render_literal(k), &backend.render_literal(v))
                    })
                    .collect();
                backend.init_map(name, *key_type, *value_type, &entries)
            }
        }
    }
}

fn collection(
    backend: &dyn LanguageBackend,
    kind: CollectionKind,
    name: &str,
    element_type: TypeTag,
    elements: &[Value],
) -> Result<String, GenerationError> {
    let fragments: String = elements
        .iter()
        .map(|e| backend.add_element(kind, name, &backend.render_literal(e)))
        .collect();
    backend.init_collection(kind, name, element_type, &fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_round_trip() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_name(tag.name()), Some(tag));
        }
        assert_eq!(TypeTag::from_name("float32"), None);
        assert_eq!(TypeTag::from_name("Int"), None);
    }

    #[test]
    fn value_tags() {
        assert_eq!(Value::Int(1).tag(), TypeTag::Integer);
        assert_eq!(Value::Float(1.5).tag(), TypeTag::Float);
        assert_eq!(Value::Bool(true).tag(), TypeTag::Boolean);
        assert_eq!(Value::Str("x".into()).tag(), TypeTag::String);
    }

    #[test]
    fn annotations_mirror_the_input_grammar() {
        let map = TypedArgument::Map {
            pairs: vec![],
            key_type: TypeTag::String,
            value_type: TypeTag::Boolean,
        };
        assert_eq!(map.annotation(), "{}string,bool");
        assert!(map.is_empty());

        let set = TypedArgument::Set {
            elements: vec![Value::Float(3.4), Value::Float(5.6)],
            element_type: TypeTag::Float,
        };
        assert_eq!(set.annotation(), "()float");
        assert_eq!(set.len(), 2);
    }
}
