use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Target languages the service can synthesize and run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Language {
    Python,
    Java,
    #[serde(alias = "c++")]
    #[value(alias = "c++")]
    Cpp,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Java, Language::Cpp];

    /// Wire and directory name (`python`, `java`, `cpp`).
    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Name of the generated source file inside a request scope.
    /// Java requires the file to match the public `Main` class.
    pub fn source_file_name(self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::Java => "Main.java",
            Language::Cpp => "main.cpp",
        }
    }

    /// Parse the wire spelling, accepting the `c++` alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cpp" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.name()), Some(lang));
        }
        assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_name("rust"), None);
    }

    #[test]
    fn serde_accepts_cpp_alias() {
        let lang: Language = serde_json::from_str("\"c++\"").unwrap();
        assert_eq!(lang, Language::Cpp);
        assert_eq!(serde_json::to_string(&Language::Cpp).unwrap(), "\"cpp\"");
    }
}
