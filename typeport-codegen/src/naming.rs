//! TypeScript naming conventions for generated identifiers and files.

use typeport_core::{to_camel_case, to_kebab_case, to_pascal_case};

/// Naming rules for the TypeScript output: identifier transforms and
/// reserved-word escaping.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    pub reserved_words: &'static [&'static str],
}

impl NamingConvention {
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    /// Escape a reserved word with a leading underscore.
    pub fn safe_name(&self, name: &str) -> String {
        if self.is_reserved(name) {
            format!("_{name}")
        } else {
            name.to_string()
        }
    }

    /// Type name: PascalCase, escaped if reserved.
    pub fn type_name(&self, name: &str) -> String {
        self.safe_name(&to_pascal_case(name))
    }

    /// File stem: kebab-case.
    pub fn file_name(&self, name: &str) -> String {
        to_kebab_case(name)
    }

    /// Property/field name: camelCase, escaped if reserved.
    pub fn field_name(&self, name: &str) -> String {
        self.safe_name(&to_camel_case(name))
    }
}

/// TypeScript naming conventions.
pub const TYPESCRIPT_NAMING: NamingConvention = NamingConvention {
    reserved_words: &[
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "as",
        "implements",
        "interface",
        "let",
        "package",
        "private",
        "protected",
        "public",
        "static",
        "yield",
        "constructor",
        "declare",
        "get",
        "module",
        "require",
        "set",
        "symbol",
        "type",
        "from",
        "of",
        "async",
        "await",
    ],
};
