use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::TypeKey;

/// Result type for model operations (boxed to keep the Ok path small).
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file")]
    #[diagnostic(code(typeport::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("invalid type expression '{expr}': {reason}")]
    #[diagnostic(code(typeport::type_expr))]
    TypeExpr { expr: String, reason: String },

    #[error("unknown type '{key}'")]
    #[diagnostic(
        code(typeport::unknown_type),
        help("declare the type under [types.{key}] or map it as a primitive")
    )]
    UnknownType { key: TypeKey },

    #[error("{message}")]
    #[diagnostic(code(typeport::invalid_model))]
    Validation { message: String },
}

impl Error {
    /// Create a parse error with miette source context.
    pub fn parse(source: toml::de::Error, content: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Self::Parse {
            src: NamedSource::new(filename, content.to_string()),
            span,
            source: Box::new(source),
        })
    }

    pub fn unknown_type(key: &TypeKey) -> Box<Self> {
        Box::new(Self::UnknownType { key: key.clone() })
    }

    pub fn validation(message: impl Into<String>) -> Box<Self> {
        Box::new(Self::Validation {
            message: message.into(),
        })
    }
}
