use std::path::PathBuf;

use thiserror::Error;
use typeport_model::TypeKey;

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Fatal generation failures.
///
/// Everything here aborts the run. Non-fatal conditions travel as
/// [`crate::Diagnostic`]s on the result instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no export seeds supplied")]
    NoSeeds,

    #[error("metadata lookup failed for '{key}'")]
    Metadata {
        key: TypeKey,
        #[source]
        source: Box<typeport_model::Error>,
    },

    #[error("types '{first}' and '{second}' both resolve to '{path}'")]
    DuplicateOutputPath {
        first: TypeKey,
        second: TypeKey,
        path: PathBuf,
    },

    #[error("strict mode: {failed} type(s) failed to render")]
    Strict { failed: usize },

    #[error("failed to write '{path}'")]
    Sink {
        path: PathBuf,
        #[source]
        source: eyre::Report,
    },

    #[error("failed to scan output directory '{path}'")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn metadata(key: &TypeKey, source: Box<typeport_model::Error>) -> Self {
        Self::Metadata {
            key: key.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_path_names_both_types() {
        let err = GenerateError::DuplicateOutputPath {
            first: TypeKey::simple("Order"),
            second: TypeKey::simple("Orders.Order"),
            path: PathBuf::from("models/order.ts"),
        };
        let message = err.to_string();
        assert!(message.contains("Order"));
        assert!(message.contains("Orders.Order"));
        assert!(message.contains("models/order.ts"));
    }
}
