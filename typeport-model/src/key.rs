use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a type: fully-qualified name plus generic arity.
///
/// Keys are the identity used for closure membership; two descriptors with
/// the same key are the same type as far as resolution is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TypeKey {
    name: String,
    arity: usize,
}

impl TypeKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// A non-generic key.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    /// Fully-qualified type name, without arity suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The unqualified (last-segment) name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Number of generic parameters.
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arity == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}`{}", self.name, self.arity)
        }
    }
}

impl From<TypeKey> for String {
    fn from(key: TypeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for TypeKey {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.split_once('`') {
            Some((name, arity)) => Ok(Self::new(name, arity.parse()?)),
            None => Ok(Self::simple(value)),
        }
    }
}
