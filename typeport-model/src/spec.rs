use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{TypeKey, TypeKind};

/// The declaration shape to emit for an exported type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportShape {
    Class,
    Interface,
    Enum,
}

impl ExportShape {
    /// Infer the shape from a type's own classification, for dependencies
    /// discovered without an explicit export directive.
    pub fn infer(kind: TypeKind) -> Option<Self> {
        match kind {
            TypeKind::Class => Some(Self::Class),
            TypeKind::Interface => Some(Self::Interface),
            TypeKind::Enum => Some(Self::Enum),
            _ => None,
        }
    }
}

/// Export directive for one type: where it goes and what shape it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Explicit shape override; `None` means infer from the type's kind.
    #[serde(default)]
    pub shape: Option<ExportShape>,
    /// Output directory, relative to the generation root.
    #[serde(default)]
    pub output: String,
    /// Annotation overrides supplied with the directive rather than
    /// discovered from metadata.
    #[serde(default)]
    pub annotations: IndexMap<String, serde_json::Value>,
}

impl TypeSpec {
    pub fn in_dir(output: impl Into<String>) -> Self {
        Self {
            shape: None,
            output: output.into(),
            annotations: IndexMap::new(),
        }
    }

    pub fn with_shape(mut self, shape: ExportShape) -> Self {
        self.shape = Some(shape);
        self
    }
}

/// A caller-supplied request to export one type.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub key: TypeKey,
    pub spec: TypeSpec,
}

/// Outcome of registering a spec for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First registration for the key.
    Inserted,
    /// A spec was already registered; the new one is ignored. `differs`
    /// reports whether the ignored spec requested something different.
    Ignored { differs: bool },
}

/// Registry of export specs keyed by type, merged first-registered-wins.
///
/// Distinct spec sources may ask for the same key; the first registration is
/// authoritative and later ones never silently overwrite it. Callers inspect
/// the [`Registration`] outcome to surface conflicting duplicates.
#[derive(Debug, Default)]
pub struct SpecRegistry {
    specs: IndexMap<TypeKey, TypeSpec>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec for a key. The first registration wins.
    pub fn register(&mut self, key: TypeKey, spec: TypeSpec) -> Registration {
        match self.specs.get(&key) {
            Some(existing) => Registration::Ignored {
                differs: *existing != spec,
            },
            None => {
                self.specs.insert(key, spec);
                Registration::Inserted
            }
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<&TypeSpec> {
        self.specs.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.specs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &TypeSpec)> {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let mut registry = SpecRegistry::new();
        let key = TypeKey::simple("Order");

        let first = registry.register(key.clone(), TypeSpec::in_dir("models"));
        assert_eq!(first, Registration::Inserted);

        let second = registry.register(key.clone(), TypeSpec::in_dir("elsewhere"));
        assert_eq!(second, Registration::Ignored { differs: true });
        assert_eq!(registry.get(&key).unwrap().output, "models");
    }

    #[test]
    fn test_identical_duplicate_is_quiet() {
        let mut registry = SpecRegistry::new();
        let key = TypeKey::simple("Order");

        registry.register(key.clone(), TypeSpec::in_dir("models"));
        let again = registry.register(key, TypeSpec::in_dir("models"));
        assert_eq!(again, Registration::Ignored { differs: false });
    }

    #[test]
    fn test_infer_shape() {
        assert_eq!(
            ExportShape::infer(TypeKind::Interface),
            Some(ExportShape::Interface)
        );
        assert_eq!(ExportShape::infer(TypeKind::Collection), None);
    }
}
