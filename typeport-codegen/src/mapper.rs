//! Mapping from type references to TypeScript type-name strings.

use std::sync::Arc;

use indexmap::IndexMap;
use typeport_model::{MetadataProvider, TypeKey, TypeKind, TypeRef};

use crate::{
    GenerateError, Result,
    naming::{NamingConvention, TYPESCRIPT_NAMING},
};

/// Classification of a type for mapping and materialization purposes.
///
/// Only `Complex` types materialize as output files; the rest map to
/// built-in TypeScript forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Simple,
    Collection,
    Dictionary,
    Complex,
}

/// Maps type references to TypeScript names.
///
/// Mapping is a pure function of the descriptor graph: the mapper queries
/// the provider for classification but never triggers resolution.
pub struct TypeNameMapper {
    provider: Arc<dyn MetadataProvider>,
    /// Host primitive name -> TypeScript primitive name.
    primitives: IndexMap<String, String>,
    naming: NamingConvention,
}

impl TypeNameMapper {
    pub fn new(provider: Arc<dyn MetadataProvider>, primitives: IndexMap<String, String>) -> Self {
        Self {
            provider,
            primitives,
            naming: TYPESCRIPT_NAMING,
        }
    }

    /// Classify a type by key.
    pub fn classify(&self, key: &TypeKey) -> Result<TypeCategory> {
        let kind = self
            .provider
            .kind_of(key)
            .map_err(|e| GenerateError::metadata(key, e))?;
        Ok(match kind {
            TypeKind::Primitive | TypeKind::GenericParameter => TypeCategory::Simple,
            TypeKind::Collection => TypeCategory::Collection,
            TypeKind::Dictionary => TypeCategory::Dictionary,
            TypeKind::Class | TypeKind::Interface | TypeKind::Enum => TypeCategory::Complex,
        })
    }

    /// All candidate names for a reference. The first member is the
    /// canonical single name; a nullable reference adds `null`.
    pub fn map_union(&self, reference: &TypeRef) -> Result<Vec<String>> {
        let mut union = vec![self.base_name(reference)?];
        if reference.nullable {
            union.push("null".to_string());
        }
        Ok(union)
    }

    /// Map a reference to one name string.
    ///
    /// In type-declaration position the full union is joined with `|`;
    /// elsewhere (e.g. computing a default value) the first union member is
    /// used alone.
    pub fn map_name(&self, reference: &TypeRef, declaration: bool) -> Result<String> {
        let union = self.map_union(reference)?;
        if declaration {
            Ok(union.join(" | "))
        } else {
            Ok(union.into_iter().next().expect("union is never empty"))
        }
    }

    fn base_name(&self, reference: &TypeRef) -> Result<String> {
        let kind = self
            .provider
            .kind_of(&reference.key)
            .map_err(|e| GenerateError::metadata(&reference.key, e))?;

        Ok(match kind {
            TypeKind::Primitive => self
                .primitives
                .get(reference.key.name())
                .cloned()
                .unwrap_or_else(|| "any".to_string()),
            TypeKind::GenericParameter => reference.key.name().to_string(),
            TypeKind::Collection => {
                let element = match reference.args.first() {
                    Some(element) => self.element_name(element)?,
                    None => "any".to_string(),
                };
                format!("{element}[]")
            }
            TypeKind::Dictionary => {
                let key_name = match reference.args.first() {
                    Some(key) => self.map_name(key, false)?,
                    None => "string".to_string(),
                };
                let value_name = match reference.args.get(1) {
                    Some(value) => self.map_name(value, true)?,
                    None => "any".to_string(),
                };
                format!("{{ [key: {key_name}]: {value_name} }}")
            }
            TypeKind::Class | TypeKind::Interface | TypeKind::Enum => {
                let name = self.naming.type_name(reference.key.short_name());
                if reference.args.is_empty() {
                    name
                } else {
                    let args = reference
                        .args
                        .iter()
                        .map(|arg| self.map_name(arg, true))
                        .collect::<Result<Vec<_>>>()?;
                    format!("{name}<{}>", args.join(", "))
                }
            }
        })
    }

    /// Collection element name, parenthesized when the element itself is a
    /// union (`(Order | null)[]`).
    fn element_name(&self, element: &TypeRef) -> Result<String> {
        let union = self.map_union(element)?;
        if union.len() > 1 {
            Ok(format!("({})", union.join(" | ")))
        } else {
            Ok(union.into_iter().next().expect("union is never empty"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use typeport_model::{Model, parse_type_expr};

    use super::*;

    fn mapper() -> TypeNameMapper {
        let model = Model::from_str(
            r#"
            [types.Order]
            kind = "class"

            [types.Status]
            kind = "enum"

            [types.Page]
            kind = "class"
            generics = ["T"]
            "#,
        )
        .unwrap();
        let primitives = model.settings().primitives.clone();
        TypeNameMapper::new(Arc::new(model), primitives)
    }

    fn name(mapper: &TypeNameMapper, expr: &str) -> String {
        mapper
            .map_name(&parse_type_expr(expr).unwrap(), true)
            .unwrap()
    }

    #[test]
    fn test_primitive_names() {
        let m = mapper();
        assert_eq!(name(&m, "string"), "string");
        assert_eq!(name(&m, "int"), "number");
        assert_eq!(name(&m, "bool"), "boolean");
        assert_eq!(name(&m, "DateTime"), "Date");
    }

    #[test]
    fn test_collection_maps_to_array() {
        let m = mapper();
        assert_eq!(name(&m, "List<Order>"), "Order[]");
        assert_eq!(name(&m, "Order[]"), "Order[]");
        assert_eq!(name(&m, "List<List<Order>>"), "Order[][]");
    }

    #[test]
    fn test_dictionary_maps_to_index_signature() {
        let m = mapper();
        assert_eq!(
            name(&m, "Map<string, int>"),
            "{ [key: string]: number }"
        );
        assert_eq!(
            name(&m, "Map<string, Order>"),
            "{ [key: string]: Order }"
        );
    }

    #[test]
    fn test_generic_type_arguments() {
        let m = mapper();
        assert_eq!(name(&m, "Page<Order>"), "Page<Order>");
        assert_eq!(name(&m, "Page<List<Order>>"), "Page<Order[]>");
    }

    #[test]
    fn test_nullable_union() {
        let m = mapper();
        assert_eq!(name(&m, "Order?"), "Order | null");
        assert_eq!(name(&m, "List<Order?>"), "(Order | null)[]");

        // Non-declaration position takes the first union member only.
        let reference = parse_type_expr("Order?").unwrap();
        assert_eq!(m.map_name(&reference, false).unwrap(), "Order");
    }

    #[test]
    fn test_classify() {
        let m = mapper();
        assert_eq!(
            m.classify(&TypeKey::simple("string")).unwrap(),
            TypeCategory::Simple
        );
        assert_eq!(
            m.classify(&TypeKey::new("List", 1)).unwrap(),
            TypeCategory::Collection
        );
        assert_eq!(
            m.classify(&TypeKey::new("Map", 2)).unwrap(),
            TypeCategory::Dictionary
        );
        assert_eq!(
            m.classify(&TypeKey::simple("Order")).unwrap(),
            TypeCategory::Complex
        );
    }

    #[test]
    fn test_unknown_type_fails_with_key() {
        let m = mapper();
        let err = m.classify(&TypeKey::simple("Ghost")).unwrap_err();
        assert!(err.to_string().contains("Ghost"));
    }
}
