use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::TypeRef;

/// A declared member (property/field) of a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member name as declared in the host language.
    pub name: String,
    /// Declared type of the member.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub is_optional: bool,
    /// Literal to emit as the member's initial value, if any.
    #[serde(default)]
    pub default: Option<String>,
    /// Source annotations keyed by annotation kind.
    #[serde(default)]
    pub annotations: IndexMap<String, serde_json::Value>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_readonly: false,
            is_optional: false,
            default: None,
            annotations: IndexMap::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn annotation(&self, kind: &str) -> Option<&serde_json::Value> {
        self.annotations.get(kind)
    }
}

/// A method parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A declared method of a service type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// Return type; `None` renders as `void`.
    #[serde(default)]
    pub returns: Option<TypeRef>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }

    /// All type refs this method mentions (params plus return).
    pub fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.params
            .iter()
            .map(|p| &p.ty)
            .chain(self.returns.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeKey;

    #[test]
    fn test_member_builders() {
        let member = MemberDescriptor::new("items", TypeRef::named("OrderLine"))
            .optional()
            .readonly()
            .with_default("[]");

        assert!(member.is_optional);
        assert!(member.is_readonly);
        assert!(!member.is_static);
        assert_eq!(member.default.as_deref(), Some("[]"));
    }

    #[test]
    fn test_method_type_refs_cover_params_and_return() {
        let method = MethodDescriptor::new("getOrder")
            .param("id", TypeRef::named("string"))
            .returning(TypeRef::named("Order"));

        let keys: Vec<&TypeKey> = method.type_refs().map(|r| &r.key).collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1], &TypeKey::simple("Order"));
    }
}
