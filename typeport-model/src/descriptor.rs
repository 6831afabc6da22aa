use serde::{Deserialize, Serialize};

use crate::{MemberDescriptor, MethodDescriptor, TypeKey, TypeKind, TypeRef};

/// An enum variant with an optional explicit value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    /// Explicit value literal (number or quoted string); sequential numbers
    /// are assigned when absent.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Full structural description of one type.
///
/// Descriptors are built once (from a seed or during closure expansion) and
/// never mutated after insertion into the resolved closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub kind: TypeKind,
    /// Declared members, in declaration order.
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Base type, if any. Held as a key and resolved lazily through the
    /// metadata provider.
    #[serde(default)]
    pub base: Option<TypeKey>,
    /// Implemented interfaces.
    #[serde(default)]
    pub interfaces: Vec<TypeKey>,
    /// Generic parameter names, in declaration order.
    #[serde(default)]
    pub generics: Vec<String>,
    /// Enum variants; only meaningful for `TypeKind::Enum`.
    #[serde(default)]
    pub variants: Vec<EnumVariant>,
    /// Service methods; only meaningful for service (class) types.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    pub fn new(key: TypeKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            members: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            generics: Vec::new(),
            variants: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_base(mut self, base: TypeKey) -> Self {
        self.base = Some(base);
        self
    }

    pub fn implements(mut self, interface: TypeKey) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Direct type references declared by this type: member types, method
    /// param/return types. Base and interface keys are not included; they
    /// are plain keys, not refs.
    pub fn declared_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.members
            .iter()
            .map(|m| &m.ty)
            .chain(self.methods.iter().flat_map(|m| m.type_refs()))
    }

    /// Whether this descriptor declares a generic parameter with `name`.
    pub fn has_generic(&self, name: &str) -> bool {
        self.generics.iter().any(|g| g == name)
    }
}
