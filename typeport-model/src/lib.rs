//! Type descriptors and model parsing for the typeport TypeScript generator.
//!
//! This crate defines the data model the generator consumes: type keys,
//! type references, descriptors, export specs, and the [`MetadataProvider`]
//! trait that answers structural questions about types. The TOML-backed
//! [`Model`] is the bundled provider implementation; any other source
//! (reflection dump, JSON schema, a hand-built registry) can implement the
//! trait instead.

mod descriptor;
mod error;
mod key;
mod member;
mod model;
mod provider;
mod spec;
mod types;

pub use descriptor::{EnumVariant, TypeDescriptor};
pub use error::{Error, Result};
pub use key::TypeKey;
pub use member::{MemberDescriptor, MethodDescriptor, Param};
pub use model::{Model, ModelSettings};
pub use provider::MetadataProvider;
pub use spec::{ExportRequest, ExportShape, Registration, SpecRegistry, TypeSpec};
pub use types::{TypeKind, TypeRef, parse_type_expr};
