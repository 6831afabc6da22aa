use std::sync::Arc;

use indexmap::IndexMap;

use crate::{MemberDescriptor, Result, TypeDescriptor, TypeKey, TypeKind};

/// Read-only source of type metadata for one generation run.
///
/// Implementations must be deterministic for a fixed input graph within a
/// run: repeated queries for the same key answer identically. The resolver
/// and mapper hold a provider instance explicitly; there is no process-wide
/// metadata state.
pub trait MetadataProvider: Send + Sync {
    /// Full structural description of a type.
    ///
    /// Failing to describe a discovered dependency is fatal to a generation
    /// run, so implementations should report unknown keys precisely.
    fn describe(&self, key: &TypeKey) -> Result<Arc<TypeDescriptor>>;

    /// Classification of a type without materializing its full description.
    fn kind_of(&self, key: &TypeKey) -> Result<TypeKind>;

    fn members(&self, key: &TypeKey) -> Result<Vec<MemberDescriptor>> {
        Ok(self.describe(key)?.members.clone())
    }

    fn base_type(&self, key: &TypeKey) -> Result<Option<TypeKey>> {
        Ok(self.describe(key)?.base.clone())
    }

    fn interfaces(&self, key: &TypeKey) -> Result<Vec<TypeKey>> {
        Ok(self.describe(key)?.interfaces.clone())
    }

    /// Type-level annotations keyed by annotation kind.
    fn annotations(&self, key: &TypeKey) -> Result<IndexMap<String, serde_json::Value>> {
        let _ = key;
        Ok(IndexMap::new())
    }

    fn annotation(&self, key: &TypeKey, kind: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.annotations(key)?.shift_remove(kind))
    }
}
