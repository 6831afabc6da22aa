//! Transitive closure of types reachable from the export seeds.
//!
//! The resolver walks member types (recursing through generic arguments),
//! method signatures, base types, and implemented interfaces. Each
//! discovered key is claimed exactly once through an insert-if-absent
//! discipline, which is both the only cross-worker synchronization and what
//! makes the walk terminate on cyclic graphs.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use rayon::prelude::*;
use typeport_model::{
    ExportShape, MetadataProvider, SpecRegistry, TypeDescriptor, TypeKey, TypeKind, TypeRef,
    TypeSpec,
};

use crate::{GenerateError, Result, TypeCategory, TypeNameMapper};

/// One resolved type: its descriptor and the export spec it will be
/// generated under.
#[derive(Debug, Clone)]
pub struct ClosureEntry {
    pub descriptor: Arc<TypeDescriptor>,
    pub spec: TypeSpec,
}

/// The complete set of types a generation run will consider.
///
/// Immutable once resolution completes; render workers read it
/// concurrently. Insertion order is scheduling-dependent and deliberately
/// not exposed — consumers iterate in key order.
#[derive(Debug)]
pub struct ResolvedClosure {
    entries: IndexMap<TypeKey, ClosureEntry>,
}

impl ResolvedClosure {
    pub fn get(&self, key: &TypeKey) -> Option<&ClosureEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by type key.
    pub fn iter_sorted(&self) -> Vec<(&TypeKey, &ClosureEntry)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Sorted key set, for listings and assertions.
    pub fn keys_sorted(&self) -> Vec<&TypeKey> {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        keys
    }

    /// Entries that materialize as output files: complex types only,
    /// filtered on the mapper's classification rather than name checks.
    pub fn materializable(&self, mapper: &TypeNameMapper) -> Result<Vec<(&TypeKey, &ClosureEntry)>> {
        let mut result = Vec::new();
        for (key, entry) in self.iter_sorted() {
            if mapper.classify(key)? == TypeCategory::Complex {
                result.push((key, entry));
            }
        }
        Ok(result)
    }
}

/// Concurrent closure map. `claim` is an atomic insert-if-absent; exactly
/// one worker wins the claim for a key and installs the real entry.
struct ClosureMap {
    slots: Mutex<IndexMap<TypeKey, Option<ClosureEntry>>>,
}

impl ClosureMap {
    fn new() -> Self {
        Self {
            slots: Mutex::new(IndexMap::new()),
        }
    }

    /// Try to claim a key. Returns true if this caller won; the winner must
    /// follow up with [`install`](Self::install).
    fn claim(&self, key: &TypeKey) -> bool {
        let mut slots = self.slots.lock().expect("closure map poisoned");
        if slots.contains_key(key) {
            false
        } else {
            slots.insert(key.clone(), None);
            true
        }
    }

    fn install(&self, key: &TypeKey, entry: ClosureEntry) {
        let mut slots = self.slots.lock().expect("closure map poisoned");
        let slot = slots.get_mut(key).expect("install without claim");
        debug_assert!(slot.is_none(), "entry installed twice for {key}");
        *slot = Some(entry);
    }

    fn into_closure(self) -> ResolvedClosure {
        let slots = self.slots.into_inner().expect("closure map poisoned");
        let entries = slots
            .into_iter()
            .map(|(key, slot)| {
                let entry = slot.expect("claimed key never installed");
                (key, entry)
            })
            .collect();
        ResolvedClosure { entries }
    }
}

/// Computes the resolved closure from a seed registry.
pub struct Resolver {
    provider: Arc<dyn MetadataProvider>,
}

impl Resolver {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the closure of all types reachable from `seeds`.
    ///
    /// The result is independent of seed iteration order and of worker
    /// interleaving; a metadata lookup failure for any discovered
    /// dependency aborts the whole resolution.
    pub fn resolve(&self, seeds: &SpecRegistry) -> Result<ResolvedClosure> {
        if seeds.is_empty() {
            return Err(GenerateError::NoSeeds);
        }

        let map = ClosureMap::new();

        // Install all seeds before expansion so dependency discovery never
        // races a seed's own registration.
        let mut seeded: Vec<ClosureEntry> = Vec::with_capacity(seeds.len());
        for (key, spec) in seeds.iter() {
            let descriptor = self
                .provider
                .describe(key)
                .map_err(|e| GenerateError::metadata(key, e))?;
            let entry = ClosureEntry {
                descriptor,
                spec: spec.clone(),
            };
            if map.claim(key) {
                map.install(key, entry.clone());
                seeded.push(entry);
            }
        }

        // Per-seed expansion is order-independent; workers only communicate
        // through the claim discipline.
        seeded
            .par_iter()
            .try_for_each(|entry| self.expand(entry, &map))?;

        Ok(map.into_closure())
    }

    /// Enumerate `entry`'s direct dependencies and claim-then-recurse into
    /// each one not already present.
    fn expand(&self, entry: &ClosureEntry, map: &ClosureMap) -> Result<()> {
        let descriptor = &entry.descriptor;
        let mut dependencies: Vec<TypeKey> = Vec::new();

        for reference in descriptor.declared_refs() {
            collect_ref_keys(reference, &mut dependencies);
        }
        if let Some(base) = &descriptor.base {
            dependencies.push(base.clone());
        }
        dependencies.extend(descriptor.interfaces.iter().cloned());

        for key in dependencies {
            if !map.claim(&key) {
                continue;
            }
            let descriptor = self
                .provider
                .describe(&key)
                .map_err(|e| GenerateError::metadata(&key, e))?;
            let spec = self.synthesize_spec(descriptor.kind, &entry.spec);
            let dependent = ClosureEntry { descriptor, spec };
            map.install(&key, dependent.clone());
            self.expand(&dependent, map)?;
        }
        Ok(())
    }

    /// Spec for a discovered dependency: shape inferred from the type's own
    /// classification, output directory inherited from the dependent.
    fn synthesize_spec(&self, kind: TypeKind, dependent: &TypeSpec) -> TypeSpec {
        let mut spec = TypeSpec::in_dir(dependent.output.clone());
        spec.shape = ExportShape::infer(kind);
        spec
    }
}

/// A reference's own key plus, recursively, the keys of its generic
/// arguments.
pub(crate) fn collect_ref_keys(reference: &TypeRef, out: &mut Vec<TypeKey>) {
    out.push(reference.key.clone());
    for arg in &reference.args {
        collect_ref_keys(arg, out);
    }
}
