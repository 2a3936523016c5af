//! Deferred cycle fix-ups.
//!
//! A reference met again while it is still being resolved gets a fresh,
//! empty placeholder slot. Each placeholder is recorded here with the
//! canonical name it stands for and patched once the whole run is done.
//!
//! Inheritance is deferred the same way: a slot that copied properties from a
//! base (or an aliased reference) records a merge, re-applied at drain time
//! when every base slot is complete.

use indexmap::IndexMap;

use crate::ir::{RefId, ReferenceStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixup {
    pub canonical_name: String,
    pub placeholder: RefId,
}

/// Slot `into` inherits the properties of the slot cached as `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub source: String,
    pub into: RefId,
}

#[derive(Debug, Default)]
pub struct DeferredFixups {
    pending: Vec<Fixup>,
    merges: Vec<Merge>,
}

impl DeferredFixups {
    pub fn register(&mut self, canonical_name: impl Into<String>, placeholder: RefId) {
        self.pending.push(Fixup { canonical_name: canonical_name.into(), placeholder });
    }

    pub fn register_merge(&mut self, source: impl Into<String>, into: RefId) {
        self.merges.push(Merge { source: source.into(), into });
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.merges.is_empty()
    }

    /// Re-apply every merge until no slot changes, then patch placeholders in
    /// registration order. Returns the canonical names that had no cache
    /// entry; their placeholders stay empty.
    pub fn drain(&mut self, cache: &IndexMap<String, RefId>, store: &mut ReferenceStore) -> Vec<String> {
        let mut unresolved = Vec::new();

        // merging only adds properties or descriptions, so this terminates
        let mut changed = true;
        while changed {
            changed = false;
            for merge in &self.merges {
                if let Some(&source) = cache.get(&merge.source) {
                    changed |= store.merge_slot(source, merge.into);
                }
            }
        }
        for merge in self.merges.drain(..) {
            if !cache.contains_key(&merge.source) && !unresolved.contains(&merge.source) {
                tracing::warn!(name = %merge.source, "base left unresolved");
                unresolved.push(merge.source);
            }
        }

        for fixup in self.pending.drain(..) {
            match cache.get(&fixup.canonical_name) {
                Some(&resolved) => store.copy_slot(resolved, fixup.placeholder),
                None => {
                    tracing::warn!(name = %fixup.canonical_name, "placeholder left unresolved");
                    if !unresolved.contains(&fixup.canonical_name) {
                        unresolved.push(fixup.canonical_name);
                    }
                }
            }
        }
        unresolved
    }
}
