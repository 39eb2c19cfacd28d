//! A memo of results keyed by alternative identity.

use std::collections::HashMap;

use crate::decision::{identity::Identity, DecisionAlternative};

/// Caches a value, such as the result of exploring the sub-tree below an
/// alternative, for every alternative identity.
///
/// Alternatives with equal identities share an entry no matter where they
/// were enumerated.
#[derive(Clone, Debug)]
pub struct AlternativeCache<V> {
    entries: HashMap<Identity, V>,
    hits:    usize,
}

impl<V> AlternativeCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits:    0,
        }
    }

    /// Gets the value cached for `alternative`.
    #[must_use]
    pub fn get(&self, alternative: &DecisionAlternative) -> Option<&V> {
        self.entries.get(&alternative.identity())
    }

    /// Checks if a value is cached for `alternative`.
    #[must_use]
    pub fn contains(&self, alternative: &DecisionAlternative) -> bool {
        self.entries.contains_key(&alternative.identity())
    }

    /// Caches `value` for `alternative`, returning the value it replaces.
    pub fn insert(&mut self, alternative: &DecisionAlternative, value: V) -> Option<V> {
        self.entries.insert(alternative.identity(), value)
    }

    /// Gets the value cached for `alternative`, computing and caching it with
    /// `compute` if there is none.
    pub fn get_or_insert_with(
        &mut self,
        alternative: &DecisionAlternative,
        compute: impl FnOnce() -> V,
    ) -> &V {
        let identity = alternative.identity();
        if self.entries.contains_key(&identity) {
            self.hits += 1;
        } else {
            log::trace!("Caching the result for alternative {}", identity.short());
        }
        self.entries.entry(identity).or_insert_with(compute)
    }

    /// Gets the number of lookups through [`Self::get_or_insert_with`] that
    /// were answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for AlternativeCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        decision::{cache::AlternativeCache, AlternativeKind, DecisionAlternative, Family, Referent},
        solver::{Clause, Guard},
        value::Origin,
    };

    fn null_alternative() -> DecisionAlternative {
        DecisionAlternative::new(
            Family::FieldLoad,
            AlternativeKind::Resolved(Referent::Null),
            Guard::of(Clause::Null {
                reference: Origin::root("r"),
            }),
            None,
        )
    }

    #[test]
    fn independently_built_alternatives_share_entries() {
        let mut cache = AlternativeCache::new();
        let computed = *cache.get_or_insert_with(&null_alternative(), || 7);
        let reused = *cache.get_or_insert_with(&null_alternative(), || 11);

        assert_eq!(computed, 7);
        assert_eq!(reused, 7);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }
}
