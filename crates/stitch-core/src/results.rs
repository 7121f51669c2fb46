//! Pairwise registration results and the store that holds them.
//!
//! The store is keyed by [`PairKey`], so at most one entry per unordered
//! pair can exist. Re-running a pair therefore replaces its previous result
//! instead of accumulating duplicates, and a failed re-run can clear a stale
//! entry without leaving either ordering behind.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bounds::RealBounds;
use crate::group::{GroupPair, PairKey};
use crate::math::Aff3;

/// Outcome of registering one pair of view groups.
///
/// `transform` is the correction mapping the key's second side into
/// alignment with the first, expressed in full-resolution world units.
/// Identity means the current placements already agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseResult {
    pub pair: PairKey,
    pub transform: Aff3,
    pub quality: f64,
    pub overlap: RealBounds,
}

impl PairwiseResult {
    /// Build a result from a computed pair.
    ///
    /// `transform` is the correction mapping `pair.b` onto `pair.a`. When
    /// canonical ordering swaps the two sides, the correction is inverted so
    /// the stored transform always refers to the key's orientation. A
    /// non-invertible correction is reported as an error; callers treat it
    /// as a registration failure for this pair.
    pub fn from_pair(
        pair: &GroupPair,
        transform: Aff3,
        quality: f64,
        overlap: RealBounds,
    ) -> Result<Self> {
        let (key, swapped) = pair.oriented_key();
        let transform = if swapped {
            transform
                .try_inverse()
                .with_context(|| format!("correction for pair {key} is not invertible"))?
        } else {
            transform
        };
        Ok(Self {
            pair: key,
            transform,
            quality,
            overlap,
        })
    }
}

/// All pairwise results of a project, keyed canonically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "StoreData", into = "StoreData")]
pub struct ResultsStore {
    entries: BTreeMap<PairKey, PairwiseResult>,
}

/// Serialized form: a flat result list in key order. Duplicate keys collapse
/// on the way in (last entry wins), preserving the one-entry-per-pair
/// invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    results: Vec<PairwiseResult>,
}

impl From<StoreData> for ResultsStore {
    fn from(data: StoreData) -> Self {
        let mut store = ResultsStore::default();
        for result in data.results {
            store.insert(result);
        }
        store
    }
}

impl From<ResultsStore> for StoreData {
    fn from(store: ResultsStore) -> Self {
        StoreData {
            results: store.entries.into_values().collect(),
        }
    }
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &PairKey) -> Option<&PairwiseResult> {
        self.entries.get(key)
    }

    /// Insert a result, returning the entry it replaced, if any.
    pub fn insert(&mut self, result: PairwiseResult) -> Option<PairwiseResult> {
        self.entries.insert(result.pair.clone(), result)
    }

    /// Remove the entry for an unordered pair, if present.
    pub fn remove(&mut self, key: &PairKey) -> Option<PairwiseResult> {
        self.entries.remove(key)
    }

    /// Results in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = &PairwiseResult> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Signature, ViewGroup};
    use crate::math::{translation, translation_of, Vec3};
    use crate::view::ViewId;
    use std::collections::BTreeSet;

    fn group(setups: &[u32]) -> ViewGroup {
        let set: BTreeSet<ViewId> = setups.iter().map(|&s| ViewId::new(0, s)).collect();
        ViewGroup::new(set, Signature::new()).unwrap()
    }

    fn result_for(pair: &GroupPair, dx: f64) -> PairwiseResult {
        let bounds = RealBounds::new(Vec3::zeros(), Vec3::repeat(1.0));
        PairwiseResult::from_pair(pair, translation(&Vec3::new(dx, 0.0, 0.0)), 0.9, bounds)
            .unwrap()
    }

    #[test]
    fn both_orderings_share_one_slot() {
        let a = group(&[0]);
        let b = group(&[1]);
        let ab = GroupPair::new(a.clone(), b.clone()).unwrap();
        let ba = GroupPair::new(b, a).unwrap();

        let mut store = ResultsStore::new();
        store.insert(result_for(&ab, 1.0));
        store.insert(result_for(&ba, 2.0));
        assert_eq!(store.len(), 1);

        // Either ordering's key removes the single entry.
        assert!(store.remove(&ba.key()).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn swapped_orientation_inverts_the_correction() {
        let a = group(&[0]);
        let b = group(&[1]);
        // Enumerated with the canonically-second group as the fixed side.
        let pair = GroupPair::new(b, a).unwrap();
        let result = result_for(&pair, 3.0);
        assert_eq!(result.pair.first(), &[ViewId::new(0, 0)]);
        assert_eq!(
            translation_of(&result.transform),
            Vec3::new(-3.0, 0.0, 0.0)
        );
    }

    #[test]
    fn unswapped_orientation_is_stored_as_given() {
        let a = group(&[0]);
        let b = group(&[1]);
        let pair = GroupPair::new(a, b).unwrap();
        let result = result_for(&pair, 3.0);
        assert_eq!(translation_of(&result.transform), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn serde_roundtrip_collapses_duplicates() {
        let a = group(&[0]);
        let b = group(&[1]);
        let c = group(&[2]);
        let ab = GroupPair::new(a.clone(), b.clone()).unwrap();
        let ac = GroupPair::new(a, c).unwrap();

        let mut store = ResultsStore::new();
        store.insert(result_for(&ab, 1.0));
        store.insert(result_for(&ac, 2.0));

        let json = serde_json::to_string(&store).unwrap();
        let back: ResultsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);

        // A hand-built duplicate collapses to the later entry.
        let dup = StoreData {
            results: vec![result_for(&ab, 1.0), result_for(&ab, 5.0)],
        };
        let collapsed = ResultsStore::from(dup);
        assert_eq!(collapsed.len(), 1);
        let entry = collapsed.get(&ab.key()).unwrap();
        assert_eq!(translation_of(&entry.transform), Vec3::new(5.0, 0.0, 0.0));
    }
}
