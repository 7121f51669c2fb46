//! View groups and canonical pair identities.
//!
//! A group is the atom of pairwise registration: one or more views that are
//! treated as a single body (e.g. all channels of one tile). Its *signature*
//! records the value of every factor that was not collapsed away, which is
//! what pairing decisions are made on.
//!
//! [`PairKey`] identifies an unordered pair of view sets. Both orderings of
//! the same two groups collapse to the same key, so a results store keyed by
//! it can never hold two entries for one physical pair.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::factor::Factor;
use crate::view::ViewId;

/// Factor values identifying a group: one entry per non-collapsed factor.
pub type Signature = BTreeMap<Factor, u32>;

/// A non-empty set of views registered as a single body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewGroup {
    views: BTreeSet<ViewId>,
    signature: Signature,
}

impl ViewGroup {
    pub fn new(views: BTreeSet<ViewId>, signature: Signature) -> Result<Self> {
        ensure!(!views.is_empty(), "a view group must contain at least one view");
        Ok(Self { views, signature })
    }

    pub fn singleton(view: ViewId, signature: Signature) -> Self {
        Self {
            views: BTreeSet::from([view]),
            signature,
        }
    }

    pub fn views(&self) -> &BTreeSet<ViewId> {
        &self.views
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn value(&self, factor: Factor) -> Option<u32> {
        self.signature.get(&factor).copied()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.views.contains(&view)
    }

    /// Smallest view id; used as the group's placement reference.
    pub fn reference_view(&self) -> ViewId {
        *self
            .views
            .iter()
            .next()
            .expect("view groups are never empty")
    }
}

impl fmt::Display for ViewGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, view) in self.views.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{view}")?;
        }
        write!(f, "]")
    }
}

/// An ordered pair of distinct groups scheduled for registration.
///
/// `a` is the fixed side, `b` the moving side. The canonical, unordered
/// identity of the pair is available through [`GroupPair::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPair {
    pub a: ViewGroup,
    pub b: ViewGroup,
}

impl GroupPair {
    pub fn new(a: ViewGroup, b: ViewGroup) -> Result<Self> {
        ensure!(
            a.views() != b.views(),
            "cannot pair a group with itself: {a}"
        );
        Ok(Self { a, b })
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.a, &self.b)
    }

    /// Canonical key plus whether canonicalization swapped the two sides.
    pub fn oriented_key(&self) -> (PairKey, bool) {
        PairKey::oriented(&self.a, &self.b)
    }
}

impl fmt::Display for GroupPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// Canonical identity of an unordered pair of view sets.
///
/// The two sorted view lists are ordered lexicographically, so
/// `PairKey::new(a, b) == PairKey::new(b, a)` always holds.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PairKey {
    first: Vec<ViewId>,
    second: Vec<ViewId>,
}

impl PairKey {
    pub fn new(a: &ViewGroup, b: &ViewGroup) -> Self {
        Self::oriented(a, b).0
    }

    /// Canonical key plus a flag: `true` when `(a, b)` was swapped to reach
    /// the canonical order.
    pub fn oriented(a: &ViewGroup, b: &ViewGroup) -> (Self, bool) {
        let va: Vec<ViewId> = a.views().iter().copied().collect();
        let vb: Vec<ViewId> = b.views().iter().copied().collect();
        if vb < va {
            (
                Self {
                    first: vb,
                    second: va,
                },
                true,
            )
        } else {
            (
                Self {
                    first: va,
                    second: vb,
                },
                false,
            )
        }
    }

    /// Views of the canonically first side, ascending.
    pub fn first(&self) -> &[ViewId] {
        &self.first
    }

    /// Views of the canonically second side, ascending.
    pub fn second(&self) -> &[ViewId] {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |f: &mut fmt::Formatter<'_>, views: &[ViewId]| -> fmt::Result {
            write!(f, "[")?;
            for (i, view) in views.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{view}")?;
            }
            write!(f, "]")
        };
        list(f, &self.first)?;
        write!(f, " <-> ")?;
        list(f, &self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(views: &[(u32, u32)]) -> ViewGroup {
        let set = views.iter().map(|&(tp, s)| ViewId::new(tp, s)).collect();
        ViewGroup::new(set, Signature::new()).unwrap()
    }

    #[test]
    fn empty_groups_are_rejected() {
        assert!(ViewGroup::new(BTreeSet::new(), Signature::new()).is_err());
    }

    #[test]
    fn reference_view_is_the_smallest() {
        let g = group(&[(0, 3), (0, 1), (1, 0)]);
        assert_eq!(g.reference_view(), ViewId::new(0, 1));
    }

    #[test]
    fn key_is_order_independent() {
        let a = group(&[(0, 0), (0, 1)]);
        let b = group(&[(0, 2), (0, 3)]);
        assert_eq!(PairKey::new(&a, &b), PairKey::new(&b, &a));
    }

    #[test]
    fn oriented_reports_the_swap() {
        let a = group(&[(0, 0)]);
        let b = group(&[(0, 5)]);
        let (key_ab, swapped_ab) = PairKey::oriented(&a, &b);
        let (key_ba, swapped_ba) = PairKey::oriented(&b, &a);
        assert_eq!(key_ab, key_ba);
        assert!(!swapped_ab);
        assert!(swapped_ba);
        assert_eq!(key_ab.first(), &[ViewId::new(0, 0)]);
        assert_eq!(key_ab.second(), &[ViewId::new(0, 5)]);
    }

    #[test]
    fn self_pairs_are_rejected() {
        let a = group(&[(0, 0), (0, 1)]);
        assert!(GroupPair::new(a.clone(), a).is_err());
    }

    #[test]
    fn keys_order_deterministically() {
        let a = group(&[(0, 0)]);
        let b = group(&[(0, 1)]);
        let c = group(&[(0, 2)]);
        let mut keys = vec![PairKey::new(&b, &c), PairKey::new(&a, &c), PairKey::new(&a, &b)];
        keys.sort();
        assert_eq!(keys[0], PairKey::new(&a, &b));
        assert_eq!(keys[1], PairKey::new(&a, &c));
        assert_eq!(keys[2], PairKey::new(&b, &c));
    }

    #[test]
    fn signature_values_are_exposed() {
        let mut sig = Signature::new();
        sig.insert(Factor::Tile, 4);
        sig.insert(Factor::Timepoint, 1);
        let g = ViewGroup::singleton(ViewId::new(1, 0), sig);
        assert_eq!(g.value(Factor::Tile), Some(4));
        assert_eq!(g.value(Factor::Channel), None);
    }
}
