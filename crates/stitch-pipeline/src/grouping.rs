//! Grouping engine: partitioning filtered views into buckets and groups.
//!
//! Three disjoint factor sets steer a run. *Application* factors split the
//! dataset into independent buckets (a pair never spans two buckets).
//! *Grouping* factors are collapsed: views differing only there become one
//! group. *Comparison* factors are where groups are allowed to differ and
//! still be paired; the pair enumerator consumes them.
//!
//! A group's signature keeps one value per non-collapsed factor, which makes
//! both bucketing and later comparability checks simple map lookups.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stitch_core::{Factor, FactorSet, Signature, ViewCatalog, ViewGroup, ViewId};

/// The three factor axes steering grouping and pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Processed independently; views differing here never meet.
    pub application: FactorSet,
    /// Collapsed into one body before registration.
    pub grouping: FactorSet,
    /// Axes along which bodies are compared.
    pub comparison: FactorSet,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            application: FactorSet::of(&[Factor::Timepoint, Factor::Angle]),
            grouping: FactorSet::of(&[Factor::Channel, Factor::Illumination]),
            comparison: FactorSet::of(&[Factor::Tile]),
        }
    }
}

/// Configuration errors detected before any view is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("factor `{factor}` appears in both the {first} and the {second} set")]
    OverlappingFactorSets {
        factor: Factor,
        first: &'static str,
        second: &'static str,
    },
    #[error("view {0} is not in the catalog")]
    UnknownView(ViewId),
}

impl GroupingConfig {
    /// Reject configurations whose factor sets are not pairwise disjoint.
    pub fn validate(&self) -> Result<(), GroupingError> {
        let sets = [
            ("application", &self.application),
            ("grouping", &self.grouping),
            ("comparison", &self.comparison),
        ];
        for (i, &(first, a)) in sets.iter().enumerate() {
            for &(second, b) in sets.iter().skip(i + 1) {
                if let Some(factor) = a.common_factor(b) {
                    return Err(GroupingError::OverlappingFactorSets {
                        factor,
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }

    /// Factors retained in group signatures: everything not collapsed.
    pub fn signature_factors(&self) -> impl Iterator<Item = Factor> + '_ {
        Factor::ALL
            .into_iter()
            .filter(|f| !self.grouping.contains(*f))
    }
}

/// One application-axis slice and its groups, in signature order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationBucket {
    /// Application-factor values identifying this bucket.
    pub key: Signature,
    pub groups: Vec<ViewGroup>,
}

/// All groups of a run, bucketed along the application axes.
///
/// Buckets are ordered by key and groups within a bucket by signature, so
/// two identical inputs always produce an identical structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedViews {
    pub buckets: Vec<ApplicationBucket>,
}

impl GroupedViews {
    pub fn num_groups(&self) -> usize {
        self.buckets.iter().map(|b| b.groups.len()).sum()
    }

    pub fn num_views(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|b| &b.groups)
            .map(|g| g.len())
            .sum()
    }
}

/// Partition `views` into groups and buckets according to `config`.
///
/// Views sharing every non-collapsed factor value fall into one group; the
/// group's signature is that shared value map. An empty `views` slice yields
/// an empty structure, which downstream stages treat as a no-op.
pub fn group_views(
    catalog: &ViewCatalog,
    views: &[ViewId],
    config: &GroupingConfig,
) -> Result<GroupedViews, GroupingError> {
    config.validate()?;

    let mut by_signature: BTreeMap<Signature, BTreeSet<ViewId>> = BTreeMap::new();
    for &view in views {
        let mut signature = Signature::new();
        for factor in config.signature_factors() {
            match catalog.factor_value(view, factor) {
                Some(value) => {
                    signature.insert(factor, value);
                }
                None => return Err(GroupingError::UnknownView(view)),
            }
        }
        by_signature.entry(signature).or_default().insert(view);
    }

    let mut buckets: BTreeMap<Signature, Vec<ViewGroup>> = BTreeMap::new();
    for (signature, members) in by_signature {
        let key: Signature = signature
            .iter()
            .filter(|(factor, _)| config.application.contains(**factor))
            .map(|(factor, value)| (*factor, *value))
            .collect();
        let group =
            ViewGroup::new(members, signature).expect("grouped view sets are never empty");
        buckets.entry(key).or_default().push(group);
    }

    Ok(GroupedViews {
        buckets: buckets
            .into_iter()
            .map(|(key, groups)| ApplicationBucket { key, groups })
            .collect(),
    })
}
