//! Pair enumeration: comparability plus bounding-volume screening.
//!
//! Two groups of one bucket form a candidate pair when they agree on every
//! retained factor outside the comparison set and differ on at least one
//! comparison factor. Candidates whose placed bounding volumes do not even
//! touch are dropped here, before any pixel is loaded.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use stitch_core::{Downsampling, FactorSet, GroupPair, RealBounds, ViewCatalog, ViewGroup};

use crate::grouping::{GroupedViews, GroupingConfig};

/// The admitted pairs of one run, plus the sampling they will be computed at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonBatch {
    pub pairs: Vec<GroupPair>,
    pub downsampling: Downsampling,
}

impl ComparisonBatch {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Comparability of two groups from one bucket.
///
/// Signatures of one bucket share their factor key set, so a one-sided walk
/// over `a`'s signature covers both.
pub fn comparable(a: &ViewGroup, b: &ViewGroup, comparison: &FactorSet) -> bool {
    let mut differs = false;
    for (&factor, &value) in a.signature() {
        let matches = b.value(factor) == Some(value);
        if comparison.contains(factor) {
            differs |= !matches;
        } else if !matches {
            return false;
        }
    }
    differs
}

/// Placed bounding volume of a group: the union of its members' transformed
/// voxel boxes.
pub fn group_bounds(catalog: &ViewCatalog, group: &ViewGroup) -> Result<RealBounds> {
    let mut bounds: Option<RealBounds> = None;
    for &view in group.views() {
        let (Some(dims), Some(reg)) = (catalog.dimensions(view), catalog.registration(view))
        else {
            bail!("view {view} of group {group} is not in the catalog");
        };
        let vb = RealBounds::from_dimensions(dims, reg);
        bounds = Some(match bounds {
            Some(b) => b.union(&vb),
            None => vb,
        });
    }
    match bounds {
        Some(b) => Ok(b),
        None => bail!("group {group} has no views"),
    }
}

/// Enumerate all admitted pairs of `grouped`, bucket by bucket.
///
/// Within a bucket, pairs appear in group order (`i < j`), so the batch is
/// deterministic for identical inputs.
pub fn enumerate_pairs(
    catalog: &ViewCatalog,
    grouped: &GroupedViews,
    config: &GroupingConfig,
    downsampling: Downsampling,
) -> Result<ComparisonBatch> {
    let mut pairs = Vec::new();
    for bucket in &grouped.buckets {
        let bounds: Vec<RealBounds> = bucket
            .groups
            .iter()
            .map(|g| group_bounds(catalog, g))
            .collect::<Result<_>>()?;
        for i in 0..bucket.groups.len() {
            for j in (i + 1)..bucket.groups.len() {
                let (a, b) = (&bucket.groups[i], &bucket.groups[j]);
                if !comparable(a, b, &config.comparison) {
                    continue;
                }
                if !bounds[i].intersects(&bounds[j]) {
                    log::debug!("pair {a} <-> {b} dropped: no bounding-volume overlap");
                    continue;
                }
                pairs.push(GroupPair::new(a.clone(), b.clone())?);
            }
        }
    }
    log::debug!("enumerated {} candidate pairs", pairs.len());
    Ok(ComparisonBatch { pairs, downsampling })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_views;
    use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
    use stitch_core::{Factor, Signature, ViewId};

    fn enumerate(catalog: &ViewCatalog, config: &GroupingConfig) -> ComparisonBatch {
        let views = catalog.all_views();
        let grouped = group_views(catalog, &views, config).unwrap();
        enumerate_pairs(catalog, &grouped, config, Downsampling::identity()).unwrap()
    }

    #[test]
    fn comparability_requires_a_comparison_difference() {
        let mut sig_a = Signature::new();
        sig_a.insert(Factor::Timepoint, 0);
        sig_a.insert(Factor::Tile, 0);
        let mut sig_b = sig_a.clone();
        sig_b.insert(Factor::Tile, 1);

        let a = ViewGroup::singleton(ViewId::new(0, 0), sig_a.clone());
        let b = ViewGroup::singleton(ViewId::new(0, 1), sig_b);
        let same = ViewGroup::singleton(ViewId::new(0, 2), sig_a);

        let comparison = FactorSet::of(&[Factor::Tile]);
        assert!(comparable(&a, &b, &comparison));
        // Identical on the comparison axis: not a pair.
        assert!(!comparable(&a, &same, &comparison));
    }

    #[test]
    fn comparability_requires_agreement_elsewhere() {
        let mut sig_a = Signature::new();
        sig_a.insert(Factor::Timepoint, 0);
        sig_a.insert(Factor::Tile, 0);
        let mut sig_b = Signature::new();
        sig_b.insert(Factor::Timepoint, 1);
        sig_b.insert(Factor::Tile, 1);

        let a = ViewGroup::singleton(ViewId::new(0, 0), sig_a);
        let b = ViewGroup::singleton(ViewId::new(1, 1), sig_b);
        assert!(!comparable(&a, &b, &FactorSet::of(&[Factor::Tile])));
    }

    #[test]
    fn adjacent_tiles_pair_up_and_distant_ones_do_not() {
        // Three tiles in a line with 20% overlap: 1-2 and 2-3 touch, 1-3 has
        // a gap.
        let catalog = tile_grid_catalog(&TileGridConfig {
            tiles_x: 3,
            overlap: 0.2,
            ..TileGridConfig::default()
        })
        .unwrap();
        let batch = enumerate(&catalog, &GroupingConfig::default());
        assert_eq!(batch.len(), 2);
        let tiles: Vec<(Option<u32>, Option<u32>)> = batch
            .pairs
            .iter()
            .map(|p| (p.a.value(Factor::Tile), p.b.value(Factor::Tile)))
            .collect();
        assert_eq!(tiles, vec![(Some(0), Some(1)), (Some(1), Some(2))]);
    }

    #[test]
    fn buckets_never_mix() {
        let catalog = tile_grid_catalog(&TileGridConfig {
            tiles_x: 2,
            timepoints: 2,
            ..TileGridConfig::default()
        })
        .unwrap();
        let batch = enumerate(&catalog, &GroupingConfig::default());
        assert_eq!(batch.len(), 2);
        for pair in &batch.pairs {
            assert_eq!(pair.a.value(Factor::Timepoint), pair.b.value(Factor::Timepoint));
        }
    }

    #[test]
    fn grouped_channels_pair_once_per_tile_pair() {
        let catalog = tile_grid_catalog(&TileGridConfig {
            tiles_x: 2,
            channels: 2,
            ..TileGridConfig::default()
        })
        .unwrap();
        let batch = enumerate(&catalog, &GroupingConfig::default());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.pairs[0].a.len(), 2);
        assert_eq!(batch.pairs[0].b.len(), 2);
    }

    #[test]
    fn empty_grouping_yields_an_empty_batch() {
        let catalog = tile_grid_catalog(&TileGridConfig::default()).unwrap();
        let grouped = GroupedViews::default();
        let batch = enumerate_pairs(
            &catalog,
            &grouped,
            &GroupingConfig::default(),
            Downsampling::identity(),
        )
        .unwrap();
        assert!(batch.is_empty());
    }
}
