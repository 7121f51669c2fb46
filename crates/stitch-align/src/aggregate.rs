//! Collapsing a group's member volumes into a single volume.
//!
//! Groups bundle views that are registered as one body (e.g. all channels of
//! a tile), but the kernel aligns exactly two volumes. The aggregation
//! policy decides how a group's members become that one volume.

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};
use stitch_core::{Factor, ImageVolume, ViewCatalog, ViewGroup, ViewId};

/// How a group's member volumes are combined before registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Mean intensity across members, voxel by voxel.
    #[default]
    Average,
    /// Use the member with the given factor value, e.g. one fixed channel.
    PickSpecific { factor: Factor, value: u32 },
    /// Use the member with the highest mean intensity.
    PickBrightest,
}

/// Combine loaded member volumes according to `policy`.
///
/// `volumes` holds one entry per group member, all sampled identically.
/// Members must share dimensions; mixed-size groups are a configuration
/// error.
pub fn aggregate_group(
    catalog: &ViewCatalog,
    group: &ViewGroup,
    volumes: Vec<(ViewId, ImageVolume)>,
    policy: &AggregationPolicy,
) -> Result<ImageVolume> {
    ensure!(
        !volumes.is_empty(),
        "cannot aggregate an empty volume list for group {group}"
    );
    let dims = volumes[0].1.dims();
    for (view, volume) in &volumes {
        ensure!(
            volume.dims() == dims,
            "aggregation requires identical dimensions, got {} for {view} vs {}",
            volume.dims(),
            dims
        );
    }

    match policy {
        AggregationPolicy::Average => Ok(average(volumes)),
        AggregationPolicy::PickSpecific { factor, value } => {
            for (view, volume) in volumes {
                if catalog.factor_value(view, *factor) == Some(*value) {
                    return Ok(volume);
                }
            }
            bail!("no view in group {group} has {factor} = {value}");
        }
        AggregationPolicy::PickBrightest => Ok(pick_brightest(volumes)),
    }
}

fn average(mut volumes: Vec<(ViewId, ImageVolume)>) -> ImageVolume {
    if volumes.len() == 1 {
        return volumes.remove(0).1;
    }
    let count = volumes.len() as f64;
    let (_, mut acc) = volumes.remove(0);
    let mut sums: Vec<f64> = acc.data().iter().map(|&v| v as f64).collect();
    for (_, volume) in &volumes {
        for (sum, &v) in sums.iter_mut().zip(volume.data()) {
            *sum += v as f64;
        }
    }
    let dims = acc.dims();
    for z in 0..dims.z() {
        for y in 0..dims.y() {
            for x in 0..dims.x() {
                let idx = (x + dims.x() * (y + dims.y() * z)) as usize;
                acc.set(x, y, z, (sums[idx] / count) as f32);
            }
        }
    }
    acc
}

fn pick_brightest(volumes: Vec<(ViewId, ImageVolume)>) -> ImageVolume {
    let mut best: Option<(f64, ImageVolume)> = None;
    for (_, volume) in volumes {
        let mean = volume.mean();
        let replace = match &best {
            Some((best_mean, _)) => mean > *best_mean,
            None => true,
        };
        if replace {
            best = Some((mean, volume));
        }
    }
    best.expect("volume list is non-empty").1
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
    use stitch_core::{Dimensions, Signature};
    use std::collections::BTreeSet;

    fn two_channel_fixture() -> (ViewCatalog, ViewGroup) {
        let catalog = tile_grid_catalog(&TileGridConfig {
            channels: 2,
            tiles_x: 1,
            size: Dimensions::new(2, 2, 1),
            ..TileGridConfig::default()
        })
        .unwrap();
        let views: BTreeSet<ViewId> = catalog.all_views().into_iter().collect();
        let group = ViewGroup::new(views, Signature::new()).unwrap();
        (catalog, group)
    }

    fn loaded(catalog: &ViewCatalog, values: &[f32]) -> Vec<(ViewId, ImageVolume)> {
        catalog
            .all_views()
            .into_iter()
            .zip(values)
            .map(|(view, &v)| {
                let dims = catalog.dimensions(view).unwrap();
                (view, ImageVolume::filled(dims, v))
            })
            .collect()
    }

    #[test]
    fn average_is_the_voxelwise_mean() {
        let (catalog, group) = two_channel_fixture();
        let volumes = loaded(&catalog, &[1.0, 3.0]);
        let out = aggregate_group(&catalog, &group, volumes, &AggregationPolicy::Average).unwrap();
        assert!(out.data().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn pick_specific_selects_by_factor_value() {
        let (catalog, group) = two_channel_fixture();
        let volumes = loaded(&catalog, &[1.0, 3.0]);
        let policy = AggregationPolicy::PickSpecific {
            factor: Factor::Channel,
            value: 1,
        };
        let out = aggregate_group(&catalog, &group, volumes, &policy).unwrap();
        assert!(out.data().iter().all(|&v| v == 3.0));

        let missing = AggregationPolicy::PickSpecific {
            factor: Factor::Channel,
            value: 7,
        };
        let volumes = loaded(&catalog, &[1.0, 3.0]);
        assert!(aggregate_group(&catalog, &group, volumes, &missing).is_err());
    }

    #[test]
    fn pick_brightest_selects_the_highest_mean() {
        let (catalog, group) = two_channel_fixture();
        let volumes = loaded(&catalog, &[5.0, 3.0]);
        let out =
            aggregate_group(&catalog, &group, volumes, &AggregationPolicy::PickBrightest).unwrap();
        assert!(out.data().iter().all(|&v| v == 5.0));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let (catalog, group) = two_channel_fixture();
        let views = catalog.all_views();
        let volumes = vec![
            (views[0], ImageVolume::filled(Dimensions::new(2, 2, 1), 1.0)),
            (views[1], ImageVolume::filled(Dimensions::new(3, 2, 1), 1.0)),
        ];
        assert!(aggregate_group(&catalog, &group, volumes, &AggregationPolicy::Average).is_err());
    }
}
