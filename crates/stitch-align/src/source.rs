//! Image access behind a trait, so the pipeline never touches storage.
//!
//! Production deployments implement [`ViewImageSource`] over their actual
//! image backend (files, blocks, caches) including proper resampling. The
//! in-memory source here serves tests and small in-process datasets; its
//! stride decimation is a stand-in for real downsampling.

use std::collections::HashMap;

use anyhow::{bail, Result};
use stitch_core::{Downsampling, ImageVolume, ViewId};

/// Loader for per-view voxel data at a requested sampling.
pub trait ViewImageSource: Sync {
    /// Load the volume of `view` sampled at `downsampling`.
    ///
    /// The returned dimensions must equal the view's full-resolution
    /// dimensions reduced per axis (rounding up).
    fn load(&self, view: ViewId, downsampling: &Downsampling) -> Result<ImageVolume>;
}

/// A source backed by preloaded full-resolution volumes.
#[derive(Debug, Default)]
pub struct InMemoryImageSource {
    volumes: HashMap<ViewId, ImageVolume>,
}

impl InMemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, view: ViewId, volume: ImageVolume) {
        self.volumes.insert(view, volume);
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.volumes.contains_key(&view)
    }
}

impl ViewImageSource for InMemoryImageSource {
    fn load(&self, view: ViewId, downsampling: &Downsampling) -> Result<ImageVolume> {
        let Some(volume) = self.volumes.get(&view) else {
            bail!("no image data for view {view}");
        };
        if downsampling.is_identity() {
            return Ok(volume.clone());
        }
        Ok(decimate(volume, downsampling))
    }
}

/// Pick every `f`-th voxel per axis. Output size matches
/// [`Downsampling::apply_to`].
fn decimate(volume: &ImageVolume, downsampling: &Downsampling) -> ImageVolume {
    let out_dims = downsampling.apply_to(volume.dims());
    let mut out = ImageVolume::filled(out_dims, 0.0);
    for z in 0..out_dims.z() {
        for y in 0..out_dims.y() {
            for x in 0..out_dims.x() {
                let value = volume.get(
                    x * downsampling.x as u64,
                    y * downsampling.y as u64,
                    z * downsampling.z as u64,
                );
                out.set(x, y, z, value);
            }
        }
    }
    out
}
