//! Synthetic regular tile grids.
//!
//! Tiles are laid out row-major on a plane, each shifted so that neighbours
//! share `overlap` of their extent. Channels, illuminations and angles
//! multiply the setups without changing tile placement, and every timepoint
//! repeats the full setup list.

use anyhow::{ensure, Result};

use crate::math::{translation, Real, Vec3};
use crate::view::{ViewCatalog, ViewId, ViewRegistration, ViewSetup};
use crate::volume::{Dimensions, ImageVolume};

/// Shape of a synthetic tile-grid acquisition.
#[derive(Debug, Clone, Copy)]
pub struct TileGridConfig {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub timepoints: u32,
    pub channels: u32,
    pub illuminations: u32,
    pub angles: u32,
    pub size: Dimensions,
    /// Fraction of the tile extent shared with each direct neighbour,
    /// in `[0, 1)`.
    pub overlap: Real,
}

impl Default for TileGridConfig {
    fn default() -> Self {
        Self {
            tiles_x: 2,
            tiles_y: 1,
            timepoints: 1,
            channels: 1,
            illuminations: 1,
            angles: 1,
            size: Dimensions::new(32, 32, 8),
            overlap: 0.25,
        }
    }
}

impl TileGridConfig {
    pub fn num_tiles(&self) -> u32 {
        self.tiles_x * self.tiles_y
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.tiles_x >= 1
                && self.tiles_y >= 1
                && self.timepoints >= 1
                && self.channels >= 1
                && self.illuminations >= 1
                && self.angles >= 1,
            "all grid counts must be at least 1"
        );
        ensure!(
            (0.0..1.0).contains(&self.overlap),
            "overlap fraction must be in [0, 1), got {}",
            self.overlap
        );
        Ok(())
    }
}

/// World translation of a tile's origin within the grid.
pub fn tile_translation(config: &TileGridConfig, tile: u32) -> Vec3 {
    let tx = (tile % config.tiles_x) as Real;
    let ty = (tile / config.tiles_x) as Real;
    let step_x = config.size.x() as Real * (1.0 - config.overlap);
    let step_y = config.size.y() as Real * (1.0 - config.overlap);
    Vec3::new(tx * step_x, ty * step_y, 0.0)
}

/// Build a fully-populated catalog for the given grid shape.
///
/// Setup ids are assigned in `(angle, tile, channel, illumination)` order;
/// placements are pure translations derived from [`tile_translation`].
pub fn tile_grid_catalog(config: &TileGridConfig) -> Result<ViewCatalog> {
    config.validate()?;

    let mut setups = Vec::new();
    let mut id = 0u32;
    for angle in 0..config.angles {
        for tile in 0..config.num_tiles() {
            for channel in 0..config.channels {
                for illumination in 0..config.illuminations {
                    setups.push(ViewSetup {
                        id,
                        angle,
                        channel,
                        illumination,
                        tile,
                        size: config.size,
                    });
                    id += 1;
                }
            }
        }
    }

    let mut registrations = Vec::new();
    for tp in 0..config.timepoints {
        for setup in &setups {
            registrations.push(ViewRegistration {
                view: ViewId::new(tp, setup.id),
                transform: translation(&tile_translation(config, setup.tile)),
            });
        }
    }

    Ok(ViewCatalog::with_registrations(setups, registrations)?)
}

/// A deterministic intensity ramp: `value = x + y + z`.
pub fn ramp_volume(dims: Dimensions) -> ImageVolume {
    let mut vol = ImageVolume::filled(dims, 0.0);
    for z in 0..dims.z() {
        for y in 0..dims.y() {
            for x in 0..dims.x() {
                vol.set(x, y, z, (x + y + z) as f32);
            }
        }
    }
    vol
}
