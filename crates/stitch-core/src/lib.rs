//! Core data model for `stitching-rs`.
//!
//! This crate provides the foundational building blocks used by all other
//! crates in the workspace:
//!
//! - linear algebra type aliases (`Real`, `Vec3`, `Aff3`, and friends),
//! - acquisition factors and view/catalog containers,
//! - view groups and canonical unordered pair keys,
//! - the pairwise results store and the persisted project,
//! - deterministic synthetic tile grids for tests and examples.
//!
//! Conceptually, a project is `catalog (views + placements) + results
//! (pairwise corrections)`. Everything here is plain data: image loading,
//! registration strategies and pipeline orchestration live in the
//! `stitch-align` and `stitch-pipeline` crates.
//!
//! # Example
//!
//! ```
//! use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
//! use stitch_core::{Factor, StitchingProject, ViewFilter};
//!
//! let catalog = tile_grid_catalog(&TileGridConfig {
//!     tiles_x: 2,
//!     tiles_y: 2,
//!     channels: 2,
//!     ..TileGridConfig::default()
//! })
//! .unwrap();
//! let project = StitchingProject::new(catalog);
//!
//! let channel0 = ViewFilter::all().restrict(Factor::Channel, &[0]);
//! assert_eq!(project.catalog().views(&channel0).len(), 4);
//! ```

/// Axis-aligned bounding volumes.
mod bounds;
/// Integer downsampling factors and conjugation helpers.
mod downsample;
/// Acquisition factors and factor sets.
mod factor;
/// View groups and canonical pair keys.
mod group;
/// Linear algebra type aliases and affine helpers.
mod math;
/// The persisted project container.
mod project;
/// Pairwise results and their store.
mod results;
/// Views, setups and the catalog.
mod view;
/// Voxel dimensions and image volumes.
mod volume;

/// Deterministic synthetic data generation helpers.
///
/// Used in workspace tests and examples; kept public so downstream crates
/// can build quick datasets without their own fixtures.
pub mod synthetic;

pub use bounds::*;
pub use downsample::*;
pub use factor::*;
pub use group::*;
pub use math::*;
pub use project::*;
pub use results::*;
pub use view::*;
pub use volume::*;
