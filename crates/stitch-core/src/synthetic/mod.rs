//! Deterministic synthetic data generation helpers.
//!
//! Small building blocks for constructing synthetic stitching datasets used
//! in tests and examples: regular tile grids with a configurable overlap
//! fraction, and simple deterministic voxel volumes. No randomness is
//! involved; identical configs always produce identical catalogs.

pub mod tiles;
