//! High-level entry crate for the `stitching-rs` toolbox.
//!
//! This crate re-exports the full pairwise-registration stack behind one
//! dependency:
//!
//! ## Session API
//!
//! Use when you want a project container with checkpointing and an audit
//! trail:
//!
//! ```no_run
//! use stitch::session::StitchingSession;
//! use stitch::pipeline::{run_pairwise_shifts, RunConfig};
//! use stitch::align::testing::{ramp_source, ConstantShiftKernel};
//! use stitch::align::{CancellationToken, NullProgress};
//! use stitch::core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
//! use stitch::core::{StitchingProject, Vec3};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = tile_grid_catalog(&TileGridConfig::default())?;
//! let source = ramp_source(&catalog);
//! let kernel = ConstantShiftKernel::new(Vec3::new(0.5, 0.0, 0.0), 1.0);
//!
//! let mut session = StitchingSession::with_project(StitchingProject::new(catalog));
//! let summary = run_pairwise_shifts(
//!     &mut session,
//!     &RunConfig::default(),
//!     &source,
//!     &kernel,
//!     &NullProgress,
//!     &CancellationToken::new(),
//! )?;
//! println!("registered {} pairs", summary.merge.inserted);
//!
//! // Can checkpoint here
//! let json = session.to_json()?;
//! std::fs::write("session.json", json)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - **[`session`]**: Project container with metadata and operation log
//! - **[`pipeline`]**: Grouping, pair enumeration, dispatch, and merge stages
//! - **[`core`]**: View catalogs, bounds, transforms, and the results store
//! - **[`align`]**: Registration methods, kernels, and image sources
//! - **[`prelude`]**: Convenient re-exports for common use cases
//!
//! ## Stability
//!
//! The `stitch` crate is the public compatibility boundary. Lower-level
//! crates are intended for advanced usage and may evolve more quickly.

/// Project container with metadata, checkpointing, and an operation log.
pub mod session {
    pub use stitch_pipeline::session::{
        current_timestamp, LogEntry, SessionMetadata, StitchingSession,
    };
}

/// Pipeline stages and the pairwise-shifts step function.
pub mod pipeline {
    pub use stitch_pipeline::{
        comparable, compute_pairs, enumerate_pairs, group_bounds, group_views, merge_outcomes,
        run_pairwise_shifts, ApplicationBucket, ComparisonBatch, DispatchError, DispatchOptions,
        GroupedViews, GroupingConfig, GroupingError, MergeSummary, PairwiseOutcome, RunConfig,
        RunSummary,
    };
}

/// View catalogs, geometry, and the pairwise results store.
///
/// This module contains the fundamental building blocks used throughout the
/// library.
pub mod core {
    pub use stitch_core::*;
}

/// Registration methods, alignment kernels, and image sources.
pub mod align {
    pub use stitch_align::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use stitch::prelude::*;` to get started quickly.
pub mod prelude {
    // Common types
    pub use crate::core::{
        Aff3, Dimensions, Downsampling, Factor, FactorSet, GroupPair, PairKey, PairwiseResult,
        Pt3, RealBounds, ResultsStore, StitchingProject, Vec3, ViewCatalog, ViewFilter,
        ViewGroup, ViewId,
    };

    // Session API
    pub use crate::session::StitchingSession;

    // Pipeline entry points
    pub use crate::pipeline::{run_pairwise_shifts, GroupingConfig, RunConfig, RunSummary};

    // Kernel seam
    pub use crate::align::{
        AggregationPolicy, AlignmentKernel, CancellationToken, ProgressSink, RegistrationMethod,
        ViewImageSource,
    };
}
