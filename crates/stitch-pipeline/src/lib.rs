//! High-level multiview stitching pipelines.
//!
//! This crate provides the pairwise-shifts workflow: bucket the views of a
//! project, collapse grouped views, enumerate overlapping candidate pairs,
//! dispatch them to a registration kernel, and merge the outcomes into the
//! project's results store.
//!
//! ## Session API
//!
//! The session API uses a mutable state container with step functions.
//!
//! ```
//! use stitch_pipeline::session::StitchingSession;
//! use stitch_pipeline::{run_pairwise_shifts, RunConfig};
//! use stitch_align::testing::{ramp_source, ConstantShiftKernel};
//! use stitch_align::{CancellationToken, NullProgress};
//! use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
//! use stitch_core::{StitchingProject, Vec3};
//! # fn main() -> anyhow::Result<()> {
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
//!
//! assert_eq!(summary.merge.inserted, 1);
//! # Ok(())
//! # }
//! ```

// Core session framework
pub mod session;

// Pipeline stages
pub mod dispatch;
pub mod grouping;
pub mod merge;
pub mod pairs;
pub mod run;

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline Re-exports
// ─────────────────────────────────────────────────────────────────────────────

// Session infrastructure
pub use crate::session::{LogEntry, SessionMetadata, StitchingSession};

// Grouping and pair enumeration
pub use crate::grouping::{
    group_views, ApplicationBucket, GroupedViews, GroupingConfig, GroupingError,
};
pub use crate::pairs::{comparable, enumerate_pairs, group_bounds, ComparisonBatch};

// Dispatch and merge
pub use crate::dispatch::{compute_pairs, DispatchError, DispatchOptions, PairwiseOutcome};
pub use crate::merge::{merge_outcomes, MergeSummary};

// The step function
pub use crate::run::{run_pairwise_shifts, RunConfig, RunSummary};

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports from other crates
// ─────────────────────────────────────────────────────────────────────────────

// Re-export from stitch-core for convenience
pub use stitch_core::{
    Downsampling, Factor, FactorSet, GroupPair, PairKey, PairwiseResult, ResultsStore,
    StitchingProject, ViewCatalog, ViewFilter, ViewGroup, ViewId,
};

// Re-export from stitch-align for convenience
pub use stitch_align::{
    AggregationPolicy, AlignmentKernel, CancellationToken, LogProgress, NullProgress,
    ProgressSink, RegistrationMethod, ViewImageSource,
};
