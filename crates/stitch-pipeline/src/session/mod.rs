//! Stitching session framework.
//!
//! The session API uses a mutable state container with step functions.
//! Sessions store the project under registration and an operation log; step
//! functions such as [`run_pairwise_shifts`](crate::run_pairwise_shifts)
//! mutate the session in-place and record an audit trail entry.
//!
//! ```
//! use stitch_pipeline::session::StitchingSession;
//! use stitch_core::synthetic::tiles::{tile_grid_catalog, TileGridConfig};
//! use stitch_core::StitchingProject;
//! # fn main() -> anyhow::Result<()> {
//! let catalog = tile_grid_catalog(&TileGridConfig::default())?;
//! let mut session = StitchingSession::with_project(StitchingProject::new(catalog));
//! session.log_success("set_project");
//!
//! let json = session.to_json()?;
//! let restored = StitchingSession::from_json(&json)?;
//! assert!(restored.has_project());
//! # Ok(())
//! # }
//! ```

pub mod stitchsession;
pub mod types;

pub use stitchsession::StitchingSession;
pub use types::{current_timestamp, LogEntry, SessionMetadata};
