//! The alignment kernel contract.
//!
//! Registration numerics (FFT correlation, gradient-descent warps) are not
//! part of this workspace; they are supplied by the embedding application
//! through [`AlignmentKernel`]. The pipeline prepares one
//! [`PairAlignmentRequest`] per admitted pair and interprets the returned
//! estimate. `Ok(None)` is the failure a strategy reports when it cannot
//! align a pair; it is data, not an error.

use anyhow::Result;
use stitch_core::{Aff3, Downsampling, ImageVolume, RealBounds};

use crate::method::{LucasKanadeParams, PhaseCorrelationParams, RegistrationMethod};
use crate::progress::ProgressSink;

/// Everything a kernel needs to align one pair of aggregated volumes.
///
/// Both volumes are already aggregated per group and sampled at
/// `downsampling`. `prior` places the moving volume in the fixed volume's
/// downsampled coordinate frame under the current registrations; a correct
/// kernel returns a correction *relative to that prior*, in downsampled
/// pixel units.
#[derive(Debug)]
pub struct PairAlignmentRequest<'a> {
    pub fixed: &'a ImageVolume,
    pub moving: &'a ImageVolume,
    pub prior: Aff3,
    /// Full-resolution world bounds of the fixed side.
    pub fixed_bounds: RealBounds,
    /// Full-resolution world bounds of the moving side.
    pub moving_bounds: RealBounds,
    /// World-space overlap region the pair was admitted on.
    pub overlap: RealBounds,
    pub downsampling: Downsampling,
}

/// A successful alignment in downsampled pixel space.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseEstimate {
    /// Correction mapping the moving volume onto the fixed one, on top of
    /// the request's prior.
    pub transform: Aff3,
    /// Strategy-specific score; higher is better.
    pub quality: f64,
}

/// Supplier of the per-strategy registration numerics.
///
/// One entry point per strategy keeps parameter types strongly typed at the
/// seam. Implementations must be thread-safe; the dispatcher may invoke them
/// from a worker pool.
pub trait AlignmentKernel: Sync {
    fn phase_correlation(
        &self,
        request: &PairAlignmentRequest<'_>,
        params: &PhaseCorrelationParams,
    ) -> Result<Option<PairwiseEstimate>>;

    fn lucas_kanade(
        &self,
        request: &PairAlignmentRequest<'_>,
        params: &LucasKanadeParams,
        progress: &dyn ProgressSink,
    ) -> Result<Option<PairwiseEstimate>>;

    /// Route a request to the entry point selected by `method`.
    fn align(
        &self,
        method: &RegistrationMethod,
        request: &PairAlignmentRequest<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<Option<PairwiseEstimate>> {
        match method {
            RegistrationMethod::PhaseCorrelation { params } => {
                self.phase_correlation(request, params)
            }
            RegistrationMethod::LucasKanade { params } => {
                self.lucas_kanade(request, params, progress)
            }
        }
    }
}
