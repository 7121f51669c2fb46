//! Deterministic kernels and sources for cross-crate testing.
//!
//! This module is public so integration tests across the workspace can use
//! it, but it is not intended for production use.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use stitch_core::synthetic::tiles::ramp_volume;
use stitch_core::{translation, Aff3, Dimensions, Downsampling, RealBounds, Vec3, ViewCatalog};

use crate::kernel::{AlignmentKernel, PairAlignmentRequest, PairwiseEstimate};
use crate::method::{LucasKanadeParams, PhaseCorrelationParams};
use crate::progress::ProgressSink;
use crate::source::InMemoryImageSource;

/// Kernel answering every request with the same translation.
#[derive(Debug, Clone)]
pub struct ConstantShiftKernel {
    pub shift: Vec3,
    pub quality: f64,
}

impl ConstantShiftKernel {
    pub fn new(shift: Vec3, quality: f64) -> Self {
        Self { shift, quality }
    }

    fn respond(&self) -> Result<Option<PairwiseEstimate>> {
        Ok(Some(PairwiseEstimate {
            transform: translation(&self.shift),
            quality: self.quality,
        }))
    }
}

impl AlignmentKernel for ConstantShiftKernel {
    fn phase_correlation(
        &self,
        _request: &PairAlignmentRequest<'_>,
        _params: &PhaseCorrelationParams,
    ) -> Result<Option<PairwiseEstimate>> {
        self.respond()
    }

    fn lucas_kanade(
        &self,
        _request: &PairAlignmentRequest<'_>,
        _params: &LucasKanadeParams,
        _progress: &dyn ProgressSink,
    ) -> Result<Option<PairwiseEstimate>> {
        self.respond()
    }
}

/// Kernel that fails to align every pair (`Ok(None)`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullKernel;

impl AlignmentKernel for NullKernel {
    fn phase_correlation(
        &self,
        _request: &PairAlignmentRequest<'_>,
        _params: &PhaseCorrelationParams,
    ) -> Result<Option<PairwiseEstimate>> {
        Ok(None)
    }

    fn lucas_kanade(
        &self,
        _request: &PairAlignmentRequest<'_>,
        _params: &LucasKanadeParams,
        _progress: &dyn ProgressSink,
    ) -> Result<Option<PairwiseEstimate>> {
        Ok(None)
    }
}

/// Kernel replaying a scripted list of outcomes, one per call.
///
/// `None` entries are registration failures. Exhausting the script also
/// yields failures. Only meaningful with serial dispatch, where the call
/// order equals the batch order.
#[derive(Debug)]
pub struct SequenceKernel {
    outcomes: Mutex<VecDeque<Option<Vec3>>>,
}

impl SequenceKernel {
    pub fn new<I: IntoIterator<Item = Option<Vec3>>>(outcomes: I) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    fn respond(&self) -> Result<Option<PairwiseEstimate>> {
        let next = self
            .outcomes
            .lock()
            .expect("kernel mutex poisoned")
            .pop_front()
            .flatten();
        Ok(next.map(|shift| PairwiseEstimate {
            transform: translation(&shift),
            quality: 1.0,
        }))
    }
}

impl AlignmentKernel for SequenceKernel {
    fn phase_correlation(
        &self,
        _request: &PairAlignmentRequest<'_>,
        _params: &PhaseCorrelationParams,
    ) -> Result<Option<PairwiseEstimate>> {
        self.respond()
    }

    fn lucas_kanade(
        &self,
        _request: &PairAlignmentRequest<'_>,
        _params: &LucasKanadeParams,
        _progress: &dyn ProgressSink,
    ) -> Result<Option<PairwiseEstimate>> {
        self.respond()
    }
}

/// What a kernel was asked to do, minus the pixel data.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub prior: Aff3,
    pub fixed_dims: Dimensions,
    pub moving_dims: Dimensions,
    pub overlap: RealBounds,
    pub downsampling: Downsampling,
}

/// Wrapper recording every request before delegating to `inner`.
#[derive(Debug)]
pub struct RecordingKernel<K> {
    inner: K,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl<K> RecordingKernel<K> {
    pub fn new(inner: K) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn take_requests(&self) -> Vec<RecordedRequest> {
        std::mem::take(&mut *self.requests.lock().expect("kernel mutex poisoned"))
    }

    fn record(&self, method: &'static str, request: &PairAlignmentRequest<'_>) {
        self.requests
            .lock()
            .expect("kernel mutex poisoned")
            .push(RecordedRequest {
                method,
                prior: request.prior,
                fixed_dims: request.fixed.dims(),
                moving_dims: request.moving.dims(),
                overlap: request.overlap,
                downsampling: request.downsampling,
            });
    }
}

impl<K: AlignmentKernel> AlignmentKernel for RecordingKernel<K> {
    fn phase_correlation(
        &self,
        request: &PairAlignmentRequest<'_>,
        params: &PhaseCorrelationParams,
    ) -> Result<Option<PairwiseEstimate>> {
        self.record("phase_correlation", request);
        self.inner.phase_correlation(request, params)
    }

    fn lucas_kanade(
        &self,
        request: &PairAlignmentRequest<'_>,
        params: &LucasKanadeParams,
        progress: &dyn ProgressSink,
    ) -> Result<Option<PairwiseEstimate>> {
        self.record("lucas_kanade", request);
        self.inner.lucas_kanade(request, params, progress)
    }
}

/// An in-memory source with a deterministic ramp volume per catalog view.
pub fn ramp_source(catalog: &ViewCatalog) -> InMemoryImageSource {
    let mut source = InMemoryImageSource::new();
    for view in catalog.all_views() {
        if let Some(dims) = catalog.dimensions(view) {
            source.insert(view, ramp_volume(dims));
        }
    }
    source
}
