//! Registration dispatch: load, aggregate, invoke, rescale.
//!
//! Each admitted pair is processed independently: member volumes are loaded
//! at the batch sampling, collapsed per the aggregation policy, and handed to
//! the kernel together with the prior relative placement. A returned
//! estimate is mapped back to full resolution; a per-pair problem (missing
//! data, degenerate geometry, kernel failure) downgrades that pair to a
//! failure outcome and never aborts the batch. Only cancellation does.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stitch_align::{
    aggregate_group, AggregationPolicy, AlignmentKernel, CancellationToken,
    PairAlignmentRequest, ProgressSink, RegistrationMethod, ViewImageSource,
};
use stitch_core::{
    Aff3, Downsampling, GroupPair, ImageVolume, PairwiseResult, ViewCatalog, ViewGroup,
};

use crate::pairs::{group_bounds, ComparisonBatch};

/// Worker-pool knobs for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Process pairs on the rayon pool; serial order is only needed by
    /// callers that want reproducible kernel call sequences.
    pub parallel: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// The batch-level failure: everything per-pair is folded into outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("pairwise registration was cancelled")]
    Cancelled,
}

/// One pair's outcome; `None` is a registration failure.
#[derive(Debug, Clone)]
pub struct PairwiseOutcome {
    pub pair: GroupPair,
    pub result: Option<PairwiseResult>,
}

struct PairContext<'a> {
    catalog: &'a ViewCatalog,
    method: &'a RegistrationMethod,
    aggregation: &'a AggregationPolicy,
    source: &'a dyn ViewImageSource,
    kernel: &'a dyn AlignmentKernel,
    progress: &'a dyn ProgressSink,
    downsampling: Downsampling,
}

/// Compute every pair of `batch`, in batch order when serial.
///
/// Cancellation is checked between pairs; a cancelled batch returns
/// [`DispatchError::Cancelled`] and its partial outcomes are discarded, so
/// the caller never merges half a run.
#[allow(clippy::too_many_arguments)]
pub fn compute_pairs(
    catalog: &ViewCatalog,
    batch: &ComparisonBatch,
    method: &RegistrationMethod,
    aggregation: &AggregationPolicy,
    source: &dyn ViewImageSource,
    kernel: &dyn AlignmentKernel,
    progress: &dyn ProgressSink,
    options: &DispatchOptions,
    token: &CancellationToken,
) -> Result<Vec<PairwiseOutcome>, DispatchError> {
    let total = batch.len();
    progress.message(&format!(
        "computing {total} pairwise registrations ({})",
        method.name()
    ));

    let ctx = PairContext {
        catalog,
        method,
        aggregation,
        source,
        kernel,
        progress,
        downsampling: batch.downsampling,
    };
    let done = AtomicUsize::new(0);
    let step = |pair: &GroupPair| -> PairwiseOutcome {
        let result = if token.is_cancelled() {
            // Outcomes are discarded below; skip the work.
            None
        } else {
            compute_single_pair(&ctx, pair)
        };
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.set_progress(finished as f64 / total.max(1) as f64);
        PairwiseOutcome {
            pair: pair.clone(),
            result,
        }
    };

    let outcomes: Vec<PairwiseOutcome> = if options.parallel {
        batch.pairs.par_iter().map(step).collect()
    } else {
        batch.pairs.iter().map(step).collect()
    };

    if token.is_cancelled() {
        return Err(DispatchError::Cancelled);
    }
    Ok(outcomes)
}

fn compute_single_pair(ctx: &PairContext<'_>, pair: &GroupPair) -> Option<PairwiseResult> {
    match try_compute_pair(ctx, pair) {
        Ok(Some(result)) => Some(result),
        Ok(None) => {
            log::info!("registration failed for pair {pair}");
            None
        }
        Err(err) => {
            log::warn!("pair {pair} skipped: {err:#}");
            None
        }
    }
}

fn try_compute_pair(ctx: &PairContext<'_>, pair: &GroupPair) -> Result<Option<PairwiseResult>> {
    let fixed_bounds = group_bounds(ctx.catalog, &pair.a)?;
    let moving_bounds = group_bounds(ctx.catalog, &pair.b)?;
    let Some(overlap) = fixed_bounds.intersection(&moving_bounds) else {
        bail!("groups no longer overlap under current placements");
    };

    let fixed = load_group(ctx, &pair.a)?;
    let moving = load_group(ctx, &pair.b)?;
    let prior = relative_prior(ctx, pair)?;

    let request = PairAlignmentRequest {
        fixed: &fixed,
        moving: &moving,
        prior,
        fixed_bounds,
        moving_bounds,
        overlap,
        downsampling: ctx.downsampling,
    };
    let Some(estimate) = ctx.kernel.align(ctx.method, &request, ctx.progress)? else {
        return Ok(None);
    };

    let correction = ctx.downsampling.upscale(&estimate.transform);
    let result = PairwiseResult::from_pair(pair, correction, estimate.quality, overlap)?;
    log::debug!(
        "pair {pair}: quality {:.4} at sampling {:?}",
        estimate.quality,
        ctx.downsampling
    );
    Ok(Some(result))
}

fn load_group(ctx: &PairContext<'_>, group: &ViewGroup) -> Result<ImageVolume> {
    let mut volumes = Vec::with_capacity(group.len());
    for &view in group.views() {
        let volume = ctx
            .source
            .load(view, &ctx.downsampling)
            .with_context(|| format!("loading view {view}"))?;
        volumes.push((view, volume));
    }
    aggregate_group(ctx.catalog, group, volumes, ctx.aggregation)
}

/// Prior placement of the moving group in the fixed group's downsampled
/// frame, from the reference views' current registrations.
fn relative_prior(ctx: &PairContext<'_>, pair: &GroupPair) -> Result<Aff3> {
    let fixed = registration_of(ctx.catalog, &pair.a)?;
    let moving = registration_of(ctx.catalog, &pair.b)?;
    let fixed_inv = fixed
        .try_inverse()
        .context("fixed placement is not invertible")?;
    let world = fixed_inv * moving;
    Ok(ctx.downsampling.inverse_transform() * world * ctx.downsampling.to_transform())
}

fn registration_of(catalog: &ViewCatalog, group: &ViewGroup) -> Result<Aff3> {
    let view = group.reference_view();
    match catalog.registration(view) {
        Some(reg) => Ok(*reg),
        None => bail!("view {view} of group {group} is not in the catalog"),
    }
}
