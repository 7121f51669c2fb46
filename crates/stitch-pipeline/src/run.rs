//! The pairwise-shifts step function.
//!
//! Ties the stages together: select views, group them, enumerate candidate
//! pairs, dispatch registrations, and fold the outcomes into the project's
//! results store. The session records one audit entry per run.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use stitch_align::{
    AggregationPolicy, AlignmentKernel, CancellationToken, ProgressSink, RegistrationMethod,
    ViewImageSource,
};
use stitch_core::{Downsampling, ViewFilter};

use crate::dispatch::{compute_pairs, DispatchOptions};
use crate::grouping::{group_views, GroupingConfig};
use crate::merge::{merge_outcomes, MergeSummary};
use crate::pairs::enumerate_pairs;
use crate::session::StitchingSession;

/// Full configuration of a pairwise-shifts run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// How views are bucketed, collapsed, and compared.
    pub grouping: GroupingConfig,

    /// Registration method handed to the kernel.
    pub method: RegistrationMethod,

    /// How grouped views collapse into one volume.
    pub aggregation: AggregationPolicy,

    /// Sampling at which registrations are computed.
    pub downsampling: Downsampling,

    /// Restriction of the run to a subset of views. `None` means all views.
    pub filter: Option<ViewFilter>,

    /// Worker-pool knobs.
    pub dispatch: DispatchOptions,
}

impl RunConfig {
    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if the factor axes overlap, the method parameters
    /// are out of range, or a downsampling factor is zero.
    pub fn validate(&self) -> Result<()> {
        self.grouping.validate()?;
        self.method.validate()?;
        self.downsampling.validate()?;
        Ok(())
    }
}

/// Counts describing one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Views admitted by the filter.
    pub views: usize,
    /// Application buckets the views fell into.
    pub buckets: usize,
    /// Comparison groups across all buckets.
    pub groups: usize,
    /// Pairs that passed comparability and overlap screening.
    pub candidate_pairs: usize,
    /// What the merge did to the results store.
    pub merge: MergeSummary,
}

/// Recompute pairwise registrations for the session's project.
///
/// Every candidate pair is recomputed from scratch and its store entry
/// replaced; pairs that fail registration end up with no entry. The session
/// log receives a success entry with counts, or a failure entry with the
/// error, and the error is returned as well.
///
/// # Errors
///
/// Returns an error if the session has no project, the configuration is
/// invalid, or the run is cancelled. Per-pair registration failures are not
/// errors.
pub fn run_pairwise_shifts(
    session: &mut StitchingSession,
    config: &RunConfig,
    source: &dyn ViewImageSource,
    kernel: &dyn AlignmentKernel,
    progress: &dyn ProgressSink,
    token: &CancellationToken,
) -> Result<RunSummary> {
    match run_inner(session, config, source, kernel, progress, token) {
        Ok(summary) => {
            session.log_success_with_notes(
                StitchingSession::PIPELINE,
                format!(
                    "{} of {} candidate pairs registered, {} failed",
                    summary.merge.inserted, summary.candidate_pairs, summary.merge.failed
                ),
            );
            Ok(summary)
        }
        Err(err) => {
            session.log_failure(StitchingSession::PIPELINE, format!("{err:#}"));
            Err(err)
        }
    }
}

fn run_inner(
    session: &mut StitchingSession,
    config: &RunConfig,
    source: &dyn ViewImageSource,
    kernel: &dyn AlignmentKernel,
    progress: &dyn ProgressSink,
    token: &CancellationToken,
) -> Result<RunSummary> {
    config.validate()?;
    let project = session.require_project_mut()?;
    let catalog = project.catalog();
    if catalog.all_2d() {
        ensure!(
            config.downsampling.z == 1,
            "z downsampling {} is invalid for a two-dimensional dataset",
            config.downsampling.z
        );
    }

    let views = match &config.filter {
        Some(filter) => catalog.views(filter),
        None => catalog.all_views(),
    };
    let grouped = group_views(catalog, &views, &config.grouping)?;
    let batch = enumerate_pairs(catalog, &grouped, &config.grouping, config.downsampling)?;
    log::info!(
        "{} views in {} buckets yield {} groups and {} candidate pairs",
        views.len(),
        grouped.buckets.len(),
        grouped.num_groups(),
        batch.len()
    );

    let outcomes = compute_pairs(
        catalog,
        &batch,
        &config.method,
        &config.aggregation,
        source,
        kernel,
        progress,
        &config.dispatch,
        token,
    )?;
    let merge = merge_outcomes(project.results_mut(), outcomes);

    Ok(RunSummary {
        views: views.len(),
        buckets: grouped.buckets.len(),
        groups: grouped.num_groups(),
        candidate_pairs: batch.len(),
        merge,
    })
}
