//! Registration strategies and their parameter sets.
//!
//! The strategy set is closed: adding one means adding an enum variant, a
//! parameter struct and a kernel entry point. Parameters are plain data and
//! travel with the run configuration; the numerics behind them live outside
//! this workspace, behind [`crate::AlignmentKernel`].

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Which pairwise registration strategy to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrationMethod {
    PhaseCorrelation {
        #[serde(default)]
        params: PhaseCorrelationParams,
    },
    LucasKanade {
        #[serde(default)]
        params: LucasKanadeParams,
    },
}

impl Default for RegistrationMethod {
    fn default() -> Self {
        RegistrationMethod::PhaseCorrelation {
            params: PhaseCorrelationParams::default(),
        }
    }
}

impl RegistrationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationMethod::PhaseCorrelation { .. } => "phase_correlation",
            RegistrationMethod::LucasKanade { .. } => "lucas_kanade",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RegistrationMethod::PhaseCorrelation { params } => params.validate(),
            RegistrationMethod::LucasKanade { params } => params.validate(),
        }
    }
}

/// Parameters of the Fourier-based translation search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseCorrelationParams {
    /// Minimum fraction of the candidate overlap a correlation peak must
    /// cover to be accepted.
    pub min_overlap: f64,
    /// How many correlation peaks to inspect before giving up.
    pub peaks_to_check: usize,
    /// Refine the chosen peak to subpixel precision.
    pub subpixel: bool,
}

impl Default for PhaseCorrelationParams {
    fn default() -> Self {
        Self {
            min_overlap: 0.0,
            peaks_to_check: 5,
            subpixel: true,
        }
    }
}

impl PhaseCorrelationParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..1.0).contains(&self.min_overlap),
            "min_overlap must be in [0, 1), got {}",
            self.min_overlap
        );
        ensure!(
            self.peaks_to_check >= 1,
            "peaks_to_check must be at least 1"
        );
        Ok(())
    }
}

/// Parameters of the iterative gradient-descent alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LucasKanadeParams {
    pub warp: WarpFunctionType,
    pub max_iterations: usize,
    /// Convergence threshold on the parameter update norm.
    pub min_parameter_change: f64,
}

impl Default for LucasKanadeParams {
    fn default() -> Self {
        Self {
            warp: WarpFunctionType::Translation,
            max_iterations: 100,
            min_parameter_change: 0.01,
        }
    }
}

impl LucasKanadeParams {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_iterations >= 1, "max_iterations must be at least 1");
        ensure!(
            self.min_parameter_change > 0.0,
            "min_parameter_change must be positive, got {}",
            self.min_parameter_change
        );
        Ok(())
    }
}

/// Family of warp functions the iterative alignment may optimize over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpFunctionType {
    #[default]
    Translation,
    Rigid,
    Similarity,
    Affine,
}

impl WarpFunctionType {
    /// Number of free parameters for an `n`-dimensional warp.
    pub fn num_parameters(&self, dims: usize) -> usize {
        let rotations = dims * (dims.saturating_sub(1)) / 2;
        match self {
            WarpFunctionType::Translation => dims,
            WarpFunctionType::Rigid => dims + rotations,
            WarpFunctionType::Similarity => dims + rotations + 1,
            WarpFunctionType::Affine => dims * (dims + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_is_tagged_by_strategy() {
        let method = RegistrationMethod::default();
        let json = serde_json::to_value(&method).unwrap();
        assert_eq!(json["type"], "phase_correlation");
        assert_eq!(json["params"]["peaks_to_check"], 5);

        let lk = RegistrationMethod::LucasKanade {
            params: LucasKanadeParams {
                warp: WarpFunctionType::Affine,
                ..LucasKanadeParams::default()
            },
        };
        let json = serde_json::to_value(&lk).unwrap();
        assert_eq!(json["type"], "lucas_kanade");
        assert_eq!(json["params"]["warp"], "affine");
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let method: RegistrationMethod =
            serde_json::from_str(r#"{"type": "lucas_kanade"}"#).unwrap();
        match method {
            RegistrationMethod::LucasKanade { params } => {
                assert_eq!(params, LucasKanadeParams::default());
            }
            other => panic!("unexpected method {other:?}"),
        }
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let bad_overlap = RegistrationMethod::PhaseCorrelation {
            params: PhaseCorrelationParams {
                min_overlap: 1.5,
                ..PhaseCorrelationParams::default()
            },
        };
        assert!(bad_overlap.validate().is_err());

        let bad_iters = RegistrationMethod::LucasKanade {
            params: LucasKanadeParams {
                max_iterations: 0,
                ..LucasKanadeParams::default()
            },
        };
        assert!(bad_iters.validate().is_err());
    }

    #[test]
    fn warp_parameter_counts() {
        use WarpFunctionType::*;
        assert_eq!(Translation.num_parameters(3), 3);
        assert_eq!(Rigid.num_parameters(3), 6);
        assert_eq!(Similarity.num_parameters(3), 7);
        assert_eq!(Affine.num_parameters(3), 12);
        assert_eq!(Rigid.num_parameters(2), 3);
        assert_eq!(Affine.num_parameters(2), 6);
    }
}
