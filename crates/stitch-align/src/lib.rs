//! Registration strategy layer for `stitching-rs`.
//!
//! This crate defines everything the pipeline needs to *invoke* a pairwise
//! registration without containing the registration numerics themselves:
//!
//! - strategy selection and parameters ([`RegistrationMethod`]),
//! - the kernel contract ([`AlignmentKernel`]) the embedding application
//!   implements,
//! - image access behind [`ViewImageSource`],
//! - group aggregation policies,
//! - progress reporting and cooperative cancellation.
//!
//! The split keeps heavy numerics (FFTs, iterative warps) replaceable: the
//! pipeline prepares requests and interprets estimates; kernels do the math.

/// Group volume aggregation.
mod aggregate;
/// The alignment kernel contract.
mod kernel;
/// Registration strategies and parameters.
mod method;
/// Progress sinks and cancellation.
mod progress;
/// Image access traits and the in-memory source.
mod source;

/// Deterministic kernels and sources for cross-crate testing.
///
/// This module is public to allow usage in integration tests across the
/// workspace, but is not intended for production use.
pub mod testing;

pub use aggregate::*;
pub use kernel::*;
pub use method::*;
pub use progress::*;
pub use source::*;
