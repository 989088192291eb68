//! Forbidden-region interval sets
//!
//! During model construction, the nonlinear arithmetic engine tracks,
//! per variable, the union of all intervals where the variable is known
//! to be infeasible, each annotated with the literal (and optionally the
//! clause) responsible. On every decision the solver asks three
//! questions:
//!
//! 1. Does the set cover the whole line? Then the current assignment is
//!    in conflict and the justifications form the explanation.
//! 2. Otherwise, which value should the variable take? A witness is
//!    picked in the complement — deterministically, uniformly at random
//!    among the feasible regions, or weighted by a per-variable
//!    sampling distribution.
//! 3. How does a newly discovered forbidden interval change the set? A
//!    linear-time ordered union merges it in, clipping overlaps so each
//!    point keeps one justification and fusing adjacent intervals that
//!    share one.
//!
//! Sets are immutable, reference-counted nodes handed out as
//! [`SetId`]s; the empty set is `None`. All numeric work goes through
//! the [`nra_core::NumManager`] contract, so the engine is independent
//! of the underlying real-algebraic-number representation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distribution;
pub mod interval;
pub mod manager;
pub mod store;
mod union;
pub mod witness;

pub use distribution::{Distribution, DistributionKind, InverseCdfError, RANDOM_PRECISION};
pub use interval::Interval;
pub use manager::{DisplaySet, IntervalSetManager};
pub use store::SetId;
pub use witness::WitnessMode;
