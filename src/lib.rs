// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Gauss-Newton antenna-gain update kernels for radio-interferometric
calibration.

Given observed visibilities, predicted model visibilities and a current set of
per-antenna Jones matrices, [`GainSolver::sweep`] forms residuals, accumulates
the J^H.R and J^H.J normal-equation terms per antenna and solution interval,
and applies one damped gain update. Convergence testing, damping schedules
and everything to do with reading or writing visibilities belong to the
caller.
 */

pub mod constants;
pub mod intervals;
pub mod jones;
pub mod params;
pub mod solve;

// Re-exports.
pub use constants::*;
pub use intervals::{Chanblock, IntervalError, SolutionIntervals, Timeblock};
pub use jones::Jones;
pub use params::{ParamsError, SolverParams};
pub use solve::{
    diagonal_inverse, matrix_inverse, Accumulators, DiagonalGains, GainAlgebra, GainSolver,
    SolveError, SweepInputs, SweepStats,
};

/// Double-precision complex numbers; all kernel arithmetic happens in this
/// precision.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;
