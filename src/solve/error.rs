// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all solver-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("{what} has shape {got:?}, but {expected:?} was expected")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("The visibilities have {num_baselines} baselines, but {num_pairs} antenna pairs were supplied")]
    BaselineCount {
        num_baselines: usize,
        num_pairs: usize,
    },

    #[error("Baseline {baseline} refers to antenna {antenna}, but there are only {num_antennas} antennas")]
    AntennaOutOfRange {
        baseline: usize,
        antenna: usize,
        num_antennas: usize,
    },

    #[error("Direction {direction} was requested, but there are only {num_directions} directions")]
    DirectionOutOfRange {
        direction: usize,
        num_directions: usize,
    },

    #[error("The step size must be finite, but got {0}")]
    InvalidStepSize(f64),

    #[error(transparent)]
    Params(#[from] crate::params::ParamsError),

    #[error("Couldn't create the solver thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
