// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gauss-Newton gain updates.
//!
//! One call to [`GainSolver::sweep`] forms residuals from the current gains,
//! accumulates J^H.R and J^H.J per (direction, timeblock, chanblock, tile),
//! inverts J^H.J and applies a damped update to the gains. Deciding when to
//! stop iterating, and how to damp, is the caller's business.
//!
//! The numerical kernel is generic over a [`GainAlgebra`], which supplies the
//! matrix operations of a particular gain model. [`DiagonalGains`] is the
//! model where gains have no off-diagonal (leakage) terms.

mod accumulate;
mod correct;
mod error;
mod inverse;
mod update;

pub use error::SolveError;
pub use inverse::{diagonal_inverse, matrix_inverse};

use std::marker::PhantomData;

use log::{debug, trace};
use ndarray::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    intervals::SolutionIntervals,
    jones::{diag, Jones},
    params::SolverParams,
};

/// The matrix operations a gain model supplies to the generic kernel.
///
/// Implementations are selected at compile time; the kernel never branches
/// on the gain model.
pub trait GainAlgebra: Send + Sync + 'static {
    /// `out = G.M`; the Jacobian block J^H of a baseline for the *other*
    /// tile.
    fn jacobian_block(out: &mut Jones, g: &Jones, m: &Jones);

    /// `out -= G.M.G^H`.
    fn subtract_triple_product(out: &mut Jones, g: &Jones, m: &Jones, gh: &Jones);

    /// `out += (J^H)^H.J^H`, given the Jacobian block `jh` = J^H. This is a
    /// baseline's contribution to J^H.J.
    fn add_conjugate_square(out: &mut Jones, jh: &Jones);

    /// `out += R.J^H`, given the Jacobian block `jh` = J^H. This is a
    /// baseline's contribution to J^H.R.
    fn add_cross_product(out: &mut Jones, r: &Jones, jh: &Jones);

    /// The regularised inverse of an accumulated J^H.J.
    fn invert(jhj: &Jones, floor: f64) -> Jones;

    /// `out = (J^H.R).(J^H.J)^-1`, projected onto the gain model.
    fn update_product(out: &mut Jones, jhr: &Jones, jhj_inv: &Jones);

    /// `G += step_size * delta`, touching only the gain model's free terms.
    fn apply_update(g: &mut Jones, delta: &Jones, step_size: f64);
}

/// Gains with only `xx` and `yy` terms. The off-diagonal terms of gains are
/// never read, and never written by an update.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagonalGains;

impl GainAlgebra for DiagonalGains {
    #[inline(always)]
    fn jacobian_block(out: &mut Jones, g: &Jones, m: &Jones) {
        diag::product_diag(out, g, m)
    }

    #[inline(always)]
    fn subtract_triple_product(out: &mut Jones, g: &Jones, m: &Jones, gh: &Jones) {
        diag::subtract_triple_product(out, g, m, gh)
    }

    #[inline(always)]
    fn add_conjugate_square(out: &mut Jones, jh: &Jones) {
        diag::add_conjugate_square(out, jh)
    }

    #[inline(always)]
    fn add_cross_product(out: &mut Jones, r: &Jones, jh: &Jones) {
        diag::add_cross_product(out, r, jh)
    }

    #[inline(always)]
    fn invert(jhj: &Jones, floor: f64) -> Jones {
        diagonal_inverse(jhj, floor)
    }

    #[inline(always)]
    fn update_product(out: &mut Jones, jhr: &Jones, jhj_inv: &Jones) {
        diag::update_product(out, jhr, jhj_inv)
    }

    #[inline(always)]
    fn apply_update(g: &mut Jones, delta: &Jones, step_size: f64) {
        g[0] += delta[0] * step_size;
        g[3] += delta[3] * step_size;
    }
}

/// Borrowed, read-only inputs to a sweep. All arrays are owned by the caller.
pub struct SweepInputs<'a> {
    /// Observed visibilities. The first dimension is timestep, the second is
    /// channel, the third is baseline.
    pub vis_data_tfb: ArrayView3<'a, Jones>,

    /// Model visibilities. The dimensions are direction, model component,
    /// timestep, channel and baseline.
    pub vis_model_dmtfb: ArrayView5<'a, Jones>,

    /// Visibility weights, with the same shape as `vis_data_tfb`. Samples
    /// with weights <= 0 are flagged and do not contribute to the normal
    /// equations.
    pub vis_weights_tfb: ArrayView3<'a, f64>,

    /// The (tile1, tile2) pair of each baseline. Whether autocorrelations are
    /// included is up to the caller (via the weights); they are not checked
    /// for here.
    pub baseline_antennas: &'a [(usize, usize)],

    /// The solution interval of every timestep and channel.
    pub intervals: &'a SolutionIntervals,
}

impl SweepInputs<'_> {
    pub fn num_directions(&self) -> usize {
        self.vis_model_dmtfb.len_of(Axis(0))
    }

    /// The expected shape of gains and accumulators, given a number of
    /// antennas.
    fn gains_shape(&self, num_antennas: usize) -> [usize; 4] {
        [
            self.num_directions(),
            self.intervals.num_timeblocks(),
            self.intervals.num_chanblocks(),
            num_antennas,
        ]
    }

    /// Check that everything is consistent with the supplied gains and
    /// residual shapes. Nothing is read or written until this passes.
    fn validate(
        &self,
        gains_shape: &[usize],
        residual_shape: &[usize],
    ) -> Result<(), SolveError> {
        let num_baselines = self.vis_data_tfb.len_of(Axis(2));
        if num_baselines != self.baseline_antennas.len() {
            return Err(SolveError::BaselineCount {
                num_baselines,
                num_pairs: self.baseline_antennas.len(),
            });
        }

        let vis_shape = [
            self.intervals.num_timesteps(),
            self.intervals.num_chans(),
            num_baselines,
        ];
        check_shape("Data visibilities", self.vis_data_tfb.shape(), &vis_shape)?;
        check_shape("Visibility weights", self.vis_weights_tfb.shape(), &vis_shape)?;
        check_shape("Residual visibilities", residual_shape, &vis_shape)?;
        check_shape(
            "Model visibilities",
            self.vis_model_dmtfb.shape(),
            &[
                self.num_directions(),
                self.vis_model_dmtfb.len_of(Axis(1)),
                vis_shape[0],
                vis_shape[1],
                vis_shape[2],
            ],
        )?;

        let num_antennas = gains_shape.get(3).copied().unwrap_or_default();
        check_shape("Gains", gains_shape, &self.gains_shape(num_antennas))?;
        check_antennas(self.baseline_antennas, num_antennas)
    }
}

fn check_shape(what: &'static str, got: &[usize], expected: &[usize]) -> Result<(), SolveError> {
    if got == expected {
        Ok(())
    } else {
        Err(SolveError::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}

fn check_antennas(
    baseline_antennas: &[(usize, usize)],
    num_antennas: usize,
) -> Result<(), SolveError> {
    for (baseline, &(tile1, tile2)) in baseline_antennas.iter().enumerate() {
        for antenna in [tile1, tile2] {
            if antenna >= num_antennas {
                return Err(SolveError::AntennaOutOfRange {
                    baseline,
                    antenna,
                    num_antennas,
                });
            }
        }
    }
    Ok(())
}

/// The running sums of J^H.R and J^H.J. The dimensions of both arrays are
/// direction, timeblock, chanblock and tile. These are zeroed at the start of
/// every sweep, but can be reused across sweeps to avoid reallocating.
#[derive(Debug, Clone)]
pub struct Accumulators {
    pub jhr: Array4<Jones>,
    pub jhj: Array4<Jones>,
}

impl Accumulators {
    pub fn new(
        num_directions: usize,
        num_timeblocks: usize,
        num_chanblocks: usize,
        num_antennas: usize,
    ) -> Accumulators {
        let shape = (num_directions, num_timeblocks, num_chanblocks, num_antennas);
        Accumulators {
            jhr: Array4::zeros(shape),
            jhj: Array4::zeros(shape),
        }
    }

    /// Accumulators matching the shape of some gains.
    pub fn for_gains(gains: ArrayView4<Jones>) -> Accumulators {
        let (d, t, c, a) = gains.dim();
        Accumulators::new(d, t, c, a)
    }
}

/// Information on a completed sweep, for the caller's convergence test.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepStats {
    /// The number of (direction, timeblock, chanblock, tile) gain cells.
    pub num_cells: usize,

    /// The number of cells whose J^H.J inverse was entirely null; these gains
    /// were left unchanged.
    pub num_null_updates: usize,

    /// The largest squared Frobenius norm of any applied gain change.
    pub max_update: f64,
}

impl SweepStats {
    fn merge(self, other: SweepStats) -> SweepStats {
        SweepStats {
            num_cells: self.num_cells + other.num_cells,
            num_null_updates: self.num_null_updates + other.num_null_updates,
            max_update: self.max_update.max(other.max_update),
        }
    }
}

/// Drives the accumulation and update kernels over the data grid.
///
/// Workers are only ever given disjoint parts of the mutable arrays, or
/// their own partial sums; no locks or atomics are used. Residuals are split
/// by timestep and gains by timeblock. Accumulators are split by (timeblock,
/// chanblock) cell and, within a cell, by fixed-size chunks of baselines whose
/// partial sums are merged in chunk order. The summation order therefore
/// doesn't change with the number of threads.
pub struct GainSolver<A: GainAlgebra = DiagonalGains> {
    params: SolverParams,

    /// A dedicated pool, if a number of threads was requested.
    pool: Option<ThreadPool>,

    algebra: PhantomData<A>,
}

impl GainSolver<DiagonalGains> {
    /// A solver for diagonal gains.
    pub fn new(params: SolverParams) -> Result<GainSolver<DiagonalGains>, SolveError> {
        GainSolver::with_algebra(params)
    }
}

impl<A: GainAlgebra> GainSolver<A> {
    pub fn with_algebra(params: SolverParams) -> Result<GainSolver<A>, SolveError> {
        params.validate()?;
        let pool = match params.num_threads {
            Some(num_threads) => Some(ThreadPoolBuilder::new().num_threads(num_threads).build()?),
            None => None,
        };
        debug!(
            "Gain solver using {} threads, inverse floor {:e}",
            pool.as_ref()
                .map(|p| p.current_num_threads())
                .unwrap_or_else(rayon::current_num_threads),
            params.inverse_floor
        );

        Ok(GainSolver {
            params,
            pool,
            algebra: PhantomData,
        })
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    fn install<R: Send, OP: FnOnce() -> R + Send>(&self, op: OP) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Form only the residual `D - sum G M G^H` for the current gains. Flagged
    /// samples get a zero residual.
    pub fn residual(
        &self,
        inputs: &SweepInputs,
        gains: ArrayView4<Jones>,
        mut residual_tfb: ArrayViewMut3<Jones>,
    ) -> Result<(), SolveError> {
        inputs.validate(gains.shape(), residual_tfb.shape())?;
        self.install(|| {
            accumulate::form_residual::<A>(inputs, gains, residual_tfb.view_mut());
        });
        Ok(())
    }

    /// Perform one full sweep: form residuals (written to `residual_tfb`),
    /// accumulate the normal equations into `accumulators` and update `gains`
    /// in place with the given damping factor.
    ///
    /// The residual is the one for the gains *before* the update.
    pub fn sweep(
        &self,
        inputs: &SweepInputs,
        mut gains: ArrayViewMut4<Jones>,
        mut residual_tfb: ArrayViewMut3<Jones>,
        accumulators: &mut Accumulators,
        step_size: f64,
    ) -> Result<SweepStats, SolveError> {
        inputs.validate(gains.shape(), residual_tfb.shape())?;
        check_shape("J^H.R accumulator", accumulators.jhr.shape(), gains.shape())?;
        check_shape("J^H.J accumulator", accumulators.jhj.shape(), gains.shape())?;
        if !step_size.is_finite() {
            return Err(SolveError::InvalidStepSize(step_size));
        }

        let inverse_floor = self.params.inverse_floor;
        let stats = self.install(|| {
            accumulate::form_residual::<A>(inputs, gains.view(), residual_tfb.view_mut());
            accumulate::accumulate_normal_equations::<A>(
                inputs,
                gains.view(),
                residual_tfb.view(),
                accumulators.jhr.view_mut(),
                accumulators.jhj.view_mut(),
                accumulate::BASELINES_PER_CHUNK,
            );
            update::update_gains::<A>(
                gains.view_mut(),
                accumulators.jhr.view(),
                accumulators.jhj.view(),
                step_size,
                inverse_floor,
            )
        });

        trace!("Sweep finished: {stats:?}");
        if stats.num_null_updates > 0 {
            debug!(
                "{} of {} gain cells received a null update (insufficient data)",
                stats.num_null_updates, stats.num_cells
            );
        }
        Ok(stats)
    }

    /// Correct visibilities in place with the gains of one direction:
    /// `V = G1^-1 V G2^-H`. Visibilities that touch a singular gain are set to
    /// zero; the number of these is returned.
    pub fn correct(
        &self,
        mut vis_tfb: ArrayViewMut3<Jones>,
        gains: ArrayView4<Jones>,
        baseline_antennas: &[(usize, usize)],
        intervals: &SolutionIntervals,
        direction: usize,
    ) -> Result<usize, SolveError> {
        let num_directions = gains.len_of(Axis(0));
        if direction >= num_directions {
            return Err(SolveError::DirectionOutOfRange {
                direction,
                num_directions,
            });
        }
        let num_baselines = vis_tfb.len_of(Axis(2));
        if num_baselines != baseline_antennas.len() {
            return Err(SolveError::BaselineCount {
                num_baselines,
                num_pairs: baseline_antennas.len(),
            });
        }
        check_shape(
            "Visibilities",
            vis_tfb.shape(),
            &[intervals.num_timesteps(), intervals.num_chans(), num_baselines],
        )?;
        let num_antennas = gains.len_of(Axis(3));
        check_shape(
            "Gains",
            gains.shape(),
            &[
                num_directions,
                intervals.num_timeblocks(),
                intervals.num_chanblocks(),
                num_antennas,
            ],
        )?;
        check_antennas(baseline_antennas, num_antennas)?;

        let inverse_floor = self.params.inverse_floor;
        let num_zeroed = self.install(|| {
            correct::correct_vis(
                vis_tfb.view_mut(),
                gains.index_axis(Axis(0), direction),
                baseline_antennas,
                intervals,
                inverse_floor,
            )
        });
        if num_zeroed > 0 {
            debug!("{num_zeroed} visibilities touched singular gains and were zeroed");
        }
        Ok(num_zeroed)
    }
}
