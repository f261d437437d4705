// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Residual formation and accumulation of the normal-equation terms.
//!
//! For a baseline between tiles 1 and 2, the model is `G1 M G2^H`. Holding G2
//! fixed, the Jacobian block for tile 1 is `J^H = G2 M^H`; tile 2 sees the
//! reverse baseline, with residual `R^H` and `J^H = G1 M`. Every baseline
//! touching a tile contributes to that tile's running sums
//!
//! J^H.R += R J^H, J^H.J += (J^H)^H J^H
//!
//! which is the same bookkeeping as "MitchCal" (equation 11 of Mitchell et
//! al. <https://ui.adsabs.harvard.edu/abs/2008ISTSP...2..707M/abstract>),
//! generalised to multiple directions and solution intervals.

use itertools::izip;
use ndarray::prelude::*;
use rayon::prelude::*;

use super::{GainAlgebra, SweepInputs};
use crate::{
    intervals::{Chanblock, Timeblock},
    Jones,
};

/// Form `R = D - sum_dir sum_model G1 M G2^H` for every sample. Flagged
/// samples (weight <= 0) get a zero residual.
///
/// Each timestep's residuals are written by exactly one worker.
pub(super) fn form_residual<A: GainAlgebra>(
    inputs: &SweepInputs,
    gains: ArrayView4<Jones>,
    mut residual_tfb: ArrayViewMut3<Jones>,
) {
    let num_directions = gains.len_of(Axis(0));
    let model = &inputs.vis_model_dmtfb;
    let num_models = model.len_of(Axis(1));

    // Time axis.
    residual_tfb
        .outer_iter_mut()
        .into_par_iter()
        .zip(inputs.vis_data_tfb.outer_iter().into_par_iter())
        .zip(inputs.vis_weights_tfb.outer_iter().into_par_iter())
        .enumerate()
        .for_each(|(i_time, ((mut residual_fb, data_fb), weights_fb))| {
            let i_timeblock = inputs.intervals.timeblock_of(i_time);

            // Frequency axis.
            for (i_chan, (mut residual_b, data_b, weights_b)) in izip!(
                residual_fb.outer_iter_mut(),
                data_fb.outer_iter(),
                weights_fb.outer_iter()
            )
            .enumerate()
            {
                let i_chanblock = inputs.intervals.chanblock_of(i_chan);
                let gains_da = gains.slice(s![.., i_timeblock, i_chanblock, ..]);

                // Baseline axis.
                for (i_bl, (residual, data, &weight, &(tile1, tile2))) in izip!(
                    residual_b.iter_mut(),
                    data_b.iter(),
                    weights_b.iter(),
                    inputs.baseline_antennas
                )
                .enumerate()
                {
                    if weight <= 0.0 {
                        *residual = Jones::default();
                        continue;
                    }

                    *residual = *data;
                    for i_dir in 0..num_directions {
                        let g1 = gains_da[(i_dir, tile1)];
                        let g2h = gains_da[(i_dir, tile2)].h();
                        for i_model in 0..num_models {
                            A::subtract_triple_product(
                                residual,
                                &g1,
                                &model[(i_dir, i_model, i_time, i_chan, i_bl)],
                                &g2h,
                            );
                        }
                    }
                }
            }
        });
}

/// The number of baselines one worker accumulates into its own partial sums
/// before they are merged into a cell's accumulators.
pub(super) const BASELINES_PER_CHUNK: usize = 128;

/// Zero and then fill the J^H.R and J^H.J accumulators, which are indexed by
/// (direction, timeblock, chanblock, tile).
///
/// The work is split by (timeblock, chanblock) cell, and within a cell by
/// chunks of `baselines_per_chunk` baselines. Each chunk is summed into its
/// own partial accumulators; the partials are then added into the cell in
/// chunk order, so no two workers ever write the same accumulator and the
/// result doesn't depend on how the chunks were scheduled.
pub(super) fn accumulate_normal_equations<A: GainAlgebra>(
    inputs: &SweepInputs,
    gains: ArrayView4<Jones>,
    residual_tfb: ArrayView3<Jones>,
    mut jhr: ArrayViewMut4<Jones>,
    mut jhj: ArrayViewMut4<Jones>,
    baselines_per_chunk: usize,
) {
    let baselines_per_chunk = baselines_per_chunk.max(1);

    // Timeblock axis.
    jhr.axis_iter_mut(Axis(1))
        .into_par_iter()
        .zip(jhj.axis_iter_mut(Axis(1)).into_par_iter())
        .zip(inputs.intervals.timeblocks.par_iter())
        .for_each(|((mut jhr_dca, mut jhj_dca), timeblock)| {
            // Chanblock axis.
            jhr_dca
                .axis_iter_mut(Axis(1))
                .into_par_iter()
                .zip(jhj_dca.axis_iter_mut(Axis(1)).into_par_iter())
                .zip(inputs.intervals.chanblocks.par_iter())
                .for_each(|((mut jhr_da, mut jhj_da), chanblock)| {
                    let gains_da = gains.slice(s![.., timeblock.index, chanblock.index, ..]);

                    // Baseline chunks.
                    let partials: Vec<(Array2<Jones>, Array2<Jones>)> = inputs
                        .baseline_antennas
                        .par_chunks(baselines_per_chunk)
                        .enumerate()
                        .map(|(i_chunk, chunk)| {
                            let mut jhr_partial = Array2::zeros(gains_da.dim());
                            let mut jhj_partial = Array2::zeros(gains_da.dim());
                            accumulate_chunk::<A>(
                                inputs,
                                gains_da,
                                residual_tfb,
                                timeblock,
                                chanblock,
                                i_chunk * baselines_per_chunk,
                                chunk,
                                jhr_partial.view_mut(),
                                jhj_partial.view_mut(),
                            );
                            (jhr_partial, jhj_partial)
                        })
                        .collect();

                    jhr_da.fill(Jones::default());
                    jhj_da.fill(Jones::default());
                    for (jhr_partial, jhj_partial) in partials {
                        jhr_da += &jhr_partial;
                        jhj_da += &jhj_partial;
                    }
                });
        });
}

/// Accumulate the samples of one solution interval on a contiguous run of
/// baselines, the first of which has index `first_baseline`. This function is
/// run in parallel; for that reason, no parallel code is inside it.
#[allow(clippy::too_many_arguments)]
fn accumulate_chunk<A: GainAlgebra>(
    inputs: &SweepInputs,
    gains_da: ArrayView2<Jones>,
    residual_tfb: ArrayView3<Jones>,
    timeblock: &Timeblock,
    chanblock: &Chanblock,
    first_baseline: usize,
    baseline_antennas: &[(usize, usize)],
    mut jhr_da: ArrayViewMut2<Jones>,
    mut jhj_da: ArrayViewMut2<Jones>,
) {
    let num_directions = gains_da.len_of(Axis(0));
    let model = &inputs.vis_model_dmtfb;
    let num_models = model.len_of(Axis(1));

    for &i_time in timeblock.timesteps.iter() {
        for &i_chan in chanblock.chans.iter() {
            for (i_bl, &(tile1, tile2)) in (first_baseline..).zip(baseline_antennas) {
                let weight = inputs.vis_weights_tfb[(i_time, i_chan, i_bl)];
                if weight <= 0.0 {
                    continue;
                }
                // Both R and J^H carry sqrt(w), so both sums are weighted by w.
                let sqrt_weight = weight.sqrt();
                let residual = residual_tfb[(i_time, i_chan, i_bl)] * sqrt_weight;
                let residual_h = residual.h();

                for i_dir in 0..num_directions {
                    // The model components of a direction share its gain.
                    let mut model_sum = Jones::default();
                    for i_model in 0..num_models {
                        model_sum += model[(i_dir, i_model, i_time, i_chan, i_bl)];
                    }
                    let g1 = gains_da[(i_dir, tile1)];
                    let g2 = gains_da[(i_dir, tile2)];
                    let mut jh = Jones::default();

                    // Tile 1
                    {
                        // J^H = G2 M^H
                        A::jacobian_block(&mut jh, &g2, &model_sum.h());
                        jh *= sqrt_weight;
                        A::add_cross_product(&mut jhr_da[(i_dir, tile1)], &residual, &jh);
                        A::add_conjugate_square(&mut jhj_da[(i_dir, tile1)], &jh);
                    }
                    // Tile 2
                    {
                        // J^H = G1 M, against the residual of the reverse
                        // baseline.
                        A::jacobian_block(&mut jh, &g1, &model_sum);
                        jh *= sqrt_weight;
                        A::add_cross_product(&mut jhr_da[(i_dir, tile2)], &residual_h, &jh);
                        A::add_conjugate_square(&mut jhj_da[(i_dir, tile2)], &jh);
                    }
                }
            }
        }
    }
}
