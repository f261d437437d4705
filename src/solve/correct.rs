// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Applying solved gains to visibilities.

use itertools::izip;
use ndarray::prelude::*;
use num_traits::Zero;
use rayon::prelude::*;

use super::matrix_inverse;
use crate::{intervals::SolutionIntervals, Jones};

/// Replace every visibility `V` with `G1^-1 V G2^-H`, using the gains of a
/// single direction, indexed by (timeblock, chanblock, tile). Visibilities on
/// baselines with a singular gain are set to zero; the number of these is
/// returned.
pub(super) fn correct_vis(
    mut vis_tfb: ArrayViewMut3<Jones>,
    gains_tca: ArrayView3<Jones>,
    baseline_antennas: &[(usize, usize)],
    intervals: &SolutionIntervals,
    inverse_floor: f64,
) -> usize {
    let inv_gains_tca = gains_tca.map(|g| matrix_inverse(g, inverse_floor));

    vis_tfb
        .outer_iter_mut()
        .into_par_iter()
        .enumerate()
        .map(|(i_time, mut vis_fb)| {
            let i_timeblock = intervals.timeblock_of(i_time);
            let mut num_zeroed = 0;
            for (i_chan, mut vis_b) in vis_fb.outer_iter_mut().enumerate() {
                let i_chanblock = intervals.chanblock_of(i_chan);
                let inv_gains_a = inv_gains_tca.slice(s![i_timeblock, i_chanblock, ..]);
                for (vis, &(tile1, tile2)) in izip!(vis_b.iter_mut(), baseline_antennas) {
                    let g1_inv = inv_gains_a[tile1];
                    let g2_inv = inv_gains_a[tile2];
                    if g1_inv.is_zero() || g2_inv.is_zero() {
                        *vis = Jones::default();
                        num_zeroed += 1;
                    } else {
                        *vis = g1_inv * *vis * g2_inv.h();
                    }
                }
            }
            num_zeroed
        })
        .sum()
}
