// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning accumulated normal-equation terms into new gains.

use ndarray::prelude::*;
use ndarray::Zip;
use num_traits::Zero;
use rayon::prelude::*;

use super::{GainAlgebra, SweepStats};
use crate::Jones;

/// For every (direction, timeblock, chanblock, tile) cell, apply
///
/// G' = G + step_size * (J^H.R) (J^H.J)^-1
///
/// where the inverse is regularised by `inverse_floor`. Timeblocks are
/// updated in parallel.
pub(super) fn update_gains<A: GainAlgebra>(
    mut gains: ArrayViewMut4<Jones>,
    jhr: ArrayView4<Jones>,
    jhj: ArrayView4<Jones>,
    step_size: f64,
    inverse_floor: f64,
) -> SweepStats {
    gains
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .zip(jhr.axis_iter(Axis(1)).into_par_iter())
        .zip(jhj.axis_iter(Axis(1)).into_par_iter())
        .map(|((mut gains_dca, jhr_dca), jhj_dca)| {
            let mut stats = SweepStats::default();
            Zip::from(&mut gains_dca)
                .and(&jhr_dca)
                .and(&jhj_dca)
                .for_each(|gain, jhr, jhj| {
                    let jhj_inv = A::invert(jhj, inverse_floor);
                    let mut delta = Jones::default();
                    A::update_product(&mut delta, jhr, &jhj_inv);
                    A::apply_update(gain, &delta, step_size);

                    stats.num_cells += 1;
                    if jhj_inv.is_zero() {
                        stats.num_null_updates += 1;
                    }
                    stats.max_update = stats.max_update.max((delta * step_size).norm_sqr());
                });
            stats
        })
        .reduce(SweepStats::default, SweepStats::merge)
}
