// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests; these only use the public API.

use std::io::Write;

use indoc::indoc;
use ndarray::prelude::*;
use tempfile::Builder;

use hyperdrive_gainsolve::{
    c64, Accumulators, GainSolver, Jones, SolutionIntervals, SolverParams, SweepInputs,
    DEFAULT_STEP_SIZE,
};

fn model_jones(time: usize, chan: usize, bl: usize) -> Jones {
    let s = (time * 13 + chan * 7 + bl * 3) as f64;
    Jones::from([
        c64::new(1.0 + 0.2 * (s * 0.3).sin(), 0.1 * s.cos()),
        c64::new(0.1 * (s * 1.1).cos(), 0.05),
        c64::new(-0.05, 0.1 * (s * 0.8).sin()),
        c64::new(0.9 + 0.2 * (s * 0.5).cos(), -0.1 * s.sin()),
    ])
}

fn true_gain(timeblock: usize, ant: usize) -> Jones {
    let s = (timeblock * 5 + ant * 3) as f64;
    Jones::from_diag(
        c64::from_polar(1.0 + 0.1 * s.sin(), 0.3 * (s * 0.7).cos()),
        c64::from_polar(0.9 + 0.1 * s.cos(), -0.2 * (s * 1.7).sin()),
    )
}

#[test]
fn test_solve_and_correct_with_params_from_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        indoc! {"
            inverse_floor = 1e-10
            num_threads = 2
        "}
        .as_bytes(),
    )
    .unwrap();
    let params = SolverParams::from_file(file.path()).unwrap();
    assert_eq!(params.num_threads, Some(2));
    let solver = GainSolver::new(params).unwrap();

    // Even and odd timesteps are solved separately.
    let intervals = SolutionIntervals::new(vec![0, 1, 0, 1], vec![0, 0, 0]).unwrap();
    let num_antennas = 5;
    let baselines: Vec<(usize, usize)> = (0..num_antennas)
        .flat_map(|tile1| (tile1 + 1..num_antennas).map(move |tile2| (tile1, tile2)))
        .collect();
    let dim = (
        intervals.num_timesteps(),
        intervals.num_chans(),
        baselines.len(),
    );

    let model = Array3::from_shape_fn(dim, |(t, f, bl)| model_jones(t, f, bl));
    let data = Array3::from_shape_fn(dim, |(t, f, bl)| {
        let (tile1, tile2) = baselines[bl];
        let tb = intervals.timeblock_of(t);
        true_gain(tb, tile1) * model[(t, f, bl)] * true_gain(tb, tile2).h()
    });
    let weights = Array3::from_elem(dim, 1.0);
    let model_dmtfb = model.clone().insert_axis(Axis(0)).insert_axis(Axis(0));

    let inputs = SweepInputs {
        vis_data_tfb: data.view(),
        vis_model_dmtfb: model_dmtfb.view(),
        vis_weights_tfb: weights.view(),
        baseline_antennas: &baselines,
        intervals: &intervals,
    };
    let mut gains = Array4::from_elem(
        (1, intervals.num_timeblocks(), intervals.num_chanblocks(), num_antennas),
        Jones::identity(),
    );
    let mut residual = Array3::zeros(dim);
    let mut accumulators = Accumulators::for_gains(gains.view());

    let mut converged = false;
    for _ in 0..1000 {
        let stats = solver
            .sweep(
                &inputs,
                gains.view_mut(),
                residual.view_mut(),
                &mut accumulators,
                DEFAULT_STEP_SIZE,
            )
            .unwrap();
        assert_eq!(stats.num_cells, 2 * num_antennas);
        if stats.max_update < 1e-24 {
            converged = true;
            break;
        }
    }
    assert!(converged);

    // The common phase of the solutions cancels when correcting.
    let mut corrected = data.clone();
    let num_zeroed = solver
        .correct(corrected.view_mut(), gains.view(), &baselines, &intervals, 0)
        .unwrap();
    assert_eq!(num_zeroed, 0);
    for (c, m) in corrected.iter().zip(model.iter()) {
        let diff = (*c - *m).norm_sqr();
        assert!(diff < 1e-16, "corrected {c:?} doesn't match model {m:?}");
    }
}
