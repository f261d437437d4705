// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::{diag::*, *};

fn one_through_eight() -> Jones {
    Jones([
        c64::new(1.0, 2.0),
        c64::new(3.0, 4.0),
        c64::new(5.0, 6.0),
        c64::new(7.0, 8.0),
    ])
}

fn some_diag_gain() -> Jones {
    Jones::from_diag(c64::new(1.0, 2.0), c64::new(3.0, -1.0))
}

#[test]
fn test_add() {
    let a = one_through_eight();
    let b = one_through_eight();
    let c = a + b;
    let expected_c = Jones([
        c64::new(2.0, 4.0),
        c64::new(6.0, 8.0),
        c64::new(10.0, 12.0),
        c64::new(14.0, 16.0),
    ]);
    assert_abs_diff_eq!(c, expected_c, epsilon = 1e-10);
}

#[test]
fn test_sub() {
    let a = one_through_eight();
    let b = one_through_eight();
    let c = a - b;
    assert_abs_diff_eq!(c, Jones::zero(), epsilon = 1e-10);
}

#[test]
fn test_mul() {
    let i = c64::new(1.0, 2.0);
    let a = Jones([i, i + 1.0, i + 2.0, i + 3.0]);
    let b = Jones([i * 2.0, i * 3.0, i * 4.0, i * 5.0]);
    let c = a * &b;
    let expected_c = Jones([
        c64::new(-14.0, 32.0),
        c64::new(-19.0, 42.0),
        c64::new(-2.0, 56.0),
        c64::new(-3.0, 74.0),
    ]);
    assert_abs_diff_eq!(c, expected_c, epsilon = 1e-10);
}

#[test]
fn test_mul_hermitian() {
    let a = one_through_eight();
    // A^H is the conjugate transpose.
    let result = Jones::identity().mul_hermitian(&a);
    let expected = Jones([
        c64::new(1.0, -2.0),
        c64::new(5.0, -6.0),
        c64::new(3.0, -4.0),
        c64::new(7.0, -8.0),
    ]);
    assert_abs_diff_eq!(result, expected, epsilon = 1e-10);
}

#[test]
fn test_identity_gain_leaves_model_unchanged() {
    let g = Jones::identity();
    let m = Jones::from_diag(c64::new(2.0, 1.0), c64::new(3.0, -2.0));
    let mut out = Jones::nan();
    triple_product(&mut out, &g, &m, &g.h());
    assert_eq!(out, m);
}

#[test]
fn test_triple_product_matches_general_product() {
    let g1 = some_diag_gain();
    let g2 = Jones::from_diag(c64::new(-0.5, 0.25), c64::new(0.1, 1.5));
    let m = one_through_eight();
    let mut out = Jones::default();
    triple_product(&mut out, &g1, &m, &g2.h());
    assert_abs_diff_eq!(out, g1 * m * g2.h(), epsilon = 1e-12);
}

#[test]
fn test_scales_compose_to_triple_product() {
    let g = some_diag_gain();
    let gh = g.h();
    let m = one_through_eight();

    let mut sequential = m;
    in_place_left_scale(&g, &mut sequential);
    in_place_right_scale(&mut sequential, &gh);

    let mut fused = Jones::default();
    triple_product(&mut fused, &g, &m, &gh);
    assert_abs_diff_eq!(sequential, fused, epsilon = 1e-12);
}

#[test]
fn test_product_diag() {
    let g = some_diag_gain();
    let m = one_through_eight();
    let mut out = Jones::nan();
    product_diag(&mut out, &g, &m);
    assert_abs_diff_eq!(out, g * m, epsilon = 1e-12);
}

#[test]
fn test_diag_primitives_ignore_off_diagonal_gain_terms() {
    // Poison the off-diagonal terms; none of the diagonal primitives may read
    // them.
    let mut g = some_diag_gain();
    g[1] = c64::new(f64::NAN, f64::NAN);
    g[2] = c64::new(f64::NAN, f64::NAN);
    let m = one_through_eight();

    let mut out = Jones::default();
    product_diag(&mut out, &g, &m);
    assert!(!out.any_nan());
    triple_product(&mut out, &g, &m, &g);
    assert!(!out.any_nan());
    subtract_triple_product(&mut out, &g, &m, &g);
    assert!(!out.any_nan());
    let mut m2 = m;
    in_place_left_scale(&g, &mut m2);
    in_place_right_scale(&mut m2, &g);
    assert!(!m2.any_nan());
}

#[test]
fn test_subtract_triple_product_round_trip() {
    let g = some_diag_gain();
    let gh = Jones::from_diag(c64::new(0.3, -0.7), c64::new(2.0, 0.5));
    let m = one_through_eight();
    let original = Jones::from([
        c64::new(10.0, -1.0),
        c64::new(0.5, 0.5),
        c64::new(-2.0, 3.0),
        c64::new(4.0, 4.0),
    ]);

    let mut out = original;
    subtract_triple_product(&mut out, &g, &m, &gh);
    let mut model = Jones::default();
    triple_product(&mut model, &g, &m, &gh);
    out += model;
    assert_abs_diff_eq!(out, original, epsilon = 1e-12);
}

#[test]
fn test_add_conjugate_square() {
    let j = one_through_eight();
    let mut out = Jones::default();
    add_conjugate_square(&mut out, &j);
    assert_abs_diff_eq!(out, j.h() * j, epsilon = 1e-12);
    // The diagonal is real and non-negative.
    assert_abs_diff_eq!(out[0].im, 0.0);
    assert_abs_diff_eq!(out[3].im, 0.0);
    assert!(out[0].re >= 0.0);
    assert!(out[3].re >= 0.0);
}

#[test]
fn test_add_conjugate_square_is_sign_invariant() {
    let j = one_through_eight();

    let mut both = Jones::default();
    add_conjugate_square(&mut both, &j);
    add_conjugate_square(&mut both, &-j);

    let mut twice = Jones::default();
    add_conjugate_square(&mut twice, &j);
    twice *= 2.0;

    assert_abs_diff_eq!(both, twice, epsilon = 1e-12);
}

#[test]
fn test_add_cross_product() {
    let r = one_through_eight();
    let jh = Jones::from([
        c64::new(0.5, -1.0),
        c64::new(2.0, 0.0),
        c64::new(0.0, 3.0),
        c64::new(-1.0, -1.0),
    ]);
    let mut out = Jones::identity();
    add_cross_product(&mut out, &r, &jh);
    assert_abs_diff_eq!(out, Jones::identity() + r * jh, epsilon = 1e-12);
}

#[test]
fn test_update_product_is_diagonal() {
    let a = one_through_eight();
    let b = Jones::from_diag(c64::new(0.5, 0.0), c64::new(0.25, 0.0));
    let mut out = Jones::nan();
    update_product(&mut out, &a, &b);
    assert!(out.is_diagonal());
    assert_abs_diff_eq!(
        out,
        Jones::from_diag(a[0] * 0.5, a[3] * 0.25),
        epsilon = 1e-12
    );
}
