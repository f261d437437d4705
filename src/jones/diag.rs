// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Jones matrix primitives for the diagonal gain model.
//!
//! Gains `G` here only have meaningful `g[0]` and `g[3]` entries; `g[1]` and
//! `g[2]` are assumed to be zero and are never read. Visibilities and
//! Jacobian blocks are full 2x2 matrices. None of these functions branch or
//! allocate, and they are the only place in the crate that the normal
//! equation terms are built from raw complex arithmetic.

use super::Jones;
use crate::c64;

/// `out = G.M`, where `G` is diagonal.
#[inline(always)]
pub fn product_diag(out: &mut Jones, g: &Jones, m: &Jones) {
    out[0] = g[0] * m[0];
    out[1] = g[0] * m[1];
    out[2] = g[3] * m[2];
    out[3] = g[3] * m[3];
}

/// `out = G.M.G^H`, where both `G` and `G^H` are diagonal. `gh` is not
/// derived from `g`; the caller supplies it (e.g. as the conjugate transpose
/// of the gain of the other antenna in a baseline).
#[inline(always)]
pub fn triple_product(out: &mut Jones, g: &Jones, m: &Jones, gh: &Jones) {
    out[0] = g[0] * m[0] * gh[0];
    out[1] = g[0] * m[1] * gh[3];
    out[2] = g[3] * m[2] * gh[0];
    out[3] = g[3] * m[3] * gh[3];
}

/// `out -= G.M.G^H`, where both `G` and `G^H` are diagonal.
#[inline(always)]
pub fn subtract_triple_product(out: &mut Jones, g: &Jones, m: &Jones, gh: &Jones) {
    out[0] -= g[0] * m[0] * gh[0];
    out[1] -= g[0] * m[1] * gh[3];
    out[2] -= g[3] * m[2] * gh[0];
    out[3] -= g[3] * m[3] * gh[3];
}

/// `M = G.M`, where `G` is diagonal.
#[inline(always)]
pub fn in_place_left_scale(g: &Jones, m: &mut Jones) {
    m[0] *= g[0];
    m[1] *= g[0];
    m[2] *= g[3];
    m[3] *= g[3];
}

/// `M = M.G`, where `G` is diagonal.
#[inline(always)]
pub fn in_place_right_scale(m: &mut Jones, g: &Jones) {
    m[0] *= g[0];
    m[1] *= g[3];
    m[2] *= g[0];
    m[3] *= g[3];
}

/// `out += (J^H)^H.J^H`, where `jh` is a Jacobian block J^H. The diagonal
/// of the result is real and non-negative.
#[inline(always)]
pub fn add_conjugate_square(out: &mut Jones, jh: &Jones) {
    out[0] += jh[0].conj() * jh[0] + jh[2].conj() * jh[2];
    out[1] += jh[0].conj() * jh[1] + jh[2].conj() * jh[3];
    out[2] += jh[1].conj() * jh[0] + jh[3].conj() * jh[2];
    out[3] += jh[1].conj() * jh[1] + jh[3].conj() * jh[3];
}

/// `out += R.J^H`, where `jh` is a Jacobian block J^H.
#[inline(always)]
pub fn add_cross_product(out: &mut Jones, r: &Jones, jh: &Jones) {
    out[0] += r[0] * jh[0] + r[1] * jh[2];
    out[1] += r[0] * jh[1] + r[1] * jh[3];
    out[2] += r[2] * jh[0] + r[3] * jh[2];
    out[3] += r[2] * jh[1] + r[3] * jh[3];
}

/// `out = A.B` with the off-diagonal terms of the result forced to zero. With
/// `A = J^H.R` and `B = (J^H.J)^-1`, this is the diagonal-projected gain step.
#[inline(always)]
pub fn update_product(out: &mut Jones, a: &Jones, b: &Jones) {
    out[0] = a[0] * b[0] + a[1] * b[2];
    out[1] = c64::new(0.0, 0.0);
    out[2] = c64::new(0.0, 0.0);
    out[3] = a[2] * b[1] + a[3] * b[3];
}
