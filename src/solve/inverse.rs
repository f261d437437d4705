// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Regularised inverses of accumulated J^H.J matrices.
//!
//! Antennas or intervals without enough data have (near-)singular J^H.J.
//! Rather than producing NaNs or aborting a sweep, the inverse of anything at
//! or below the numerical floor is zero, which leads to a null gain update.

use crate::{c64, Jones};

/// Get the inverse of a full 2x2 matrix. If the magnitude of the determinant
/// is at or below `floor`, the result is the zero matrix.
#[inline]
pub fn matrix_inverse(a: &Jones, floor: f64) -> Jones {
    let det = a[0] * a[3] - a[1] * a[2];
    if det.norm() <= floor {
        return Jones::zero();
    }
    let inv_det = det.inv();
    Jones::from([
        a[3] * inv_det,
        -a[1] * inv_det,
        -a[2] * inv_det,
        a[0] * inv_det,
    ])
}

/// Get the inverse of the diagonal of a 2x2 matrix; the off-diagonal terms of
/// the input are ignored and those of the output are zero. Each diagonal
/// entry whose magnitude is at or below `floor` has an inverse of zero,
/// independently of the other.
#[inline]
pub fn diagonal_inverse(a: &Jones, floor: f64) -> Jones {
    let inv = |x: c64| {
        if x.norm() <= floor {
            c64::new(0.0, 0.0)
        } else {
            x.inv()
        }
    };
    Jones::from_diag(inv(a[0]), inv(a[3]))
}
