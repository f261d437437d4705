// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Code for general Jones matrix math.

It's not ideal to use LAPACK for matrix multiplies or inverses, because it is
not possible to optimise only for 2x2 matrices. Here, we supply the math for
these special cases. The [diag] module holds the primitives specialised for
gains without off-diagonal (leakage) terms.

Parts of the code are derived from Torrance Hodgson's MWAjl:
https://github.com/torrance/MWAjl/blob/master/src/matrix2x2.jl
 */

pub mod diag;
#[cfg(test)]
mod tests;

use static_assertions::const_assert_eq;

use crate::c64;

/// A 2x2 complex matrix, stored as `[m00, m01, m10, m11]`.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
#[repr(transparent)]
pub struct Jones([c64; 4]);

// Buffers handed to us are four contiguous complex scalars per matrix.
const_assert_eq!(std::mem::size_of::<Jones>(), 4 * std::mem::size_of::<c64>());

const JONES_ZERO: Jones = Jones([c64::new(0.0, 0.0); 4]);

const JONES_IDENTITY: Jones = Jones([
    c64::new(1.0, 0.0),
    c64::new(0.0, 0.0),
    c64::new(0.0, 0.0),
    c64::new(1.0, 0.0),
]);

impl Jones {
    pub const fn identity() -> Self {
        JONES_IDENTITY
    }

    pub const fn zero() -> Self {
        JONES_ZERO
    }

    pub const fn nan() -> Self {
        Jones([c64::new(f64::NAN, f64::NAN); 4])
    }

    /// A diagonal Jones matrix; the off-diagonal terms are zero.
    #[inline(always)]
    pub const fn from_diag(xx: c64, yy: c64) -> Self {
        Jones([xx, c64::new(0.0, 0.0), c64::new(0.0, 0.0), yy])
    }

    /// From an input Jones matrix, get a copy that has been Hermitian
    /// conjugated (J^H).
    ///
    /// # Examples
    ///
    /// ```
    /// # use hyperdrive_gainsolve::{c64, Jones};
    /// let j = Jones::from([
    ///     c64::new(1.0, 2.0),
    ///     c64::new(3.0, 4.0),
    ///     c64::new(5.0, 6.0),
    ///     c64::new(7.0, 8.0),
    /// ]);
    /// let expected = Jones::from([
    ///     c64::new(1.0, -2.0),
    ///     c64::new(5.0, -6.0),
    ///     c64::new(3.0, -4.0),
    ///     c64::new(7.0, -8.0),
    /// ]);
    /// assert_eq!(j.h(), expected);
    /// ```
    #[inline(always)]
    pub fn h(&self) -> Self {
        Self([
            self[0].conj(),
            self[2].conj(),
            self[1].conj(),
            self[3].conj(),
        ])
    }

    /// Multiply by a Jones matrix which gets Hermitian conjugated (A.B^H).
    #[inline(always)]
    pub fn mul_hermitian(&self, b: &Self) -> Self {
        *self * b.h()
    }

    /// The sum of the squared magnitudes of all elements (the squared
    /// Frobenius norm).
    #[inline]
    pub fn norm_sqr(&self) -> f64 {
        self.iter().map(|e| e.norm_sqr()).sum()
    }

    /// Are the off-diagonal terms exactly zero?
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        self[1] == c64::new(0.0, 0.0) && self[2] == c64::new(0.0, 0.0)
    }

    pub fn any_nan(&self) -> bool {
        self.iter().any(|e| e.is_nan())
    }
}

impl std::ops::Deref for Jones {
    type Target = [c64; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Jones {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<[c64; 4]> for Jones {
    fn from(arr: [c64; 4]) -> Self {
        Self(arr)
    }
}

impl From<Jones> for [c64; 4] {
    fn from(j: Jones) -> Self {
        j.0
    }
}

impl std::ops::Add<Jones> for Jones {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Jones) -> Self {
        let a = self.0;
        let b = rhs.0;
        Jones([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]])
    }
}

impl std::ops::AddAssign<Jones> for Jones {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Jones) {
        self[0] += rhs[0];
        self[1] += rhs[1];
        self[2] += rhs[2];
        self[3] += rhs[3];
    }
}

impl std::ops::Sub<Jones> for Jones {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Jones) -> Self {
        let a = self.0;
        let b = rhs.0;
        Jones([a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]])
    }
}

impl std::ops::SubAssign<Jones> for Jones {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Jones) {
        self[0] -= rhs[0];
        self[1] -= rhs[1];
        self[2] -= rhs[2];
        self[3] -= rhs[3];
    }
}

impl std::ops::Neg for Jones {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Jones([-self[0], -self[1], -self[2], -self[3]])
    }
}

impl std::ops::Mul<Jones> for Jones {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Jones) -> Self {
        let a = self.0;
        let b = rhs.0;
        Jones([
            a[0] * b[0] + a[1] * b[2],
            a[0] * b[1] + a[1] * b[3],
            a[2] * b[0] + a[3] * b[2],
            a[2] * b[1] + a[3] * b[3],
        ])
    }
}

impl std::ops::Mul<&Jones> for Jones {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: &Jones) -> Self {
        self * *rhs
    }
}

impl std::ops::MulAssign<Jones> for Jones {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Jones) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<f64> for Jones {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self {
        let mut a = self.0;
        a[0] *= rhs;
        a[1] *= rhs;
        a[2] *= rhs;
        a[3] *= rhs;
        Jones(a)
    }
}

impl std::ops::MulAssign<f64> for Jones {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: f64) {
        self[0] *= rhs;
        self[1] *= rhs;
        self[2] *= rhs;
        self[3] *= rhs;
    }
}

impl std::ops::Mul<c64> for Jones {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: c64) -> Self {
        let mut a = self.0;
        a[0] *= rhs;
        a[1] *= rhs;
        a[2] *= rhs;
        a[3] *= rhs;
        Jones(a)
    }
}

impl num_traits::Zero for Jones {
    #[inline]
    fn zero() -> Self {
        Jones::zero()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Jones::zero()
    }
}

#[cfg(test)]
impl approx::AbsDiffEq for Jones {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    #[inline]
    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self[0] - other[0]).norm() <= epsilon
            && (self[1] - other[1]).norm() <= epsilon
            && (self[2] - other[2]).norm() <= epsilon
            && (self[3] - other[3]).norm() <= epsilon
    }
}
