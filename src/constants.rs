// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

/// When the magnitude of a J^H.J entry (or determinant, for the full inverse)
/// is at or below this value, its inverse is taken to be zero and the
/// corresponding gain receives a null update.
pub const DEFAULT_INVERSE_FLOOR: f64 = 1e-12;

/// The default damping factor for a gain update. Half a step is the same as
/// averaging the previous gains with the least-squares solution, as per
/// Stefcal.
pub const DEFAULT_STEP_SIZE: f64 = 0.5;
