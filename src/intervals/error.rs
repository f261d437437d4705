// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntervalError {
    #[error("No {what} were supplied; at least one is required")]
    NoSamples { what: &'static str },

    #[error("The {what} interval size was 0; this is not permitted")]
    ZeroIntervalSize { what: &'static str },

    #[error("{what} {index} has no samples assigned to it")]
    EmptyInterval { what: &'static str, index: usize },
}
