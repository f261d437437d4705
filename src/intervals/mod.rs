// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Solution intervals.
//!
//! A gain is solved for a block of timesteps and channels at once. Every
//! timestep belongs to exactly one [`Timeblock`] and every channel to exactly
//! one [`Chanblock`]; the samples of a block need not be contiguous.

mod error;
#[cfg(test)]
mod tests;

pub use error::IntervalError;

use vec1::Vec1;

/// A collection of timesteps sharing one gain solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeblock {
    /// The timeblock index.
    pub index: usize,

    /// The indices into the time axis of the visibilities that belong to
    /// this timeblock. Ascendingly sorted and never empty.
    pub timesteps: Vec1<usize>,
}

/// A collection of frequency channels sharing one gain solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chanblock {
    /// The chanblock index.
    pub index: usize,

    /// The indices into the frequency axis of the visibilities that belong to
    /// this chanblock. Ascendingly sorted and never empty.
    pub chans: Vec1<usize>,
}

/// The mapping of every time and frequency sample to its solution interval.
#[derive(Debug, Clone)]
pub struct SolutionIntervals {
    timestep_to_timeblock: Vec1<usize>,
    chan_to_chanblock: Vec1<usize>,
    pub(crate) timeblocks: Vec1<Timeblock>,
    pub(crate) chanblocks: Vec1<Chanblock>,
}

impl SolutionIntervals {
    /// Create solution intervals from explicit maps. `timestep_to_timeblock[t]`
    /// is the timeblock of timestep `t`, and similarly for channels. Every
    /// block index up to the largest one used must have at least one sample.
    pub fn new(
        timestep_to_timeblock: Vec<usize>,
        chan_to_chanblock: Vec<usize>,
    ) -> Result<SolutionIntervals, IntervalError> {
        let timestep_to_timeblock = Vec1::try_from_vec(timestep_to_timeblock)
            .map_err(|_| IntervalError::NoSamples { what: "timesteps" })?;
        let chan_to_chanblock = Vec1::try_from_vec(chan_to_chanblock)
            .map_err(|_| IntervalError::NoSamples { what: "channels" })?;

        let timeblocks = group(&timestep_to_timeblock, "Timeblock")?
            .mapped(|(index, timesteps)| Timeblock { index, timesteps });
        let chanblocks = group(&chan_to_chanblock, "Chanblock")?
            .mapped(|(index, chans)| Chanblock { index, chans });

        Ok(SolutionIntervals {
            timestep_to_timeblock,
            chan_to_chanblock,
            timeblocks,
            chanblocks,
        })
    }

    /// Create solution intervals by grouping every `time_interval` timesteps
    /// into a timeblock and every `freq_interval` channels into a chanblock.
    /// The last block along each axis may be short.
    ///
    /// e.g. 10 timesteps with a time interval of 3 gives the timeblocks
    ///
    /// [[0, 1, 2], [3, 4, 5], [6, 7, 8], [9]]
    pub fn from_interval_sizes(
        num_timesteps: usize,
        time_interval: usize,
        num_chans: usize,
        freq_interval: usize,
    ) -> Result<SolutionIntervals, IntervalError> {
        if time_interval == 0 {
            return Err(IntervalError::ZeroIntervalSize { what: "time" });
        }
        if freq_interval == 0 {
            return Err(IntervalError::ZeroIntervalSize { what: "frequency" });
        }
        Self::new(
            (0..num_timesteps).map(|t| t / time_interval).collect(),
            (0..num_chans).map(|f| f / freq_interval).collect(),
        )
    }

    pub fn num_timesteps(&self) -> usize {
        self.timestep_to_timeblock.len()
    }

    pub fn num_chans(&self) -> usize {
        self.chan_to_chanblock.len()
    }

    pub fn num_timeblocks(&self) -> usize {
        self.timeblocks.len()
    }

    pub fn num_chanblocks(&self) -> usize {
        self.chanblocks.len()
    }

    /// The timeblock index of a timestep.
    ///
    /// # Panics
    ///
    /// Panics if `timestep` is out of range.
    #[inline]
    pub fn timeblock_of(&self, timestep: usize) -> usize {
        self.timestep_to_timeblock[timestep]
    }

    /// The chanblock index of a channel.
    ///
    /// # Panics
    ///
    /// Panics if `chan` is out of range.
    #[inline]
    pub fn chanblock_of(&self, chan: usize) -> usize {
        self.chan_to_chanblock[chan]
    }

    pub fn timeblocks(&self) -> &[Timeblock] {
        &self.timeblocks
    }

    pub fn chanblocks(&self) -> &[Chanblock] {
        &self.chanblocks
    }
}

/// Invert a sample-to-block map into the (sorted) samples of each block.
fn group(
    sample_to_block: &Vec1<usize>,
    what: &'static str,
) -> Result<Vec1<(usize, Vec1<usize>)>, IntervalError> {
    let num_samples = sample_to_block.len();
    let max_block = sample_to_block.iter().copied().max().unwrap_or_default();
    if max_block >= num_samples {
        // There are more blocks than samples, so at least one block below
        // `num_samples` is empty. Find it without allocating per block.
        let mut used = vec![false; num_samples];
        for &block in sample_to_block.iter().filter(|&&b| b < num_samples) {
            used[block] = true;
        }
        let index = used.iter().position(|&u| !u).unwrap_or(num_samples);
        return Err(IntervalError::EmptyInterval { what, index });
    }

    let mut samples = vec![vec![]; max_block + 1];
    for (i_sample, &block) in sample_to_block.iter().enumerate() {
        samples[block].push(i_sample);
    }

    let groups = samples
        .into_iter()
        .enumerate()
        .map(|(index, samples)| {
            Vec1::try_from_vec(samples)
                .map(|samples| (index, samples))
                .map_err(|_| IntervalError::EmptyInterval { what, index })
        })
        .collect::<Result<Vec<_>, _>>()?;
    // There's at least one sample, so there's at least one block.
    Vec1::try_from_vec(groups).map_err(|_| IntervalError::NoSamples { what })
}
