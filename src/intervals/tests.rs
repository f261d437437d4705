// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use vec1::vec1;

use super::*;

#[test]
fn test_from_interval_sizes() {
    let intervals = SolutionIntervals::from_interval_sizes(10, 3, 4, 2).unwrap();
    assert_eq!(intervals.num_timesteps(), 10);
    assert_eq!(intervals.num_chans(), 4);
    assert_eq!(intervals.num_timeblocks(), 4);
    assert_eq!(intervals.num_chanblocks(), 2);

    for (timeblock, expected) in intervals
        .timeblocks()
        .iter()
        .zip([vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8], vec![9]])
    {
        assert_eq!(timeblock.timesteps.as_slice(), expected.as_slice());
    }
    assert_eq!(intervals.chanblocks()[1].chans, vec1![2, 3]);

    assert_eq!(intervals.timeblock_of(0), 0);
    assert_eq!(intervals.timeblock_of(5), 1);
    assert_eq!(intervals.timeblock_of(9), 3);
    assert_eq!(intervals.chanblock_of(1), 0);
    assert_eq!(intervals.chanblock_of(2), 1);
}

#[test]
fn test_interval_larger_than_axis() {
    let intervals = SolutionIntervals::from_interval_sizes(3, 100, 5, 100).unwrap();
    assert_eq!(intervals.num_timeblocks(), 1);
    assert_eq!(intervals.num_chanblocks(), 1);
    assert_eq!(intervals.timeblocks()[0].timesteps, vec1![0, 1, 2]);
}

#[test]
fn test_non_contiguous_blocks() {
    // Interleaved timesteps are fine; the samples of a block need not be
    // contiguous.
    let intervals = SolutionIntervals::new(vec![0, 1, 0, 1], vec![0]).unwrap();
    assert_eq!(intervals.timeblocks()[0].timesteps, vec1![0, 2]);
    assert_eq!(intervals.timeblocks()[1].timesteps, vec1![1, 3]);
    assert_eq!(intervals.timeblocks()[1].index, 1);
}

#[test]
fn test_empty_interval_is_rejected() {
    let result = SolutionIntervals::new(vec![0, 0, 2], vec![0]);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::EmptyInterval {
            what: "Timeblock",
            index: 1
        }
    );
}

#[test]
fn test_no_samples_is_rejected() {
    let result = SolutionIntervals::new(vec![], vec![0]);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::NoSamples { what: "timesteps" }
    );

    let result = SolutionIntervals::from_interval_sizes(4, 1, 0, 1);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::NoSamples { what: "channels" }
    );
}

#[test]
fn test_zero_interval_size_is_rejected() {
    let result = SolutionIntervals::from_interval_sizes(4, 0, 4, 1);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::ZeroIntervalSize { what: "time" }
    );
    let result = SolutionIntervals::from_interval_sizes(4, 1, 4, 0);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::ZeroIntervalSize { what: "frequency" }
    );
}

#[test]
fn test_huge_interval_index_is_rejected() {
    let result = SolutionIntervals::new(vec![0, usize::MAX], vec![0]);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::EmptyInterval {
            what: "Timeblock",
            index: 1
        }
    );

    let result = SolutionIntervals::new(vec![0], vec![1 << 40, 0, 1]);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::EmptyInterval {
            what: "Chanblock",
            index: 2
        }
    );

    // Every used index can be out of range.
    let result = SolutionIntervals::new(vec![5, 7], vec![0]);
    assert_eq!(
        result.unwrap_err(),
        IntervalError::EmptyInterval {
            what: "Timeblock",
            index: 0
        }
    );
}
