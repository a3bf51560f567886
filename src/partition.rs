//! Row partitioning for the distributed run
//!
//! The left operand's rows are split into contiguous, near-equal blocks, one
//! per rank. Every rank computes the same partition table independently from
//! the broadcast metadata, so no extra communication is needed to agree on
//! who owns which rows.

/// A contiguous range of rows `[start, end)` assigned to one rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    /// First row of the range (inclusive)
    pub start: usize,
    /// Last row of the range (exclusive)
    pub end: usize,
}

impl RowRange {
    /// Number of rows in the range
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the range contains no rows
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits `total_rows` rows across `worker_count` ranks
///
/// Rank `r` receives `total_rows / worker_count` rows, plus one extra row if
/// `r < total_rows % worker_count`: the remainder goes to the lowest ranks.
/// Ranges are contiguous, ordered by rank, and cover `[0, total_rows)`
/// exactly once.
///
/// # Panics
///
/// Panics if `worker_count` is zero.
pub fn partition_rows(total_rows: usize, worker_count: usize) -> Vec<RowRange> {
    assert!(worker_count > 0, "worker_count must be at least 1");

    let base = total_rows / worker_count;
    let remainder = total_rows % worker_count;

    let mut ranges = Vec::with_capacity(worker_count);
    let mut start = 0;
    for r in 0..worker_count {
        let len = base + usize::from(r < remainder);
        ranges.push(RowRange { start, end: start + len });
        start += len;
    }

    ranges
}
