use derive_getters::{Dissolve, Getters};
use derive_more::{Constructor, Display, Error};
use std::ops::Range;

/// The number of chunks must be at least one.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("cannot partition {items} sequences into {chunks} chunks")]
pub struct PartitionError {
    pub items: usize,
    pub chunks: usize,
}

/// One contiguous piece of the extracted read set, assigned to counting tasks as a unit.
/// Chunks never overlap and concatenating them in index order restores the original read order.
#[derive(Debug, Clone, Constructor, Dissolve, Getters)]
pub struct Chunk<'a> {
    index: usize,
    sequences: &'a [Vec<u8>],
}

/// Split `items` elements into `chunks` contiguous index ranges. Ranges cover every element
/// exactly once, in order, and their sizes differ by at most one (leading ranges take the
/// remainder). Deterministic: the same input always yields the same partition.
pub fn partition(items: usize, chunks: usize) -> Result<Vec<Range<usize>>, PartitionError> {
    if chunks == 0 {
        return Err(PartitionError { items, chunks });
    }

    let base = items / chunks;
    let extra = items % chunks;

    let mut ranges = Vec::with_capacity(chunks);
    let mut start = 0;
    for ind in 0..chunks {
        let size = base + usize::from(ind < extra);
        ranges.push(start..start + size);
        start += size;
    }
    debug_assert_eq!(start, items);

    Ok(ranges)
}
