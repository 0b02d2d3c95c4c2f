//! Free space accounting for the control store: an ordered chain of
//! disjoint free regions, consumed interval by interval as blocks are
//! placed.

use crate::error::AllocateError;

/// A maximal run of unallocated words, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeChunk {
    pub start: usize,
    pub end: usize,
}

impl FreeChunk {
    fn size(&self) -> usize {
        self.end - self.start + 1
    }

    fn contains(&self, start: usize, end: usize) -> bool {
        start <= end && self.start <= start && end <= self.end
    }
}

/// Ordered chain of free chunks: strictly increasing, pairwise disjoint.
#[derive(Debug)]
pub struct FreeChunkChain {
    chunks: Vec<FreeChunk>,
}

impl FreeChunkChain {
    pub fn new(words: usize) -> Self {
        FreeChunkChain {
            chunks: vec![FreeChunk {
                start: 0,
                end: words - 1,
            }],
        }
    }

    /// Marks `[start, end]` as allocated. The region must lie entirely
    /// inside a single free chunk; anything else means two allocations
    /// overlap.
    pub fn reclaim(&mut self, start: usize, end: usize) -> Result<(), AllocateError> {
        let index = self
            .chunks
            .iter()
            .position(|c| c.contains(start, end))
            .ok_or(AllocateError::RegionConflict(start, end))?;

        let chunk = self.chunks[index];
        if chunk.start == start && chunk.end == end {
            self.chunks.remove(index);
        } else if chunk.start == start {
            self.chunks[index].start = end + 1;
        } else if chunk.end == end {
            self.chunks[index].end = start - 1;
        } else {
            self.chunks[index].end = start - 1;
            self.chunks.insert(
                index + 1,
                FreeChunk {
                    start: end + 1,
                    end: chunk.end,
                },
            );
        }
        Ok(())
    }

    /// Start of the first chunk that can host `size` words.
    pub fn first_chunk_ge(&self, size: usize) -> Option<usize> {
        self.chunks.iter().find(|c| c.size() >= size).map(|c| c.start)
    }

    /// Starts of two free regions of `size1` and `size2` words whose
    /// distance is exactly `displacement`, the first at the lower address.
    ///
    /// For a candidate first chunk, the second region can only begin in
    /// the window `[first.start + d, first.start + size1 - 1 + d]`; a
    /// second chunk behind the window is skipped, one past it ends the
    /// candidate. When a fit exists the pair is normalized to the lowest
    /// feasible addresses.
    pub fn displaced_pair(
        &self,
        size1: usize,
        size2: usize,
        displacement: usize,
    ) -> Option<(usize, usize)> {
        for first in self.chunks.iter().filter(|c| c.size() >= size1) {
            let window_lower = first.start + displacement;
            let window_upper = first.start + size1 - 1 + displacement;

            for second in &self.chunks {
                if second.end < window_lower {
                    continue;
                }
                if second.start > window_upper {
                    break;
                }
                for i in window_lower..=window_upper {
                    if second.contains(i, i + size2 - 1) {
                        return Some(if second.start > window_lower {
                            (second.start - displacement, second.start)
                        } else if second.start < window_lower {
                            (first.start, window_lower)
                        } else {
                            (first.start, second.start)
                        });
                    }
                }
            }
        }
        None
    }

    #[cfg(test)]
    fn chunks(&self) -> &[FreeChunk] {
        &self.chunks
    }
}
