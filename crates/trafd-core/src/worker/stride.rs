//! Round-robin stride assignment of list indices to workers.

/// Endless index sequence for one worker: `id, id+W, id+2W, ...` modulo `len`.
///
/// Across workers `0..W`, taking assignments round by round in worker order
/// visits every index exactly once per `len` assignments, with no shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideCursor {
    index: usize,
    stride: usize,
    len: usize,
}

impl StrideCursor {
    pub fn new(worker_id: usize, workers: usize, len: usize) -> Self {
        let len = len.max(1);
        Self {
            index: worker_id % len,
            stride: workers % len,
            len,
        }
    }

    /// Index to fetch now; advances to the next round.
    pub fn next_index(&mut self) -> usize {
        let current = self.index;
        self.index = (self.index + self.stride) % self.len;
        current
    }
}

impl Iterator for StrideCursor {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        Some(self.next_index())
    }
}
