// Double-hashing probe sequence.
//
// The start index is `digest mod capacity` and every step advances by
// `1 + digest mod (capacity - 2)`, both derived once from the original
// digest. With a prime capacity the step is coprime with it, so the
// sequence visits each slot exactly once over `capacity` steps.
pub(crate) struct Probe {
    index: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl Probe {
    #[inline]
    pub(crate) fn start(digest: u64, capacity: usize) -> Probe {
        debug_assert!(capacity >= 3, "capacity too small for double hashing");
        let cap = capacity as u64;
        Probe {
            index: (digest % cap) as usize,
            step: 1 + (digest % (cap - 2)) as usize,
            capacity,
            remaining: capacity,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let i = self.index;
        // (index + step) mod capacity, without forming the sum.
        let gap = self.capacity - self.step;
        self.index = if self.index >= gap {
            self.index - gap
        } else {
            self.index + self.step
        };
        Some(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Probe {}
