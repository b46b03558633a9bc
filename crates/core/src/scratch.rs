//! Call-scoped scratch arena for variable-length driver outputs.
//!
//! GL string queries write into a caller-supplied buffer. Rather than
//! allocating a fresh `Vec` for every name, the observer owns one `Scratch`
//! that is borrowed for the duration of a single extraction and grows only
//! when a larger buffer is needed.

/// A reusable byte arena. Slices handed out by [`Scratch::alloc`] borrow the
/// arena mutably, so they cannot outlive the call that requested them.
#[derive(Debug, Default)]
pub struct Scratch {
    buf: Vec<u8>,
    high_water_mark: usize,
}

impl Scratch {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arena with `capacity` bytes reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            high_water_mark: 0,
        }
    }

    /// Returns a zero-filled slice of exactly `len` bytes.
    ///
    /// The backing storage grows when `len` exceeds the current capacity and
    /// never shrinks.
    pub fn alloc(&mut self, len: usize) -> &mut [u8] {
        self.buf.clear();
        self.buf.resize(len, 0);
        self.high_water_mark = self.high_water_mark.max(len);
        &mut self.buf[..]
    }

    /// Bytes currently reserved by the arena.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Largest length ever passed to [`Scratch::alloc`].
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Drops the contents of the last allocation, keeping the storage.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_requested_length() {
        let mut scratch = Scratch::new();
        assert_eq!(scratch.alloc(17).len(), 17);
        assert_eq!(scratch.alloc(0).len(), 0);
    }

    #[test]
    fn alloc_zeroes_previous_contents() {
        let mut scratch = Scratch::new();
        scratch.alloc(8).copy_from_slice(b"abcdefgh");
        let again = scratch.alloc(8);
        assert!(again.iter().all(|&b| b == 0), "stale bytes: {again:?}");
    }

    #[test]
    fn with_capacity_reserves_storage() {
        let scratch = Scratch::with_capacity(128);
        assert!(scratch.capacity() >= 128);
        assert_eq!(scratch.high_water_mark(), 0);
    }

    #[test]
    fn smaller_alloc_keeps_capacity() {
        let mut scratch = Scratch::new();
        scratch.alloc(1024);
        let cap = scratch.capacity();
        scratch.alloc(4);
        assert_eq!(scratch.capacity(), cap);
        assert_eq!(scratch.high_water_mark(), 1024);
    }

    #[test]
    fn reset_keeps_storage() {
        let mut scratch = Scratch::new();
        scratch.alloc(64);
        scratch.reset();
        assert!(scratch.capacity() >= 64);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn capacity_never_shrinks(lens in proptest::collection::vec(0_usize..4096, 1..32)) {
                let mut scratch = Scratch::new();
                let mut last_cap = 0;
                for len in lens {
                    let slice = scratch.alloc(len);
                    prop_assert_eq!(slice.len(), len);
                    prop_assert!(scratch.capacity() >= last_cap);
                    last_cap = scratch.capacity();
                }
            }
        }
    }
}
