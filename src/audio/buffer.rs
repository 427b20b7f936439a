//! Fixed-capacity circular (ring) buffer.
//!
//! When the buffer is full, new entries **overwrite** the oldest data so that
//! the most-recent `capacity` entries are always available.  The live level
//! meter uses this to keep a bounded recent-history window: the display shows
//! the tail of the recording, never an unbounded list.
//!
//! # Example
//!
//! ```rust
//! use voice_journal::audio::RingBuffer;
//!
//! let mut buf = RingBuffer::new(4);
//! buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]); // 5 items → capacity 4 → oldest dropped
//! assert_eq!(buf.snapshot(), vec![2.0, 3.0, 4.0, 5.0]);
//! ```

// ---------------------------------------------------------------------------
// RingBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity circular buffer.
///
/// Generic over `T: Copy + Default` so it can store any `Copy` scalar, though
/// the capture path uses `RingBuffer<f32>` exclusively.
///
/// ## Overflow behaviour
///
/// When [`push`](Self::push) or [`push_slice`](Self::push_slice) would exceed
/// `capacity`, the oldest entries are silently overwritten.  The buffer never
/// allocates beyond its initial capacity.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    /// Index of the *next* write position (wraps around `capacity`).
    write_pos: usize,
    /// Number of valid entries currently stored (≤ `capacity`).
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            write_pos: 0,
            len: 0,
        }
    }

    /// Append a single entry, overwriting the oldest when full.
    pub fn push(&mut self, item: T) {
        self.buf[self.write_pos] = item;
        self.write_pos = (self.write_pos + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// Append `data` to the buffer.
    ///
    /// If the total number of entries exceeds `capacity`, the oldest entries
    /// are overwritten (circular behaviour).
    pub fn push_slice(&mut self, data: &[T]) {
        for &item in data {
            self.push(item);
        }
    }

    /// Copy all stored entries in chronological order without consuming them.
    ///
    /// The level meter is polled repeatedly while recording is active, so the
    /// reader must not reset the window.
    pub fn snapshot(&self) -> Vec<T> {
        if self.len == 0 {
            return Vec::new();
        }

        // When the buffer has never been fully filled, valid data starts at 0.
        // When the buffer is full (overflow has occurred), the oldest entry
        // sits at `write_pos` (the position the *next* write would go to).
        let read_pos = if self.len < self.capacity {
            0
        } else {
            self.write_pos
        };

        let mut result = Vec::with_capacity(self.len);
        for i in 0..self.len {
            result.push(self.buf[(read_pos + i) % self.capacity]);
        }
        result
    }

    /// Drain all stored entries in chronological order and reset the buffer.
    ///
    /// After this call `len() == 0`.
    pub fn drain(&mut self) -> Vec<T> {
        let result = self.snapshot();
        self.clear();
        result
    }

    /// Discard all entries and reset the write position.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Number of valid entries currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of entries the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` when the buffer has been filled to capacity at least
    /// once (i.e. overflow would occur on the next push).
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
