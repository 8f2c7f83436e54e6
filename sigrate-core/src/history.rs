//! Bounded history over an unbounded sample stream.
//!
//! [`HistoryBuffer`] keeps the most recent `capacity` elements of an
//! append-only stream and addresses them by their global position. Two access
//! tiers are provided:
//!
//! - [`HistoryBuffer::read`] and `Index<i64>` mask the index without checking
//!   the window. They are the hot path for kernels that already know their
//!   indices are live.
//! - [`HistoryBuffer::write`], [`HistoryBuffer::get`] and
//!   [`HistoryBuffer::try_read`] check the window and reject stale indices.

use crate::error::{CoreError, Result};
use crate::math::greater_power_of_two;
use std::ops::Index;

/// Append-only ring buffer with random access by global index.
///
/// The capacity is rounded up to a power of two so that reducing a global
/// index to a slot is a bitwise AND. Before the first `capacity` pushes the
/// slots at negative global indices hold the fill value, so a new buffer
/// reads as a stream preceded by `capacity` copies of it.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    buf: Vec<T>,
    mask: u64,
    pushed: u64,
}

impl<T: Clone> HistoryBuffer<T> {
    /// Create a buffer holding at least `requested` elements, every slot
    /// initialised to `fill`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the rounded capacity overflows `usize`.
    pub fn new(requested: usize, fill: T) -> Result<Self> {
        let capacity = greater_power_of_two(requested).ok_or_else(|| {
            CoreError::invalid_input(format!("history capacity {} too large", requested))
        })?;
        Ok(Self {
            buf: vec![fill; capacity],
            mask: capacity as u64 - 1,
            pushed: 0,
        })
    }
}

impl<T> HistoryBuffer<T> {
    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Append `elem` as the most recent element.
    #[inline]
    pub fn push(&mut self, elem: T) {
        let slot = self.slot(self.pushed as i64);
        self.buf[slot] = elem;
        self.pushed += 1;
    }

    /// Total number of elements ever pushed.
    #[inline]
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Number of pushed elements still retained, `min(pushed, capacity)`.
    #[inline]
    pub fn len(&self) -> usize {
        self.pushed.min(self.buf.len() as u64) as usize
    }

    /// True if nothing has been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pushed == 0
    }

    /// Largest valid global index, `pushed - 1`.
    #[inline]
    pub fn max_index(&self) -> i64 {
        self.pushed as i64 - 1
    }

    /// Smallest valid global index, `pushed - capacity`.
    #[inline]
    pub fn min_index(&self) -> i64 {
        self.pushed as i64 - self.buf.len() as i64
    }

    /// True if `n` lies in `[min_index(), max_index()]`.
    #[inline]
    pub fn contains(&self, n: i64) -> bool {
        n >= self.min_index() && n <= self.max_index()
    }

    /// Element at global index `n`, without a window check.
    ///
    /// `n` must lie in `[min_index(), max_index()]`. Any other index aliases
    /// a live slot and the returned element is meaningless.
    #[inline]
    pub fn read(&self, n: i64) -> &T {
        &self.buf[self.slot(n)]
    }

    /// Element at global index `n`, or `None` outside the window.
    #[inline]
    pub fn get(&self, n: i64) -> Option<&T> {
        if self.contains(n) {
            Some(self.read(n))
        } else {
            None
        }
    }

    /// Element at global index `n`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` outside the window.
    pub fn try_read(&self, n: i64) -> Result<&T> {
        self.get(n).ok_or_else(|| self.out_of_range(n))
    }

    /// Overwrite the element at global index `n`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` outside the window; the buffer is unchanged.
    pub fn write(&mut self, n: i64, v: T) -> Result<()> {
        if !self.contains(n) {
            return Err(self.out_of_range(n));
        }
        let slot = self.slot(n);
        self.buf[slot] = v;
        Ok(())
    }

    /// Retained elements from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let newest = self.max_index();
        (newest + 1 - self.len() as i64..=newest).map(move |n| self.read(n))
    }

    #[inline]
    fn slot(&self, n: i64) -> usize {
        (n as u64 & self.mask) as usize
    }

    fn out_of_range(&self, n: i64) -> CoreError {
        CoreError::OutOfRange {
            index: n,
            min: self.min_index(),
            max: self.max_index(),
        }
    }
}

impl<T> Index<i64> for HistoryBuffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, n: i64) -> &T {
        self.read(n)
    }
}
