//! # Hardware Slot Pool
//!
//! Owns the fixed universe of hardware slot numbers. Every slot is either
//! free (held here) or assigned to exactly one depth entry; nothing else
//! in the pool invents slot numbers.

/// Free set of hardware slot identifiers.
///
/// LIFO: the last slot released is the first one reused. Hand-out order
/// only affects slot numbering, never correctness - the depth list realigns
/// numbering to depth order either way.
#[derive(Debug)]
pub struct SlotPool {
    /// Free slot numbers; pre-seeded so slot 0 is handed out first.
    free: Vec<u8>,
    /// Total slot universe.
    capacity: usize,
}

impl SlotPool {
    /// Creates a pool owning slots `0..capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or exceeds what a `u8` slot id can
    /// address (256).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "slot capacity must be greater than zero");
        assert!(capacity <= 256, "slot ids are u8; capacity cannot exceed 256");

        #[allow(clippy::cast_possible_truncation)]
        let free: Vec<u8> = (0..capacity).rev().map(|slot| slot as u8).collect();

        Self { free, capacity }
    }

    /// Returns the total slot universe size.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns how many slots are currently free.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Removes and returns a free slot, or `None` if all are assigned.
    #[inline]
    pub fn acquire(&mut self) -> Option<u8> {
        self.free.pop()
    }

    /// Returns a slot to the free set.
    ///
    /// The caller must only release slots it previously acquired; releasing
    /// a slot twice is a defect.
    pub fn release(&mut self, slot: u8) {
        debug_assert!(
            (slot as usize) < self.capacity,
            "released slot {slot} outside the universe"
        );
        debug_assert!(
            !self.free.contains(&slot),
            "hardware slot {slot} released twice"
        );
        self.free.push(slot);
    }

    /// Checks whether a slot is currently in the free set.
    ///
    /// Linear scan; only the invariant checker calls this.
    #[must_use]
    pub fn contains_free(&self, slot: u8) -> bool {
        self.free.contains(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_exhausts_universe() {
        let mut slots = SlotPool::new(4);
        assert_eq!(slots.acquire(), Some(0));
        assert_eq!(slots.acquire(), Some(1));
        assert_eq!(slots.acquire(), Some(2));
        assert_eq!(slots.acquire(), Some(3));
        assert_eq!(slots.acquire(), None);
        assert_eq!(slots.free_count(), 0);
    }

    #[test]
    fn test_release_is_lifo() {
        let mut slots = SlotPool::new(4);
        let first = slots.acquire().unwrap();
        let second = slots.acquire().unwrap();

        slots.release(first);
        slots.release(second);

        // Last released is first reused.
        assert_eq!(slots.acquire(), Some(second));
        assert_eq!(slots.acquire(), Some(first));
    }

    #[test]
    fn test_full_universe_capacity() {
        let mut slots = SlotPool::new(256);
        let mut seen = [false; 256];
        while let Some(slot) = slots.acquire() {
            assert!(!seen[slot as usize]);
            seen[slot as usize] = true;
        }
        assert!(seen.iter().all(|taken| *taken));
    }
}
