//! Slide identifier allocation.

use super::error::{BuildError, Result};

/// First id PowerPoint accepts for a slide.
pub const FIRST_SLIDE_ID: u32 = 256;

/// Largest valid slide id (`2^31 - 1`).
pub const MAX_SLIDE_ID: u32 = i32::MAX as u32;

/// Hands out strictly increasing slide ids for one build.
///
/// `next_id` only peeks; the counter moves with `advance` once a slide has been
/// registered, so a failed slide leaves no gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideIdAllocator {
    next: u64,
}

impl Default for SlideIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideIdAllocator {
    #[inline]
    pub fn new() -> Self {
        Self {
            next: u64::from(FIRST_SLIDE_ID),
        }
    }

    /// Start one past the largest id already in use, but never below 256.
    pub fn seeded<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let next = existing
            .into_iter()
            .map(|id| u64::from(id) + 1)
            .max()
            .unwrap_or(0)
            .max(u64::from(FIRST_SLIDE_ID));
        Self { next }
    }

    /// The id the next slide will get.
    pub fn next_id(&self) -> Result<u32> {
        if self.next > u64::from(MAX_SLIDE_ID) {
            return Err(BuildError::Capacity { next: self.next });
        }
        Ok(self.next as u32)
    }

    /// Commit the id returned by the last `next_id`.
    #[inline]
    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Relationship id of a slide in the presentation part.
    #[inline]
    pub fn rel_id(slide_id: u32) -> String {
        format!("rel{}", slide_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_starts_at_256_and_increments() {
        let mut alloc = SlideIdAllocator::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(alloc.next_id().unwrap());
            alloc.advance();
        }
        assert_eq!(ids, vec![256, 257, 258, 259, 260]);
    }

    #[test]
    fn test_next_does_not_advance() {
        let alloc = SlideIdAllocator::new();
        assert_eq!(alloc.next_id().unwrap(), 256);
        assert_eq!(alloc.next_id().unwrap(), 256);
    }

    #[test]
    fn test_seeded() {
        assert_eq!(SlideIdAllocator::seeded(std::iter::empty()).next_id().unwrap(), 256);
        assert_eq!(SlideIdAllocator::seeded([256, 300, 257]).next_id().unwrap(), 301);
        // Out-of-range ids in a broken template still do not pull us below 256
        assert_eq!(SlideIdAllocator::seeded([5]).next_id().unwrap(), 256);
    }

    #[test]
    fn test_capacity() {
        let mut alloc = SlideIdAllocator::seeded([MAX_SLIDE_ID - 1]);
        assert_eq!(alloc.next_id().unwrap(), MAX_SLIDE_ID);
        alloc.advance();
        match alloc.next_id() {
            Err(BuildError::Capacity { next }) => assert_eq!(next, 1u64 << 31),
            other => panic!("expected capacity error, got {:?}", other),
        }

        let alloc = SlideIdAllocator::seeded([MAX_SLIDE_ID]);
        assert!(matches!(alloc.next_id(), Err(BuildError::Capacity { .. })));
    }

    #[test]
    fn test_rel_ids_are_distinct() {
        let ids: HashSet<String> = (256..1256).map(SlideIdAllocator::rel_id).collect();
        assert_eq!(ids.len(), 1000);
        assert_eq!(SlideIdAllocator::rel_id(256), "rel256");
    }
}
