//! Handle types for externally owned registries

use std::sync::atomic::{AtomicU64, Ordering};

pub use slotmap::{new_key_type, SlotMap};

/// Monotonic id source for process-unique identifiers
///
/// Ids start at 1 so that 0 never names a live object.
#[derive(Debug)]
pub struct IdSource {
    next: AtomicU64,
}

impl IdSource {
    /// Create a new id source
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next id
    pub fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let source = IdSource::new();
        let a = source.allocate();
        let b = source.allocate();
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }
}
