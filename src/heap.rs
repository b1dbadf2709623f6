//! Budgeted heap owned by the kernel.
//!
//! The backing store is the global allocator; this type enforces the budget
//! taken from the configuration and keeps the accounting.

use crate::api::Constructible;
use crate::config::Configuration;
use core::alloc::Layout;
use core::ptr::NonNull;
use portable_atomic::{AtomicUsize, Ordering};

pub struct Heap {
    capacity: usize,
    used: AtomicUsize,
    constructed: bool,
}

impl Heap {
    pub fn new(config: &Configuration) -> Self {
        Self {
            capacity: config.heap_size,
            used: AtomicUsize::new(0),
            constructed: config.heap_size > 0,
        }
    }

    /// Allocate a block for `layout`.
    ///
    /// `None` for zero-sized layouts, on an invalid heap, or when the block
    /// would exceed the configured budget.
    pub fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.constructed || layout.size() == 0 {
            return None;
        }
        let capacity = self.capacity;
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(layout.size()).filter(|&total| total <= capacity)
            })
            .ok()?;

        // SAFETY: `layout` has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc::alloc::alloc(layout) });
        if ptr.is_none() {
            self.used.fetch_sub(layout.size(), Ordering::AcqRel);
        }
        ptr
    }

    /// Return a block obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this heap with the same `layout`,
    /// and must not be used afterwards.
    pub unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        if !self.constructed {
            return;
        }
        // SAFETY: guaranteed by the caller.
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) };
        self.used.fetch_sub(layout.size(), Ordering::AcqRel);
    }

    /// Bytes currently handed out.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Constructible for Heap {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_accounting() {
        let heap = Heap::new(&Configuration::new().with_heap_size(256));
        let block = Layout::from_size_align(200, 8).unwrap();

        let first = heap.allocate(block).unwrap();
        assert_eq!(heap.used(), 200);
        assert!(heap.allocate(block).is_none());
        assert_eq!(heap.used(), 200);

        unsafe { heap.free(first, block) };
        assert_eq!(heap.used(), 0);
        let again = heap.allocate(block).unwrap();
        unsafe { heap.free(again, block) };
    }

    #[test]
    fn test_zero_size_and_invalid_heap() {
        let heap = Heap::new(&Configuration::new());
        assert!(heap.allocate(Layout::from_size_align(0, 1).unwrap()).is_none());

        let invalid = Heap::new(&Configuration::new().with_heap_size(0));
        assert!(!invalid.is_constructed());
        assert!(invalid.allocate(Layout::new::<u64>()).is_none());
    }
}
