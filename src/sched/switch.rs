use crate::api::{Constructible, Toggle};
use portable_atomic::{AtomicBool, Ordering};

/// Thread-switch controller.
///
/// While disabled, [`Scheduler::yield_now`](super::Scheduler::yield_now)
/// keeps the calling thread on the processor.
pub struct GlobalThread {
    enabled: AtomicBool,
}

impl GlobalThread {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl Default for GlobalThread {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructible for GlobalThread {
    fn is_constructed(&self) -> bool {
        true
    }
}

impl Toggle for GlobalThread {
    fn disable(&self) -> bool {
        self.enabled.swap(false, Ordering::AcqRel)
    }

    fn enable(&self, prior: bool) {
        if prior {
            self.enabled.store(true, Ordering::Release);
        }
    }
}
