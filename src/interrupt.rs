//! Per-source interrupt resources.
//!
//! An [`Interrupt`] binds a handler task to one interrupt source. Raising the
//! source marks it pending and dispatches the handler right away unless the
//! source is disabled, in which case the request waits for the next enable.

use crate::api::{Constructible, Task, Toggle};
use crate::critical::CriticalSection;
use alloc::sync::Arc;
use portable_atomic::{AtomicBool, Ordering};

pub struct Interrupt {
    handler: Arc<dyn Task>,
    source: i32,
    enabled: AtomicBool,
    pending: AtomicBool,
    constructed: bool,
}

impl Interrupt {
    /// Bind `handler` to `source`, which must lie in `0..source_count`.
    pub fn new(handler: Arc<dyn Task>, source: i32, source_count: i32) -> Self {
        let constructed = handler.is_constructed() && (0..source_count).contains(&source);
        Self {
            handler,
            source,
            enabled: AtomicBool::new(true),
            pending: AtomicBool::new(false),
            constructed,
        }
    }

    /// Run the handler in interrupt context and clear the pending request.
    ///
    /// Returns the handler's result, or `None` on an invalid resource.
    pub fn jump(&self) -> Option<i32> {
        if !self.constructed {
            return None;
        }
        Some(CriticalSection::with(|| {
            self.pending.store(false, Ordering::Release);
            self.handler.start()
        }))
    }

    /// Dispatch the handler only if a request is pending.
    ///
    /// The request is claimed inside the bracket, so concurrent callers
    /// dispatch it at most once.
    fn dispatch_pending(&self) {
        CriticalSection::with(|| {
            if self.pending.swap(false, Ordering::AcqRel) {
                self.handler.start();
            }
        });
    }

    /// Raise the source.
    pub fn set(&self) {
        if !self.constructed {
            return;
        }
        self.pending.store(true, Ordering::Release);
        if self.enabled.load(Ordering::Acquire) {
            self.dispatch_pending();
        }
    }

    /// Drop a pending request without dispatching it.
    pub fn clear(&self) {
        if self.constructed {
            self.pending.store(false, Ordering::Release);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.constructed && self.pending.load(Ordering::Acquire)
    }

    pub fn is_enabled(&self) -> bool {
        self.constructed && self.enabled.load(Ordering::Acquire)
    }

    pub fn source(&self) -> i32 {
        self.source
    }
}

impl Constructible for Interrupt {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}

impl Toggle for Interrupt {
    fn disable(&self) -> bool {
        if !self.constructed {
            return false;
        }
        self.enabled.swap(false, Ordering::AcqRel)
    }

    /// Re-enabling dispatches a request raised while the source was off.
    fn enable(&self, prior: bool) {
        if !self.constructed || !prior {
            return;
        }
        self.enabled.store(true, Ordering::Release);
        self.dispatch_pending();
    }
}
