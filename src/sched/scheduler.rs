use super::GlobalThread;
use crate::api::{Constructible, Task, Toggle};
use crate::critical::CriticalCell;
use crate::errors::Error;
use crate::kernel::Kernel;
use crate::port::Port;
use crate::thread::{KernelThread, ThreadHandle};
use alloc::sync::Arc;
use alloc::vec::Vec;
use log::warn;

/// Registry of the threads that have executed and not yet died.
///
/// The registry keeps insertion order and is only touched inside a critical
/// section, so a lookup never sees a thread half registered.
pub struct Scheduler {
    registry: CriticalCell<Vec<Arc<KernelThread>>>,
    switch: GlobalThread,
    port: Arc<dyn Port>,
    constructed: bool,
}

impl Scheduler {
    pub fn new(port: Arc<dyn Port>) -> Arc<Self> {
        let constructed = port.is_constructed();
        if !constructed {
            warn!("scheduler rejected: invalid execution port");
        }
        Arc::new(Self {
            registry: CriticalCell::new(Vec::new()),
            switch: GlobalThread::new(),
            port,
            constructed,
        })
    }

    /// Create a thread bound to `task`, parked until it is executed.
    ///
    /// `None` if the scheduler is invalid or the thread failed construction.
    pub fn create_thread(self: &Arc<Self>, task: Arc<dyn Task>) -> Option<ThreadHandle> {
        if !self.constructed {
            return None;
        }
        let thread = KernelThread::new(task, self, Arc::clone(&self.port));
        if !thread.is_constructed() {
            return None;
        }
        Some(ThreadHandle::new(thread))
    }

    pub(crate) fn add_thread(&self, thread: Arc<KernelThread>) {
        self.registry.with(|registry| {
            if !registry.iter().any(|t| Arc::ptr_eq(t, &thread)) {
                registry.push(thread);
            }
        });
    }

    /// Remove `thread` from the registry. Absent threads are ignored.
    pub(crate) fn remove_thread(&self, thread: &KernelThread) {
        self.registry
            .with(|registry| registry.retain(|t| !core::ptr::eq(Arc::as_ptr(t), thread)));
    }

    /// The registered thread running the calling context.
    ///
    /// Halts the kernel with `ResourceNotFound` if the caller is not a
    /// registered thread.
    pub fn current_thread(&self) -> Arc<KernelThread> {
        if !self.constructed {
            Kernel::terminate_with(Error::SyscallOnInvalidSingleton);
        }
        let id = self.port.current_id();
        let found = self
            .registry
            .with(|registry| registry.iter().find(|t| t.id() == id).cloned());
        match found {
            Some(thread) => thread,
            None => Kernel::terminate_with(Error::ResourceNotFound),
        }
    }

    /// Offer the processor to another thread, unless switching is disabled.
    pub fn yield_now(&self) {
        if !self.constructed {
            Kernel::terminate_with(Error::SyscallOnInvalidSingleton);
        }
        if self.switch.is_enabled() {
            self.port.yield_now();
        }
    }

    /// Pause/resume control over thread switching.
    pub fn toggle(&self) -> &dyn Toggle {
        &self.switch
    }

    pub fn active_count(&self) -> usize {
        self.registry.with(|registry| registry.len())
    }

    /// Ids of the registered threads, in registration order.
    pub fn active_ids(&self) -> Vec<i64> {
        self.registry
            .with(|registry| registry.iter().map(|t| t.id()).collect())
    }

    pub fn port(&self) -> &Arc<dyn Port> {
        &self.port
    }
}

impl Constructible for Scheduler {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}
