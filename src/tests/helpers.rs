//! Test helper utilities and common functionality.

use crate::api::{FnTask, Task};
use crate::config::Configuration;
use crate::kernel::Kernel;
use crate::port::{HostPort, Port};
use crate::sched::Scheduler;
use crate::sync::Semaphore;
use alloc::sync::Arc;
use std::time::{Duration, Instant};

/// Serializes tests that construct kernels: the published slot is
/// process-wide.
static KERNEL_LOCK: spin::Mutex<()> = spin::Mutex::new(());

pub(crate) fn kernel_lock() -> spin::MutexGuard<'static, ()> {
    loop {
        if let Some(guard) = KERNEL_LOCK.try_lock() {
            return guard;
        }
        std::thread::yield_now();
    }
}

pub(crate) fn host_port() -> Arc<dyn Port> {
    Arc::new(HostPort::new())
}

pub(crate) fn scheduler() -> Arc<Scheduler> {
    Scheduler::new(host_port())
}

pub(crate) fn kernel() -> Arc<Kernel> {
    Kernel::new(Configuration::new(), host_port())
}

pub(crate) fn task<F>(entry: F) -> Arc<dyn Task>
where
    F: Fn() -> i32 + Send + Sync + 'static,
{
    Arc::new(FnTask::new(entry))
}

/// A task that waits on `gate` and then returns `code`.
pub(crate) fn gated_task(gate: &Arc<Semaphore>, code: i32) -> Arc<dyn Task> {
    let gate = Arc::clone(gate);
    task(move || {
        gate.acquire();
        code
    })
}

/// Spin until `condition` holds, failing the test after a few seconds.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        std::thread::yield_now();
    }
}
