use super::{KernelThread, ThreadStatus};
use crate::api::Constructible;
use alloc::sync::Arc;
use core::time::Duration;

/// Owning handle returned by [`Scheduler::create_thread`](crate::sched::Scheduler::create_thread).
///
/// Dropping the handle of a thread that was never executed retires it: its
/// entry routine exits without running the task. A thread that already
/// executed keeps running and stays registered until its task returns.
pub struct ThreadHandle {
    thread: Arc<KernelThread>,
}

impl ThreadHandle {
    pub(crate) fn new(thread: Arc<KernelThread>) -> Self {
        Self { thread }
    }

    pub fn execute(&self) -> bool {
        self.thread.execute()
    }

    pub fn join(&self) -> Option<i32> {
        self.thread.join()
    }

    pub fn sleep(&self, duration: Duration) {
        self.thread.sleep(duration);
    }

    pub fn id(&self) -> i64 {
        self.thread.id()
    }

    pub fn status(&self) -> ThreadStatus {
        self.thread.status()
    }

    pub fn priority(&self) -> i32 {
        self.thread.priority()
    }

    pub fn set_priority(&self, priority: i32) {
        self.thread.set_priority(priority);
    }

    pub fn completion_code(&self) -> Option<i32> {
        self.thread.completion_code()
    }

    /// Shared reference to the underlying thread.
    pub fn thread(&self) -> &Arc<KernelThread> {
        &self.thread
    }
}

impl Constructible for ThreadHandle {
    fn is_constructed(&self) -> bool {
        self.thread.is_constructed()
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        self.thread.discard();
    }
}
