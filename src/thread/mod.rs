//! Kernel threads.
//!
//! A kernel thread is created `New`, with its entry routine already started on
//! the execution port but parked on a zero-permit gate. `execute()` registers
//! the thread with its scheduler, marks it `Runnable` and opens the gate. The
//! routine then runs the task, marks the thread `Dead` and deregisters it.

use crate::api::{Constructible, Task};
use crate::critical::{CriticalCell, CriticalSection};
use crate::port::{Context, Port};
use crate::sched::Scheduler;
use crate::sync::Semaphore;
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::time::Duration;
use log::{debug, warn};
use portable_atomic::{AtomicBool, AtomicI32, AtomicI64, Ordering};

pub mod handle;

pub use handle::ThreadHandle;

pub const MIN_PRIORITY: i32 = 1;
pub const NORM_PRIORITY: i32 = 5;
pub const MAX_PRIORITY: i32 = 10;

/// Completion code of a routine that exited without running its task.
pub const DISCARDED: i32 = -1;

/// Thread lifecycle. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadStatus {
    New = 0,
    Runnable = 1,
    Dead = 2,
}

pub struct KernelThread {
    id: AtomicI64,
    status: CriticalCell<ThreadStatus>,
    priority: AtomicI32,
    gate: Semaphore,
    task: Arc<dyn Task>,
    scheduler: Weak<Scheduler>,
    port: Arc<dyn Port>,
    context: spin::Once<Arc<dyn Context>>,
    result: spin::Once<i32>,
    constructed: AtomicBool,
}

impl KernelThread {
    /// Build a thread bound to `task` and start its parked entry routine.
    ///
    /// The returned thread is valid only if the task, the gate and the port
    /// are valid and the port agreed to create an execution context.
    pub(crate) fn new(task: Arc<dyn Task>, scheduler: &Arc<Scheduler>, port: Arc<dyn Port>) -> Arc<Self> {
        let thread = Arc::new(Self {
            id: AtomicI64::new(-1),
            status: CriticalCell::new(ThreadStatus::New),
            priority: AtomicI32::new(NORM_PRIORITY),
            gate: Semaphore::new(0, false),
            task,
            scheduler: Arc::downgrade(scheduler),
            port,
            context: spin::Once::new(),
            result: spin::Once::new(),
            constructed: AtomicBool::new(false),
        });

        if !thread.task.is_constructed() || !thread.gate.is_constructed() || !thread.port.is_constructed() {
            warn!("kernel thread rejected: invalid task or port");
            return thread;
        }

        let routine = Arc::clone(&thread);
        let context = thread
            .port
            .spawn(thread.task.stack_size(), Box::new(move || routine.run()));
        let Some(context) = context else {
            warn!("kernel thread rejected: port refused to spawn");
            return thread;
        };

        thread.id.store(context.id(), Ordering::Release);
        thread.context.call_once(|| context);
        thread.constructed.store(true, Ordering::Release);
        debug!("kernel thread {} created", thread.id());
        thread
    }

    /// Allow the thread to run.
    ///
    /// Returns `true` if this call moved the thread out of `New`; later calls
    /// do nothing.
    pub fn execute(self: &Arc<Self>) -> bool {
        if !self.is_constructed() {
            return false;
        }
        let Some(scheduler) = self.scheduler.upgrade() else {
            return false;
        };

        let promoted = CriticalSection::with(|| {
            let promoted = self.status.with(|status| {
                if *status == ThreadStatus::New {
                    *status = ThreadStatus::Runnable;
                    true
                } else {
                    false
                }
            });
            if promoted {
                scheduler.add_thread(Arc::clone(self));
            }
            promoted
        });

        if promoted {
            self.gate.release();
            debug!("kernel thread {} runnable", self.id());
        }
        promoted
    }

    /// Entry routine run on the port's execution context.
    fn run(&self) -> i32 {
        self.gate.acquire();
        if self.status() != ThreadStatus::Runnable {
            return DISCARDED;
        }

        let code = self.task.start();
        self.result.call_once(|| code);

        CriticalSection::with(|| {
            self.status.with(|status| *status = ThreadStatus::Dead);
            if let Some(scheduler) = self.scheduler.upgrade() {
                scheduler.remove_thread(self);
            }
        });
        debug!("kernel thread {} finished with code {}", self.id(), code);
        code
    }

    /// Retire a thread that never executed and let its routine exit.
    fn discard(&self) {
        if !self.is_constructed() {
            return;
        }
        let discarded = self.status.with(|status| {
            if *status == ThreadStatus::New {
                *status = ThreadStatus::Dead;
                true
            } else {
                false
            }
        });
        if discarded {
            self.gate.release();
            debug!("kernel thread {} discarded before execution", self.id());
        }
    }

    /// Wait for the entry routine to return.
    ///
    /// Returns the routine's completion code, or `None` for an invalid
    /// thread or a task that did not return normally. Joining a thread that
    /// was never executed waits until its handle is dropped.
    pub fn join(&self) -> Option<i32> {
        if !self.is_constructed() {
            return None;
        }
        self.context.get().and_then(|context| context.join())
    }

    /// Suspend the calling context through the execution port.
    pub fn sleep(&self, duration: Duration) {
        if self.is_constructed() {
            self.port.sleep(duration);
        }
    }

    /// Give up the processor while waiting on `resource`.
    pub fn block(&self, resource: &dyn Constructible) {
        if self.is_constructed() && resource.is_constructed() {
            self.port.yield_now();
        }
    }

    pub fn id(&self) -> i64 {
        self.id.load(Ordering::Acquire)
    }

    /// Current status; an invalid thread always reports `Dead`.
    pub fn status(&self) -> ThreadStatus {
        if !self.is_constructed() {
            return ThreadStatus::Dead;
        }
        self.status.get()
    }

    pub fn priority(&self) -> i32 {
        self.priority.load(Ordering::Relaxed)
    }

    /// Values outside `MIN_PRIORITY..=MAX_PRIORITY` are ignored.
    pub fn set_priority(&self, priority: i32) {
        if self.is_constructed() && (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
            self.priority.store(priority, Ordering::Relaxed);
        }
    }

    /// Value returned by the task, once it has returned.
    pub fn completion_code(&self) -> Option<i32> {
        self.result.get().copied()
    }
}

impl Constructible for KernelThread {
    fn is_constructed(&self) -> bool {
        self.constructed.load(Ordering::Acquire)
    }
}
