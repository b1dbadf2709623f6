//! Capability traits shared by every kernel entity.
//!
//! Entities compose the capabilities they need instead of inheriting them from
//! a common root: a semaphore is [`Constructible`] and [`Lockable`], the global
//! interrupt controller is [`Constructible`] and [`Toggle`], and so on.

use crate::config::DEFAULT_STACK_SIZE;

/// Two-phase construction.
///
/// The validity flag is set once, at the very end of construction, and never
/// cleared. Every public operation of an invalid object is a no-op that
/// returns its neutral value (`false`, `None`, or nothing).
pub trait Constructible {
    /// `true` if the object was constructed successfully.
    fn is_constructed(&self) -> bool;
}

/// Pause/resume switch following the critical-section ratchet contract.
pub trait Toggle {
    /// Turn the controlled facility off.
    ///
    /// Returns whether it was on right before the call.
    fn disable(&self) -> bool;

    /// Turn the facility back on, but only if `prior` says it was on.
    fn enable(&self, prior: bool);
}

/// Binary lock capability.
pub trait Lockable {
    /// Block until the lock is held. `false` if the object is invalid.
    fn lock(&self) -> bool;

    /// Release the lock.
    fn unlock(&self);

    /// `true` if a `lock()` issued now would have to wait.
    fn is_blocked(&self) -> bool;
}

/// User code bound to a kernel thread or an interrupt source.
pub trait Task: Constructible + Send + Sync {
    /// Entry point; the return value is the completion code.
    fn start(&self) -> i32;

    /// Stack size requested for the execution context, in bytes.
    fn stack_size(&self) -> usize {
        DEFAULT_STACK_SIZE
    }
}

/// External program entry point run by [`Kernel::execute`](crate::Kernel::execute).
pub trait Program {
    fn start(&mut self) -> i32;
}

impl<F> Program for F
where
    F: FnMut() -> i32,
{
    fn start(&mut self) -> i32 {
        self()
    }
}

/// Adapter turning a closure into a [`Task`].
pub struct FnTask<F> {
    entry: F,
    stack_size: usize,
}

impl<F> FnTask<F>
where
    F: Fn() -> i32 + Send + Sync,
{
    pub fn new(entry: F) -> Self {
        Self {
            entry,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }
}

impl<F> Constructible for FnTask<F> {
    fn is_constructed(&self) -> bool {
        self.stack_size > 0
    }
}

impl<F> Task for FnTask<F>
where
    F: Fn() -> i32 + Send + Sync,
{
    fn start(&self) -> i32 {
        (self.entry)()
    }

    fn stack_size(&self) -> usize {
        self.stack_size
    }
}
