//! Execution port: the native primitive that actually runs kernel threads.
//!
//! The kernel core never switches contexts itself. It asks the port for a new
//! execution context bound to an entry routine, and for the identity of the
//! context that is currently running.

use crate::api::Constructible;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::time::Duration;

#[cfg(any(test, feature = "std-shim"))]
pub mod host;

#[cfg(any(test, feature = "std-shim"))]
pub use host::HostPort;

/// Entry routine handed to [`Port::spawn`]. Its return value is the
/// completion code of the context.
pub type Routine = Box<dyn FnOnce() -> i32 + Send + 'static>;

/// One execution context created by a port.
pub trait Context: Send + Sync {
    /// Identity reported by [`Port::current_id`] while this context runs.
    fn id(&self) -> i64;

    /// Wait until the entry routine has returned.
    ///
    /// Returns its completion code, or `None` if the routine never completed
    /// normally. Later calls return the same value without waiting.
    fn join(&self) -> Option<i32>;
}

/// Native execution primitive.
pub trait Port: Constructible + Send + Sync {
    /// Start a new context running `routine`.
    ///
    /// `None` if the port could not create one.
    fn spawn(&self, stack_size: usize, routine: Routine) -> Option<Arc<dyn Context>>;

    /// Identity of the calling context; -1 outside of any spawned context.
    fn current_id(&self) -> i64;

    /// Give the processor to another context.
    fn yield_now(&self);

    /// Suspend the calling context for at least `duration`.
    fn sleep(&self, duration: Duration);

    /// Time elapsed since the port was created.
    fn now(&self) -> Duration;
}
