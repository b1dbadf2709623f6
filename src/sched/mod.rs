//! Scheduler bookkeeping and the thread-switch toggle.
//!
//! Context switching belongs to the execution port. The scheduler only tracks
//! which threads are live and resolves the calling context to one of them.

pub mod scheduler;
pub mod switch;

pub use scheduler::Scheduler;
pub use switch::GlobalThread;
