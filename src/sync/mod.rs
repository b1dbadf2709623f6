//! Counting and binary synchronization primitives.
//!
//! Every permit-count mutation happens inside a critical section, so the
//! primitives may be released from interrupt context.

pub mod mutex;
pub mod semaphore;

pub use mutex::{Mutex, MutexGuard};
pub use semaphore::Semaphore;
