#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unreachable_pub)]

//! Kernel core for a bare-metal real-time operating system.
//!
//! The crate provides the parts of a small RTOS kernel that have to be right
//! for anything else to work:
//!
//! - global critical sections built on the interrupt mask
//! - counting and binary semaphores
//! - the kernel thread state machine and its start gate
//! - the scheduler's registry of live threads
//! - a kernel singleton that validates every subsystem before publishing itself
//!
//! Context switching is delegated to an execution [`Port`]. Bare-metal
//! AArch64 builds supply their own port; the `std-shim` feature (on by
//! default) provides [`HostPort`], which runs each kernel thread on a host
//! thread and emulates the interrupt mask.
//!
//! # Features
//!
//! - `std-shim`: hosted interrupt emulation and execution port
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use rtos_kernel::{boot, Configuration, FnTask, HostPort, Kernel};
//!
//! let code = boot(Configuration::new(), Arc::new(HostPort::new()), &mut || {
//!     let kernel = Kernel::call();
//!     let Some(thread) = kernel.scheduler().create_thread(Arc::new(FnTask::new(|| 7))) else {
//!         return 1;
//!     };
//!     thread.execute();
//!     thread.join().unwrap_or(1)
//! });
//! assert_eq!(code, 7);
//! ```

pub mod api;
pub mod arch;
pub mod config;
pub mod cpu;
pub mod critical;
pub mod errors;
pub mod heap;
pub mod interrupt;
pub mod kernel;
pub mod logger;
pub mod port;
pub mod runtime;
pub mod sched;
pub mod sync;
pub mod thread;

#[cfg(test)]
mod tests;

#[cfg(any(test, feature = "std-shim"))]
extern crate std;

extern crate alloc;

#[cfg(all(not(test), not(feature = "std-shim")))]
use core::panic::PanicInfo;

#[cfg(all(not(test), not(feature = "std-shim")))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    log::error!("panic: {}", info);
    DefaultArch::halt(Error::Undefined.code())
}

// ============================================================================
// Public API
// ============================================================================

pub use api::{Constructible, FnTask, Lockable, Program, Task, Toggle};
pub use arch::{Arch, DefaultArch};
pub use config::Configuration;
pub use critical::{CriticalCell, CriticalGuard, CriticalSection, GlobalInterrupt};
pub use errors::Error;
pub use interrupt::Interrupt;
pub use kernel::{boot, Kernel};
pub use port::{Context, Port};
pub use sched::Scheduler;
pub use sync::{Mutex, Semaphore};
pub use thread::{KernelThread, ThreadHandle, ThreadStatus};

#[cfg(any(test, feature = "std-shim"))]
pub use port::HostPort;
