//! The kernel singleton.
//!
//! A [`Kernel`] owns every subsystem and validates them all before it
//! publishes itself. Only one kernel can be published at a time; dropping the
//! last reference to it frees the slot again.

use crate::api::{Constructible, Program, Task, Toggle};
use crate::arch::{Arch, DefaultArch};
use crate::config::Configuration;
use crate::cpu::Cpu;
use crate::critical::GlobalInterrupt;
use crate::errors::Error;
use crate::heap::Heap;
use crate::interrupt::Interrupt;
use crate::port::Port;
use crate::runtime::Runtime;
use crate::sched::Scheduler;
use crate::sync::{Mutex, Semaphore};
use alloc::sync::{Arc, Weak};
use log::{error, info, warn};
use portable_atomic::{AtomicBool, Ordering};

/// Published kernel. Holds a weak reference so that dropping the kernel is
/// what ends its publication.
static SYSTEM: spin::Mutex<Option<Weak<Kernel>>> = spin::Mutex::new(None);

pub struct Kernel {
    config: Configuration,
    heap: Heap,
    cpu: Cpu,
    gi: GlobalInterrupt,
    runtime: Runtime,
    scheduler: Arc<Scheduler>,
    constructed: AtomicBool,
}

impl Kernel {
    /// Build every subsystem, validate them in dependency order and publish
    /// the kernel.
    ///
    /// The kernel is valid only if all subsystems are valid and no other
    /// kernel is currently published.
    pub fn new(config: Configuration, port: Arc<dyn Port>) -> Arc<Self> {
        let kernel = Arc::new(Self {
            config,
            heap: Heap::new(&config),
            cpu: Cpu::new(&config),
            gi: GlobalInterrupt::new(),
            runtime: Runtime::new(),
            scheduler: Scheduler::new(port),
            constructed: AtomicBool::new(false),
        });

        let mut slot = SYSTEM.lock();
        if slot.as_ref().is_some_and(|published| published.strong_count() > 0) {
            warn!("kernel rejected: another kernel is already published");
            return kernel;
        }
        if let Some(member) = kernel.first_invalid_member() {
            warn!("kernel rejected: {} failed to construct", member);
            return kernel;
        }

        *slot = Some(Arc::downgrade(&kernel));
        kernel.constructed.store(true, Ordering::Release);
        drop(slot);

        info!(
            "kernel published: heap {} bytes, {} interrupt sources",
            kernel.heap.capacity(),
            kernel.cpu.interrupt_sources()
        );
        kernel
    }

    fn first_invalid_member(&self) -> Option<&'static str> {
        let members: [(&'static str, bool); 6] = [
            ("configuration", self.config.is_valid()),
            ("heap", self.heap.is_constructed()),
            ("cpu", self.cpu.is_constructed()),
            ("global interrupt", self.gi.is_constructed()),
            ("runtime", self.runtime.is_constructed()),
            ("scheduler", self.scheduler.is_constructed()),
        ];
        members
            .iter()
            .find(|(_, valid)| !valid)
            .map(|(member, _)| *member)
    }

    /// The published kernel.
    ///
    /// Halts with `SyscallOnInvalidSingleton` if no kernel is published.
    pub fn call() -> Arc<Kernel> {
        let published = SYSTEM.lock().as_ref().and_then(Weak::upgrade);
        match published {
            Some(kernel) if kernel.is_constructed() => kernel,
            _ => Self::terminate_with(Error::SyscallOnInvalidSingleton),
        }
    }

    /// `true` if a kernel is currently published.
    pub fn is_published() -> bool {
        SYSTEM
            .lock()
            .as_ref()
            .is_some_and(|published| published.strong_count() > 0)
    }

    fn checked(&self) -> &Self {
        if !self.is_constructed() {
            Self::terminate_with(Error::SyscallOnInvalidSingleton);
        }
        self
    }

    pub fn heap(&self) -> &Heap {
        &self.checked().heap
    }

    pub fn runtime(&self) -> &Runtime {
        &self.checked().runtime
    }

    pub fn global_interrupt(&self) -> &dyn Toggle {
        &self.checked().gi
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.checked().scheduler
    }

    pub fn cpu(&self) -> &Cpu {
        &self.checked().cpu
    }

    pub fn config(&self) -> &Configuration {
        &self.checked().config
    }

    pub fn create_mutex(&self) -> Option<Arc<Mutex>> {
        self.prove_resource(Mutex::new())
    }

    pub fn create_semaphore(&self, permits: i32, fair: bool) -> Option<Arc<Semaphore>> {
        self.prove_resource(Semaphore::new(permits, fair))
    }

    /// Bind `handler` to one of the board's interrupt sources.
    pub fn create_interrupt(&self, handler: Arc<dyn Task>, source: i32) -> Option<Arc<Interrupt>> {
        let sources = self.cpu.interrupt_sources();
        self.prove_resource(Interrupt::new(handler, source, sources))
    }

    fn prove_resource<T: Constructible>(&self, resource: T) -> Option<Arc<T>> {
        if self.is_constructed() && resource.is_constructed() {
            Some(Arc::new(resource))
        } else {
            None
        }
    }

    /// Run `program` and return its exit code.
    ///
    /// An invalid kernel never runs user code and returns the code of
    /// [`Error::Undefined`] instead.
    pub fn execute<G: Program + ?Sized>(&self, program: &mut G) -> i32 {
        if !self.is_constructed() {
            return Error::Undefined.code();
        }
        program.start()
    }

    /// Nanoseconds since the execution port started its clock.
    pub fn time(&self) -> i64 {
        let elapsed = self.checked().scheduler.port().now();
        i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
    }

    /// Shut the kernel down on user request.
    pub fn terminate(&self) -> ! {
        Self::terminate_with(Error::UserTermination)
    }

    /// Fail-stop halt carrying `error` as the exit status.
    pub fn terminate_with(error: Error) -> ! {
        error!("kernel terminated: {} (code {})", error, error.code());
        DefaultArch::halt(error.code())
    }
}

impl Constructible for Kernel {
    fn is_constructed(&self) -> bool {
        self.constructed.load(Ordering::Acquire)
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        if !self.is_constructed() {
            return;
        }
        let mut slot = SYSTEM.lock();
        let ours = slot
            .as_ref()
            .is_some_and(|published| core::ptr::eq(published.as_ptr(), self));
        if ours {
            *slot = None;
        }
    }
}

/// Process entry: bring the kernel up and run `program` on it.
///
/// Returns the program's exit code, or the code of [`Error::Undefined`] if
/// the kernel failed to construct.
pub fn boot<G: Program + ?Sized>(config: Configuration, port: Arc<dyn Port>, program: &mut G) -> i32 {
    let kernel = Kernel::new(config, port);
    kernel.execute(program)
}
