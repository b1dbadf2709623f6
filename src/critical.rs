//! Global critical sections.
//!
//! A critical section masks every maskable interrupt on the machine. It is the
//! kernel's only low-level mutual-exclusion mechanism, so any state reachable
//! from both thread context and interrupt context lives behind one.
//!
//! Brackets are a one-way ratchet, not a recursive lock: keep the value
//! returned by the outermost [`CriticalSection::enter_all`] and hand it back,
//! unchanged, to the matching [`CriticalSection::exit_all`].

use crate::api::{Constructible, Toggle};
use crate::arch::{Arch, DefaultArch};

/// Interrupt mask bracket over the default architecture.
pub struct CriticalSection;

impl CriticalSection {
    /// Disable all maskable interrupts.
    ///
    /// Returns `true` if interrupts were enabled right before the call.
    #[inline]
    pub fn enter_all() -> bool {
        let prior = DefaultArch::interrupts_enabled();
        DefaultArch::disable_interrupts();
        prior
    }

    /// Close a bracket opened by [`enter_all`](Self::enter_all).
    ///
    /// `exit_all(false)` does nothing: the section began with interrupts
    /// already masked and they stay masked.
    #[inline]
    pub fn exit_all(prior: bool) {
        if prior {
            DefaultArch::enable_interrupts();
        }
    }

    /// Open a bracket that is closed when the returned guard is dropped.
    #[inline]
    pub fn guard() -> CriticalGuard {
        CriticalGuard {
            prior: Self::enter_all(),
        }
    }

    /// Run `f` with interrupts masked.
    pub fn with<R>(f: impl FnOnce() -> R) -> R {
        let _guard = Self::guard();
        f()
    }
}

/// Scoped critical section; restores the prior mask on drop.
#[must_use = "the critical section ends as soon as the guard is dropped"]
pub struct CriticalGuard {
    prior: bool,
}

impl CriticalGuard {
    /// Interrupt enable bit observed when the bracket was opened.
    pub fn prior(&self) -> bool {
        self.prior
    }
}

impl Drop for CriticalGuard {
    fn drop(&mut self) {
        CriticalSection::exit_all(self.prior);
    }
}

/// A value that is only ever touched inside a critical section.
///
/// The inner spin lock is never contended on a single core: holding the
/// interrupt mask already excludes every other context. It turns an accidental
/// nested access to the same cell into a hang instead of aliased `&mut`.
pub struct CriticalCell<T> {
    inner: spin::Mutex<T>,
}

impl<T> CriticalCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: spin::Mutex::new(value),
        }
    }

    /// Run `f` on the protected value inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let _guard = CriticalSection::guard();
        let mut value = self.inner.lock();
        f(&mut value)
    }
}

impl<T: Copy> CriticalCell<T> {
    /// Copy the current value out under a critical section.
    pub fn get(&self) -> T {
        self.with(|value| *value)
    }
}

/// Global interrupt controller exposed through the [`Toggle`] capability.
pub struct GlobalInterrupt {
    constructed: bool,
}

impl GlobalInterrupt {
    pub fn new() -> Self {
        Self { constructed: true }
    }
}

impl Default for GlobalInterrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructible for GlobalInterrupt {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}

impl Toggle for GlobalInterrupt {
    fn disable(&self) -> bool {
        CriticalSection::enter_all()
    }

    fn enable(&self, prior: bool) {
        CriticalSection::exit_all(prior);
    }
}
