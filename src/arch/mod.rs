//! Architecture abstraction layer for interrupt masking and fail-stop halting.
//!
//! The kernel core never touches CPU registers directly. Everything it needs
//! from the machine goes through the [`Arch`] trait, which each supported
//! target implements once.

/// Architecture abstraction trait.
///
/// Implementations provide the global interrupt mask, which is the kernel's
/// only low-level mutual-exclusion mechanism, plus the halt primitive used by
/// fatal kernel paths.
pub trait Arch {
    /// Enable all maskable interrupts on the current CPU.
    fn enable_interrupts();

    /// Disable all maskable interrupts on the current CPU.
    ///
    /// Disabling while already disabled leaves the mask unchanged.
    fn disable_interrupts();

    /// Check if maskable interrupts are currently enabled.
    fn interrupts_enabled() -> bool;

    /// Hint issued by busy-wait loops between two polls.
    fn relax() {
        core::hint::spin_loop();
    }

    /// Stop the machine for good.
    ///
    /// Bare-metal targets mask interrupts and wait forever. Hosted targets end
    /// the process and report `code` as its exit status.
    fn halt(code: i32) -> !;
}

#[cfg(all(target_arch = "aarch64", not(test), not(feature = "std-shim")))]
pub mod aarch64;
#[cfg(all(target_arch = "aarch64", not(test), not(feature = "std-shim")))]
pub mod console;

#[cfg(any(test, feature = "std-shim"))]
pub mod hosted;

#[cfg(all(target_arch = "aarch64", not(test), not(feature = "std-shim")))]
pub use aarch64::Aarch64Arch as DefaultArch;

#[cfg(any(test, feature = "std-shim"))]
pub use hosted::HostedArch as DefaultArch;

#[cfg(all(not(target_arch = "aarch64"), not(test), not(feature = "std-shim")))]
compile_error!("Bare-metal builds only support aarch64. Use --target aarch64-unknown-none or enable the std-shim feature.");
