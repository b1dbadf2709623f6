//! Hosted emulation of the interrupt mask.
//!
//! On a development host every kernel thread is a host thread, so masking
//! "interrupts" has to exclude other host threads as well. The mask is an
//! owner-tracked lock: the context that disabled interrupts owns it until it
//! enables them again, and a context that already owns it sees interrupts as
//! disabled. That is exactly the ratchet behaviour of a single-core CPU flag.

use super::Arch;
use portable_atomic::{AtomicU64, Ordering};

/// No context owns the mask.
const UNOWNED: u64 = 0;

static MASK_OWNER: AtomicU64 = AtomicU64::new(UNOWNED);
static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

std::thread_local! {
    static CONTEXT: u64 = NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed);
}

fn context() -> u64 {
    CONTEXT.with(|id| *id)
}

/// Interrupt emulation for hosted builds.
pub struct HostedArch;

impl Arch for HostedArch {
    fn enable_interrupts() {
        let _ = MASK_OWNER.compare_exchange(context(), UNOWNED, Ordering::Release, Ordering::Relaxed);
    }

    fn disable_interrupts() {
        let me = context();
        if MASK_OWNER.load(Ordering::Acquire) == me {
            return;
        }
        while MASK_OWNER
            .compare_exchange_weak(UNOWNED, me, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
    }

    fn interrupts_enabled() -> bool {
        MASK_OWNER.load(Ordering::Acquire) != context()
    }

    fn relax() {
        std::thread::yield_now();
    }

    fn halt(code: i32) -> ! {
        #[cfg(test)]
        panic!("kernel halted with code {}", code);

        #[cfg(not(test))]
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_is_per_context() {
        HostedArch::disable_interrupts();
        assert!(!HostedArch::interrupts_enabled());

        let other = std::thread::spawn(HostedArch::interrupts_enabled);
        assert_eq!(other.join().ok(), Some(true));

        HostedArch::enable_interrupts();
        assert!(HostedArch::interrupts_enabled());
    }

    #[test]
    fn test_enable_without_ownership_is_ignored() {
        HostedArch::enable_interrupts();
        assert!(HostedArch::interrupts_enabled());
    }
}
