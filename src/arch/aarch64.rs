//! AArch64 interrupt mask control through the DAIF register.

use super::Arch;
use core::arch::asm;

/// IRQ mask bit of DAIF.
const DAIF_I: u64 = 1 << 7;

/// AArch64 architecture implementation.
pub struct Aarch64Arch;

impl Arch for Aarch64Arch {
    fn enable_interrupts() {
        unsafe {
            asm!("msr daifclr, #2", options(nomem, nostack));
        }
    }

    fn disable_interrupts() {
        unsafe {
            asm!("msr daifset, #2", options(nomem, nostack));
        }
    }

    fn interrupts_enabled() -> bool {
        let daif: u64;
        unsafe {
            asm!(
                "mrs {daif}, daif",
                daif = out(reg) daif,
                options(nostack, readonly)
            );
        }
        (daif & DAIF_I) == 0
    }

    fn relax() {
        unsafe {
            asm!("yield", options(nomem, nostack));
        }
    }

    fn halt(_code: i32) -> ! {
        // Mask D, A, I and F; nothing is left to wake us.
        unsafe {
            asm!("msr daifset, #0xf", options(nomem, nostack));
        }
        loop {
            unsafe {
                asm!("wfe", options(nomem, nostack));
            }
        }
    }
}
