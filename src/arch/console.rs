//! PL011 console used as the kernel log sink on bare-metal AArch64.
//!
//! Peripheral base for BCM2837 is 0x3F000000, with UART0 at +0x201000. The
//! boot code is expected to have configured baud rate and pins already.

use core::fmt::{self, Write};
use core::ptr::{read_volatile, write_volatile};

const UART0_BASE: usize = 0x3F20_1000;
const UART0_DR: usize = UART0_BASE;
const UART0_FR: usize = UART0_BASE + 0x18;

/// Transmit FIFO full.
const FR_TXFF: u32 = 1 << 5;

/// Byte sink over the PL011 data register.
pub struct Console;

impl Console {
    fn put(byte: u8) {
        unsafe {
            while read_volatile(UART0_FR as *const u32) & FR_TXFF != 0 {
                core::hint::spin_loop();
            }
            write_volatile(UART0_DR as *mut u32, byte as u32);
        }
    }
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                Self::put(b'\r');
            }
            Self::put(byte);
        }
        Ok(())
    }
}
