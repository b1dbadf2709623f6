//! Console logger for the `log` facade.
//!
//! Records are written as `[LEVEL] target: message`, to the PL011 UART on bare
//! metal and to stderr on hosted builds.

use log::{LevelFilter, Metadata, Record};

pub struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        #[cfg(any(test, feature = "std-shim"))]
        std::eprintln!("[{:5}] {}: {}", record.level(), record.target(), record.args());

        #[cfg(all(target_arch = "aarch64", not(test), not(feature = "std-shim")))]
        {
            use core::fmt::Write;
            let _ = writeln!(
                crate::arch::console::Console,
                "[{:5}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Install the kernel logger and set the maximum level.
///
/// Returns `false` if another logger was installed first; the level is
/// applied either way.
pub fn init(level: LevelFilter) -> bool {
    let installed = log::set_logger(&LOGGER).is_ok();
    log::set_max_level(level);
    installed
}
