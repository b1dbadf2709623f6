//! Read-only startup parameters consumed while the kernel is constructed.

/// Stack size used when a task does not ask for one.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;

/// Smallest thread stack the kernel accepts as a default.
pub const MIN_STACK_SIZE: usize = 4 * 1024;

/// Board and kernel parameters.
///
/// Members owned by the kernel read these during their own construction, so
/// the configuration is always the first thing the kernel embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// Heap budget in bytes.
    pub heap_size: usize,
    /// Default thread stack size in bytes.
    pub stack_size: usize,
    /// CPU clock in Hz.
    pub cpu_clock_hz: u64,
    /// Number of interrupt sources the board exposes.
    pub interrupt_sources: i32,
    /// Maximum level passed to the logger by the boot entry.
    pub log_level: log::LevelFilter,
}

impl Configuration {
    pub const fn new() -> Self {
        Self {
            heap_size: 1024 * 1024,
            stack_size: DEFAULT_STACK_SIZE,
            cpu_clock_hz: 1_000_000_000,
            interrupt_sources: 128,
            log_level: log::LevelFilter::Info,
        }
    }

    pub const fn with_heap_size(mut self, heap_size: usize) -> Self {
        self.heap_size = heap_size;
        self
    }

    pub const fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub const fn with_cpu_clock(mut self, hz: u64) -> Self {
        self.cpu_clock_hz = hz;
        self
    }

    pub const fn with_interrupt_sources(mut self, sources: i32) -> Self {
        self.interrupt_sources = sources;
        self
    }

    pub const fn with_log_level(mut self, level: log::LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// `true` if the parameters can be used to bring the kernel up.
    pub fn is_valid(&self) -> bool {
        self.stack_size >= MIN_STACK_SIZE
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
