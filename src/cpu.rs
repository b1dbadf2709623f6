//! Board parameters the kernel validates at bring-up.

use crate::api::Constructible;
use crate::config::Configuration;

pub struct Cpu {
    clock_hz: u64,
    interrupt_sources: i32,
    constructed: bool,
}

impl Cpu {
    pub fn new(config: &Configuration) -> Self {
        Self {
            clock_hz: config.cpu_clock_hz,
            interrupt_sources: config.interrupt_sources,
            constructed: config.cpu_clock_hz > 0 && config.interrupt_sources > 0,
        }
    }

    pub fn clock_hz(&self) -> u64 {
        self.clock_hz
    }

    /// Number of interrupt sources; valid sources are `0..interrupt_sources`.
    pub fn interrupt_sources(&self) -> i32 {
        self.interrupt_sources
    }
}

impl Constructible for Cpu {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}
