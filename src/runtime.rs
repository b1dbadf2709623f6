//! Program runtime services.

use crate::api::Constructible;
use crate::arch::{Arch, DefaultArch};
use log::debug;

pub struct Runtime {
    constructed: bool,
}

impl Runtime {
    pub fn new() -> Self {
        Self { constructed: true }
    }

    /// Load an executable image. Dynamic loading is not supported, so this
    /// always reports failure.
    pub fn load(&self, path: &str) -> bool {
        debug!("refusing to load {}", path);
        false
    }

    /// Stop the kernel with `code` as the exit status.
    pub fn exit(&self, code: i32) -> ! {
        DefaultArch::halt(code)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructible for Runtime {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}
