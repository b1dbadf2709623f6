//! Hosted port: one host thread per kernel thread.

use super::{Context, Port, Routine};
use crate::api::Constructible;
use alloc::format;
use alloc::sync::Arc;
use core::cell::Cell;
use core::time::Duration;
use portable_atomic::{AtomicI64, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

/// Host threads get at least this much stack regardless of the request.
const MIN_HOST_STACK: usize = 64 * 1024;

static NEXT_ID: AtomicI64 = AtomicI64::new(1);

std::thread_local! {
    static CURRENT: Cell<i64> = const { Cell::new(-1) };
}

/// Port backed by `std::thread`.
pub struct HostPort {
    epoch: Instant,
    spawn_enabled: bool,
    constructed: bool,
}

impl HostPort {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            spawn_enabled: true,
            constructed: true,
        }
    }

    /// A port that fails its own construction.
    pub fn faulty() -> Self {
        Self {
            constructed: false,
            ..Self::new()
        }
    }

    /// A valid port whose `spawn` always fails.
    pub fn refusing_spawn() -> Self {
        Self {
            spawn_enabled: false,
            ..Self::new()
        }
    }
}

impl Default for HostPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructible for HostPort {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}

impl Port for HostPort {
    fn spawn(&self, stack_size: usize, routine: Routine) -> Option<Arc<dyn Context>> {
        if !self.constructed || !self.spawn_enabled {
            return None;
        }

        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let handle = std::thread::Builder::new()
            .name(format!("kthread-{}", id))
            .stack_size(stack_size.max(MIN_HOST_STACK))
            .spawn(move || {
                CURRENT.with(|current| current.set(id));
                routine()
            });

        match handle {
            Ok(handle) => Some(Arc::new(HostContext {
                id,
                handle: spin::Mutex::new(Some(handle)),
                result: spin::Once::new(),
            })),
            Err(err) => {
                log::warn!("host refused to start kthread-{}: {}", id, err);
                None
            }
        }
    }

    fn current_id(&self) -> i64 {
        CURRENT.with(|current| current.get())
    }

    fn yield_now(&self) {
        std::thread::yield_now();
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

struct HostContext {
    id: i64,
    handle: spin::Mutex<Option<JoinHandle<i32>>>,
    result: spin::Once<Option<i32>>,
}

impl Context for HostContext {
    fn id(&self) -> i64 {
        self.id
    }

    fn join(&self) -> Option<i32> {
        *self.result.call_once(|| {
            let handle = self.handle.lock().take();
            handle.and_then(|handle| handle.join().ok())
        })
    }
}
