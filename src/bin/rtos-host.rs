//! Hosted entry point: boots the kernel on host threads and runs a small
//! demonstration program on it.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use portable_atomic::{AtomicU32, Ordering};
use rtos_kernel::{boot, logger, Configuration, Error, FnTask, HostPort, Kernel, Task};

fn main() {
    // Any panic is an unexpected top-level fault.
    std::panic::set_hook(Box::new(|panic| {
        eprintln!("[ERROR] rtos-host: {}", panic);
        std::process::exit(Error::Undefined.code());
    }));

    let config = Configuration::new();
    logger::init(config.log_level);

    let code = boot(config, Arc::new(HostPort::new()), &mut run);
    std::process::exit(code);
}

/// Two workers take turns on a kernel mutex while a timer interrupt counts
/// their hand-offs.
fn run() -> i32 {
    let kernel = Kernel::call();
    let (Some(mutex), Some(done)) = (kernel.create_mutex(), kernel.create_semaphore(0, true)) else {
        return Error::Undefined.code();
    };

    let ticks = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&ticks);
    let timer: Arc<dyn Task> = Arc::new(FnTask::new(move || {
        counter.fetch_add(1, Ordering::Relaxed) as i32
    }));
    let Some(tick) = kernel.create_interrupt(timer, 0) else {
        return Error::Undefined.code();
    };

    let mut handles = Vec::new();
    for worker in 0..2 {
        let mutex = Arc::clone(&mutex);
        let done = Arc::clone(&done);
        let tick = Arc::clone(&tick);
        let task = FnTask::new(move || {
            let me = Kernel::call().scheduler().current_thread();
            for round in 0..3 {
                if let Some(_guard) = mutex.guard() {
                    info!("worker {} (thread {}) round {}", worker, me.id(), round);
                    tick.set();
                }
                me.sleep(Duration::from_millis(5));
            }
            done.release();
            0
        });
        match kernel.scheduler().create_thread(Arc::new(task)) {
            Some(handle) => handles.push(handle),
            None => return Error::Undefined.code(),
        }
    }

    // Hold thread switching off while the workers are released together.
    let switch = kernel.scheduler().toggle();
    let prior = switch.disable();
    for handle in &handles {
        handle.execute();
    }
    switch.enable(prior);

    done.acquire_many(2);
    let failures = handles
        .iter()
        .filter(|handle| handle.join() != Some(0))
        .count();

    info!(
        "{} interrupts dispatched in {} ms",
        ticks.load(Ordering::Relaxed),
        kernel.time() / 1_000_000
    );
    if failures == 0 {
        0
    } else {
        Error::Undefined.code()
    }
}
