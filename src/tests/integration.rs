//! Integration tests for kernel bring-up and the kernel call surface.

#[cfg(test)]
mod kernel_tests {
    use crate::api::{Constructible, FnTask, Task};
    use crate::config::{Configuration, MIN_STACK_SIZE};
    use crate::errors::Error;
    use crate::kernel::{boot, Kernel};
    use crate::port::HostPort;
    use crate::tests::helpers::{host_port, kernel, kernel_lock, task, wait_until};
    use crate::thread::ThreadStatus;
    use alloc::sync::Arc;
    use portable_atomic::{AtomicBool, AtomicU32, Ordering};

    #[test]
    fn test_valid_kernel_is_published() {
        let _guard = kernel_lock();
        let kernel = kernel();
        assert!(kernel.is_constructed());
        assert!(Kernel::is_published());
        assert!(Arc::ptr_eq(&Kernel::call(), &kernel));

        assert!(kernel.heap().is_constructed());
        assert!(kernel.cpu().is_constructed());
        assert!(kernel.runtime().is_constructed());
        assert!(kernel.scheduler().is_constructed());
        assert_eq!(kernel.config(), &Configuration::new());
    }

    #[test]
    fn test_second_kernel_fails_while_first_is_live() {
        let _guard = kernel_lock();
        let first = kernel();
        assert!(first.is_constructed());

        let second = kernel();
        assert!(!second.is_constructed());
        assert!(Arc::ptr_eq(&Kernel::call(), &first));

        // The rejected kernel must not unpublish the live one.
        drop(second);
        assert!(Arc::ptr_eq(&Kernel::call(), &first));

        drop(first);
        assert!(!Kernel::is_published());
        let third = kernel();
        assert!(third.is_constructed());
    }

    #[test]
    fn test_invalid_scheduler_never_runs_program() {
        let _guard = kernel_lock();
        let kernel = Kernel::new(Configuration::new(), Arc::new(HostPort::faulty()));
        assert!(!kernel.is_constructed());
        assert!(!Kernel::is_published());

        let ran = AtomicBool::new(false);
        let code = kernel.execute(&mut || {
            ran.store(true, Ordering::SeqCst);
            0
        });
        assert_eq!(code, Error::Undefined.code());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_each_invalid_member_fails_construction() {
        let _guard = kernel_lock();
        let broken = [
            Configuration::new().with_stack_size(MIN_STACK_SIZE - 1),
            Configuration::new().with_heap_size(0),
            Configuration::new().with_cpu_clock(0),
            Configuration::new().with_interrupt_sources(0),
        ];
        for config in broken {
            let kernel = Kernel::new(config, host_port());
            assert!(!kernel.is_constructed(), "{:?}", config);
            assert!(!Kernel::is_published());
        }
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_call_without_kernel_is_fatal() {
        let _guard = kernel_lock();
        Kernel::call();
    }

    fn invalid_kernel() -> Arc<Kernel> {
        Kernel::new(Configuration::new().with_heap_size(0), host_port())
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_scheduler_on_invalid_kernel_is_fatal() {
        let _guard = kernel_lock();
        invalid_kernel().scheduler();
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_heap_on_invalid_kernel_is_fatal() {
        let _guard = kernel_lock();
        invalid_kernel().heap();
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_runtime_on_invalid_kernel_is_fatal() {
        let _guard = kernel_lock();
        invalid_kernel().runtime();
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_global_interrupt_on_invalid_kernel_is_fatal() {
        let _guard = kernel_lock();
        invalid_kernel().global_interrupt();
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_cpu_on_invalid_kernel_is_fatal() {
        let _guard = kernel_lock();
        invalid_kernel().cpu();
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 2")]
    fn test_config_on_invalid_kernel_is_fatal() {
        let _guard = kernel_lock();
        invalid_kernel().config();
    }

    #[test]
    #[should_panic(expected = "kernel halted with code 4")]
    fn test_terminate() {
        let _guard = kernel_lock();
        kernel().terminate();
    }

    #[test]
    fn test_factories_return_valid_or_none() {
        let _guard = kernel_lock();
        let kernel = kernel();

        let mutex = kernel.create_mutex().unwrap();
        assert!(mutex.is_constructed());

        let semaphore = kernel.create_semaphore(3, true).unwrap();
        assert!(semaphore.is_constructed());
        assert_eq!(semaphore.available_permits(), 3);
        assert!(kernel.create_semaphore(-1, true).is_none());

        let sources = kernel.cpu().interrupt_sources();
        assert!(kernel.create_interrupt(task(|| 0), sources - 1).is_some());
        assert!(kernel.create_interrupt(task(|| 0), sources).is_none());
        let invalid: Arc<dyn Task> = Arc::new(FnTask::new(|| 0).with_stack_size(0));
        assert!(kernel.create_interrupt(invalid, 0).is_none());
    }

    #[test]
    fn test_factories_on_invalid_kernel() {
        let _guard = kernel_lock();
        let kernel = Kernel::new(Configuration::new(), Arc::new(HostPort::faulty()));
        assert!(kernel.create_mutex().is_none());
        assert!(kernel.create_semaphore(1, false).is_none());
        assert!(kernel.create_interrupt(task(|| 0), 0).is_none());
    }

    #[test]
    fn test_boot_returns_program_code() {
        let _guard = kernel_lock();
        assert_eq!(boot(Configuration::new(), host_port(), &mut || 0), 0);
        assert_eq!(boot(Configuration::new(), host_port(), &mut || 17), 17);
        assert!(!Kernel::is_published());

        let code = boot(Configuration::new(), Arc::new(HostPort::faulty()), &mut || 0);
        assert_eq!(code, Error::Undefined.code());
    }

    #[test]
    fn test_time_advances() {
        let _guard = kernel_lock();
        let kernel = kernel();
        let before = kernel.time();
        std::thread::sleep(core::time::Duration::from_millis(1));
        assert!(kernel.time() > before);
    }

    #[test]
    fn test_semaphore_scenario_across_threads() {
        let _guard = kernel_lock();
        let kernel = kernel();
        let semaphore = kernel.create_semaphore(1, true).unwrap();
        assert!(semaphore.acquire());

        let waiter = Arc::clone(&semaphore);
        let handle = kernel
            .scheduler()
            .create_thread(task(move || {
                waiter.acquire();
                waiter.release();
                1
            }))
            .unwrap();
        assert!(handle.execute());

        wait_until(|| semaphore.queue_length() == 1);
        assert_eq!(handle.status(), ThreadStatus::Runnable);

        semaphore.release();
        assert_eq!(handle.join(), Some(1));
        assert_eq!(semaphore.available_permits(), 1);
    }

    #[test]
    fn test_program_drives_threads_and_interrupts() {
        let _guard = kernel_lock();
        let hits = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&hits);
        let code = boot(Configuration::new(), host_port(), &mut || {
            let kernel = Kernel::call();
            let counter = Arc::clone(&counter);
            let handler = task(move || counter.fetch_add(1, Ordering::SeqCst) as i32);
            let Some(interrupt) = kernel.create_interrupt(handler, 5) else {
                return 1;
            };

            let worker = Arc::clone(&interrupt);
            let Some(handle) = kernel.scheduler().create_thread(task(move || {
                worker.set();
                0
            })) else {
                return 2;
            };
            handle.execute();
            handle.join().unwrap_or(3)
        });

        assert_eq!(code, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
