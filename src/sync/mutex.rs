use super::Semaphore;
use crate::api::{Constructible, Lockable};

/// Binary lock built on a fair one-permit [`Semaphore`].
///
/// The mutex does not track an owner: any context may unlock it, which lets an
/// interrupt handler hand the lock back to a waiting thread.
pub struct Mutex {
    permit: Semaphore,
}

impl Mutex {
    pub fn new() -> Self {
        Self {
            permit: Semaphore::new(1, true),
        }
    }

    /// Wait until the lock is free, then take it.
    pub fn lock(&self) -> bool {
        self.permit.acquire()
    }

    pub fn try_lock(&self) -> bool {
        self.permit.try_acquire()
    }

    /// Release the lock. Unlocking a free mutex leaves it free.
    pub fn unlock(&self) {
        self.permit.release_capped(1, 1);
    }

    pub fn is_locked(&self) -> bool {
        self.permit.is_constructed() && self.permit.available_permits() == 0
    }

    /// `true` if a `lock()` issued now would have to wait.
    pub fn is_blocked(&self) -> bool {
        self.permit.is_blocked()
    }

    pub fn is_fair(&self) -> bool {
        self.permit.is_fair()
    }

    /// Take the lock and release it when the guard goes out of scope.
    ///
    /// `None` if the mutex is invalid.
    pub fn guard(&self) -> Option<MutexGuard<'_>> {
        if self.lock() {
            Some(MutexGuard { mutex: self })
        } else {
            None
        }
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Constructible for Mutex {
    fn is_constructed(&self) -> bool {
        self.permit.is_constructed()
    }
}

impl Lockable for Mutex {
    fn lock(&self) -> bool {
        Mutex::lock(self)
    }

    fn unlock(&self) {
        Mutex::unlock(self);
    }

    fn is_blocked(&self) -> bool {
        Mutex::is_blocked(self)
    }
}

/// Scoped lock returned by [`Mutex::guard`].
#[must_use = "the mutex is unlocked as soon as the guard is dropped"]
pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        self.mutex.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use portable_atomic::{AtomicU32, Ordering};

    #[test]
    fn test_lock_unlock() {
        let mutex = Mutex::new();
        assert!(mutex.is_constructed());
        assert!(mutex.is_fair());
        assert!(!mutex.is_locked());

        assert!(mutex.lock());
        assert!(mutex.is_locked());
        assert!(mutex.is_blocked());
        assert!(!mutex.try_lock());

        mutex.unlock();
        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_unlock_never_exceeds_one_permit() {
        let mutex = Mutex::new();
        mutex.unlock();
        mutex.unlock();
        assert!(mutex.try_lock());
        assert!(!mutex.try_lock());
        mutex.unlock();
    }

    #[test]
    fn test_guard_unlocks_on_drop() {
        let mutex = Mutex::new();
        {
            let _guard = mutex.guard();
            assert!(mutex.is_locked());
        }
        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_mutual_exclusion() {
        let mutex = Arc::new(Mutex::new());
        let inside = Arc::new(AtomicU32::new(0));

        let workers: alloc::vec::Vec<_> = (0..4)
            .map(|_| {
                let mutex = Arc::clone(&mutex);
                let inside = Arc::clone(&inside);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let _guard = mutex.guard();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        std::thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for worker in workers {
            assert!(worker.join().is_ok());
        }
        assert!(!mutex.is_locked());
    }
}
