use crate::api::{Constructible, Lockable};
use crate::arch::{Arch, DefaultArch};
use crate::critical::CriticalCell;
use alloc::collections::VecDeque;

/// A waiter that arrived while its request could not be granted.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    id: u64,
    permits: i32,
}

struct State {
    permits: i32,
    queue: VecDeque<Ticket>,
    next_ticket: u64,
}

impl State {
    /// Grant a request without queueing, if the policy allows it right now.
    fn take_now(&mut self, n: i32, fair: bool) -> bool {
        let queue_allows = !fair || self.queue.is_empty();
        if queue_allows && self.permits >= n {
            self.permits -= n;
            true
        } else {
            false
        }
    }

    fn enqueue(&mut self, n: i32) -> u64 {
        let id = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.queue.push_back(Ticket { id, permits: n });
        id
    }

    /// Try to serve a queued waiter.
    ///
    /// A fair semaphore only ever serves the head of the queue.
    fn serve(&mut self, ticket: u64, fair: bool) -> bool {
        let position = if fair {
            match self.queue.front() {
                Some(head) if head.id == ticket => Some(0),
                _ => None,
            }
        } else {
            self.queue.iter().position(|t| t.id == ticket)
        };

        let Some(position) = position else {
            return false;
        };
        let wanted = self.queue[position].permits;
        if self.permits < wanted {
            return false;
        }
        self.permits -= wanted;
        self.queue.remove(position);
        true
    }
}

/// Counting semaphore.
///
/// Waiters poll outside of any critical section and take permits inside one,
/// so a release issued from interrupt context is never lost. With the fairness
/// flag set, waiters are served strictly in order of arrival; otherwise any
/// poller that sees enough permits takes them.
pub struct Semaphore {
    state: CriticalCell<State>,
    fair: bool,
    constructed: bool,
}

impl Semaphore {
    /// Create a semaphore holding `permits` permits.
    ///
    /// A negative initial count leaves the semaphore invalid.
    pub fn new(permits: i32, fair: bool) -> Self {
        let mut semaphore = Self {
            state: CriticalCell::new(State {
                permits: permits.max(0),
                queue: VecDeque::new(),
                next_ticket: 0,
            }),
            fair,
            constructed: false,
        };
        semaphore.constructed = permits >= 0;
        semaphore
    }

    /// Take one permit, waiting as long as necessary.
    pub fn acquire(&self) -> bool {
        self.acquire_many(1)
    }

    /// Take `n` permits at once, waiting as long as necessary.
    ///
    /// Returns `false` without waiting if the semaphore is invalid or `n` is
    /// not positive.
    pub fn acquire_many(&self, n: i32) -> bool {
        if !self.constructed || n <= 0 {
            return false;
        }

        let fair = self.fair;
        let ticket = self.state.with(|state| {
            if state.take_now(n, fair) {
                None
            } else {
                Some(state.enqueue(n))
            }
        });
        let Some(ticket) = ticket else {
            return true;
        };

        while !self.state.with(|state| state.serve(ticket, fair)) {
            DefaultArch::relax();
        }
        true
    }

    /// Take one permit if that is possible without waiting.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_many(1)
    }

    /// Take `n` permits if that is possible without waiting.
    pub fn try_acquire_many(&self, n: i32) -> bool {
        if !self.constructed || n <= 0 {
            return false;
        }
        let fair = self.fair;
        self.state.with(|state| state.take_now(n, fair))
    }

    /// Give one permit back.
    pub fn release(&self) {
        self.release_many(1);
    }

    /// Give `n` permits back.
    ///
    /// Non-positive counts are ignored, and so is a release that would push
    /// the count past `i32::MAX`.
    pub fn release_many(&self, n: i32) {
        if !self.constructed || n <= 0 {
            return;
        }
        self.state.with(|state| {
            if let Some(permits) = state.permits.checked_add(n) {
                state.permits = permits;
            }
        });
    }

    /// Give `n` permits back without letting the count exceed `cap`.
    pub(crate) fn release_capped(&self, n: i32, cap: i32) {
        if !self.constructed || n <= 0 {
            return;
        }
        self.state.with(|state| {
            if let Some(permits) = state.permits.checked_add(n) {
                state.permits = permits.min(cap).max(state.permits);
            }
        });
    }

    pub fn is_fair(&self) -> bool {
        self.constructed && self.fair
    }

    /// `true` if acquiring a single permit right now would have to wait.
    pub fn is_blocked(&self) -> bool {
        if !self.constructed {
            return false;
        }
        let fair = self.fair;
        self.state
            .with(|state| state.permits < 1 || (fair && !state.queue.is_empty()))
    }

    pub fn available_permits(&self) -> i32 {
        if !self.constructed {
            return 0;
        }
        self.state.with(|state| state.permits)
    }

    /// Number of callers currently waiting in `acquire`.
    pub fn queue_length(&self) -> usize {
        if !self.constructed {
            return 0;
        }
        self.state.with(|state| state.queue.len())
    }
}

impl Constructible for Semaphore {
    fn is_constructed(&self) -> bool {
        self.constructed
    }
}

impl Lockable for Semaphore {
    fn lock(&self) -> bool {
        self.acquire()
    }

    fn unlock(&self) {
        self.release();
    }

    fn is_blocked(&self) -> bool {
        Semaphore::is_blocked(self)
    }
}
