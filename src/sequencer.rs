use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out increasing tickets so that only the newest in-flight fetch may
/// publish its result. Older responses arriving late are dropped.
#[derive(Debug, Default)]
pub struct Sequencer {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Sequencer {
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
