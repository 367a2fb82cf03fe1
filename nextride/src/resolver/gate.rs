//! Stale query detection.
//!
//! A UI session starts a new query whenever the user changes their mind
//! (picks another saved stop, refreshes). Results of older queries must
//! not be shown, so each query carries a ticket that goes stale as soon as
//! a newer one is issued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues query tickets for one session.
#[derive(Debug, Clone, Default)]
pub struct QueryGate {
    latest: Arc<AtomicU64>,
}

impl QueryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query, invalidating every earlier ticket.
    pub fn begin(&self) -> QueryTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        QueryTicket {
            id,
            latest: Some(Arc::clone(&self.latest)),
        }
    }
}

/// Proof that a query is still the most recent one in its session.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    id: u64,
    latest: Option<Arc<AtomicU64>>,
}

impl QueryTicket {
    /// A ticket that never goes stale, for callers without a session.
    pub fn unguarded() -> Self {
        Self {
            id: 0,
            latest: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer query has begun since this ticket was issued.
    pub fn is_current(&self) -> bool {
        match &self.latest {
            Some(latest) => latest.load(Ordering::SeqCst) == self.id,
            None => true,
        }
    }
}
