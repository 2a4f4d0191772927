//! Latest-attempt tokens.
//!
//! Every planning attempt takes a fresh id. Only the most recent id is
//! current; completions carrying an older id are discarded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Single-slot tracker shared by the pipeline and the UI context.
#[derive(Debug, Clone, Default)]
pub struct AttemptTracker {
    latest: Arc<AtomicU64>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, superseding any attempt still in flight.
    pub fn begin(&self) -> AttemptId {
        AttemptId(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, attempt: AttemptId) -> bool {
        self.latest.load(Ordering::SeqCst) == attempt.0
    }

    pub fn latest(&self) -> Option<AttemptId> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            id => Some(AttemptId(id)),
        }
    }
}
