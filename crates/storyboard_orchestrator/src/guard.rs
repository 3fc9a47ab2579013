//! Per-result in-flight tracking for retries.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Ids with a retry currently running.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Claim `id`. Returns `None` if it is already claimed.
    pub(crate) fn claim(&self, id: &str) -> Option<InFlightGuard> {
        let mut claimed = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        claimed.insert(id.to_string()).then(|| InFlightGuard {
            ids: self.ids.clone(),
            id: id.to_string(),
        })
    }

    /// Whether a retry for `id` is running.
    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Releases the claim when dropped, whatever the retry outcome.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
