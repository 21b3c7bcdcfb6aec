use std::sync::{Mutex, PoisonError};

use finview_contracts::notify::{ChangeNotifier, ResourceChanged};

/// Notifier that keeps every posted change.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    changes: Mutex<Vec<ResourceChanged>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<ResourceChanged> {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn post(&self, change: ResourceChanged) {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(change);
    }
}
