//! Stub collaborators and helpers for exercising view-models without a
//! server.

mod api;
pub mod fixtures;
mod notify;
mod store;

use std::sync::Arc;
use std::time::Duration;

use finview_model::ids::{ServerId, UserId};
use tokio::sync::{broadcast, watch};

pub use api::{ApiCall, Endpoint, Gate, StubApi};
pub use notify::RecordingNotifier;
pub use store::MemoryUserStore;

use crate::session::UserSession;

const WAIT: Duration = Duration::from_secs(5);

/// Session backed by `api` for a fresh user on a fresh server.
pub fn session(api: &StubApi) -> UserSession {
    UserSession::new(Arc::new(api.clone()), UserId::new(), ServerId::new())
}

/// Wait until the watched value satisfies `predicate`. `None` on timeout or
/// when the sender is gone.
pub async fn wait_for<T: Clone>(
    rx: &mut watch::Receiver<T>,
    mut predicate: impl FnMut(&T) -> bool,
) -> Option<T> {
    let waited = tokio::time::timeout(WAIT, rx.wait_for(|v| predicate(v)));
    match waited.await {
        Ok(Ok(value)) => Some(value.clone()),
        _ => None,
    }
}

/// Next event, or `None` on timeout or when the channel closed.
pub async fn next_event<E: Clone>(rx: &mut broadcast::Receiver<E>) -> Option<E> {
    tokio::time::timeout(WAIT, rx.recv()).await.ok()?.ok()
}
