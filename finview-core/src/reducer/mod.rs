//! Action → state reducer runtime.
//!
//! A screen's view-model implements [`Reducer`]. [`ViewModel`] starts a
//! driver task that owns the reducer: actions, task completions, and every
//! publication (state, background markers, events, published fields) are
//! handled there one at a time, so observers see them in a single total
//! order. Async work is started through [`Context::spawn`] and only touches
//! the reducer again once it has hopped back onto the driver.

mod background;
mod context;
mod published;
mod view_model;

use std::fmt;
use std::hash::Hash;

pub use background::BackgroundStates;
pub use context::Context;
pub use published::Published;
pub use view_model::ViewModel;

/// A screen's update contract.
pub trait Reducer: Send + Sized + 'static {
    type Action: fmt::Debug + Send + 'static;
    /// Renderable condition of the screen. `Default` is the initial state.
    type State: Clone
        + Default
        + PartialEq
        + Eq
        + Hash
        + fmt::Debug
        + Send
        + Sync
        + 'static;
    /// One-shot signal, delivered at most once per subscriber.
    type Event: Clone + fmt::Debug + Send + 'static;
    /// Marker for work in flight that does not change `State`.
    type Background: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    /// Observable fields handed to the UI next to the state, typically
    /// [`Published`] cells. Use `()` when there are none.
    type Fields: Clone + Send + Sync + 'static;

    fn fields(&self) -> Self::Fields;

    /// Handle one action on the driver. The returned state is published
    /// once this returns: a terminal state, or a busy one when async work
    /// was started.
    fn respond(
        &mut self,
        action: Self::Action,
        cx: &mut Context<Self>,
    ) -> Self::State;
}

/// Class of async operation. At most one task per slot is alive; spawning
/// into an occupied slot cancels the running task first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskSlot(&'static str);

impl TaskSlot {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TaskSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
