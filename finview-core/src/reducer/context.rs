use std::any::type_name;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{BackgroundStates, Published, Reducer, TaskSlot};
use crate::error::{CoreError, TaskError};

type Apply<R> = Box<dyn FnOnce(&mut R, &mut Context<R>) + Send>;

/// Result of a spawned task, waiting to be applied on the driver.
pub(crate) struct Completion<R: Reducer> {
    slot: TaskSlot,
    task_id: u64,
    apply: Apply<R>,
}

struct RunningTask<B> {
    id: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
    markers: Vec<B>,
}

/// Driver-side handle a reducer uses to publish and to start async work.
pub struct Context<R: Reducer> {
    state: Published<R::State>,
    background: Published<BackgroundStates<R::Background>>,
    events: broadcast::Sender<R::Event>,
    tasks: HashMap<TaskSlot, RunningTask<R::Background>>,
    next_task_id: u64,
    completions: mpsc::UnboundedSender<Completion<R>>,
    pending: VecDeque<R::Action>,
}

impl<R: Reducer> fmt::Debug for Context<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let running: Vec<_> = self.tasks.keys().map(TaskSlot::name).collect();
        f.debug_struct("Context")
            .field("reducer", &type_name::<R>())
            .field("state", &*self.state.borrow())
            .field("background", &*self.background.borrow())
            .field("running", &running)
            .field("pending_actions", &self.pending.len())
            .finish()
    }
}

impl<R: Reducer> Context<R> {
    pub(crate) fn new(
        state: Published<R::State>,
        background: Published<BackgroundStates<R::Background>>,
        events: broadcast::Sender<R::Event>,
        completions: mpsc::UnboundedSender<Completion<R>>,
    ) -> Self {
        Self {
            state,
            background,
            events,
            tasks: HashMap::new(),
            next_task_id: 0,
            completions,
            pending: VecDeque::new(),
        }
    }

    /// The state as last published.
    pub fn state(&self) -> R::State {
        self.state.get()
    }

    /// Publish `state`. Observers are only notified when it differs from
    /// the current value.
    pub fn set_state(&mut self, state: R::State) {
        self.state.modify_if(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    pub fn emit(&self, event: R::Event) {
        trace!(?event, "emit");
        // No subscribers is fine: events are not replayed.
        let _ = self.events.send(event);
    }

    pub fn background_states(&self) -> BackgroundStates<R::Background> {
        self.background.get()
    }

    pub fn is_running(&self, slot: TaskSlot) -> bool {
        self.tasks.contains_key(&slot)
    }

    /// Queue `action` to be handled right after the current one.
    pub fn send_self(&mut self, action: R::Action) {
        self.pending.push_back(action);
    }

    /// Run `work` off the driver and hand its output to `complete` back on
    /// the driver.
    ///
    /// Whatever runs in `slot` is cancelled first. `markers` are present in
    /// the background set from now until the task completes or is
    /// cancelled. `complete` is skipped when the task was cancelled in the
    /// meantime.
    pub fn spawn<T, Fut, F>(
        &mut self,
        slot: TaskSlot,
        markers: impl IntoIterator<Item = R::Background>,
        work: Fut,
        complete: F,
    ) where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        F: FnOnce(&mut R, T, &mut Context<R>) + Send + 'static,
    {
        self.cancel(slot);

        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let markers: Vec<_> = markers.into_iter().collect();
        self.acquire(&markers);

        let token = CancellationToken::new();
        let task_token = token.clone();
        let completions = self.completions.clone();

        let handle = tokio::spawn(async move {
            let output = tokio::select! {
                _ = task_token.cancelled() => return,
                output = work => output,
            };
            let apply: Apply<R> =
                Box::new(move |reducer, cx| complete(reducer, output, cx));
            // The driver is gone when this fails; nothing left to update.
            let _ = completions.send(Completion {
                slot,
                task_id,
                apply,
            });
        });

        debug!(%slot, task_id, reducer = type_name::<R>(), "task spawned");
        self.tasks.insert(
            slot,
            RunningTask {
                id: task_id,
                token,
                handle,
                markers,
            },
        );
    }

    /// [`spawn`](Self::spawn) for fallible work. A [`TaskError::Cancelled`]
    /// outcome is dropped here; `complete` sees successes and real failures.
    pub fn spawn_fallible<T, Fut, F>(
        &mut self,
        slot: TaskSlot,
        markers: impl IntoIterator<Item = R::Background>,
        work: Fut,
        complete: F,
    ) where
        T: Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
        F: FnOnce(&mut R, Result<T, CoreError>, &mut Context<R>)
            + Send
            + 'static,
    {
        self.spawn(slot, markers, work, move |reducer, output, cx| {
            match output {
                Ok(value) => complete(reducer, Ok(value), cx),
                Err(TaskError::Failed(err)) => complete(reducer, Err(err), cx),
                Err(TaskError::Cancelled) => {
                    debug!(%slot, "request cancelled by transport");
                }
            }
        });
    }

    /// Cancel the task running in `slot`, if any, and release its markers.
    pub fn cancel(&mut self, slot: TaskSlot) -> bool {
        let Some(task) = self.tasks.remove(&slot) else {
            return false;
        };
        task.token.cancel();
        task.handle.abort();
        self.release(&task.markers);
        debug!(%slot, task_id = task.id, "task cancelled");
        true
    }

    pub(crate) fn cancel_all(&mut self) {
        let slots: Vec<_> = self.tasks.keys().copied().collect();
        for slot in slots {
            self.cancel(slot);
        }
    }

    pub(crate) fn take_pending(&mut self) -> Option<R::Action> {
        self.pending.pop_front()
    }

    /// Apply a completion unless its task was superseded or cancelled.
    pub(crate) fn finish(&mut self, reducer: &mut R, completion: Completion<R>) {
        let Completion {
            slot,
            task_id,
            apply,
        } = completion;

        let live = self.tasks.get(&slot).is_some_and(|task| {
            task.id == task_id && !task.token.is_cancelled()
        });
        if !live {
            trace!(%slot, task_id, "discarding stale completion");
            return;
        }

        let Some(task) = self.tasks.remove(&slot) else {
            return;
        };
        apply(reducer, self);
        // Released after `apply` so a follow-up task spawned from the
        // completion overlaps instead of leaving a gap.
        self.release(&task.markers);
        trace!(%slot, task_id, "task completed");
    }

    fn acquire(&self, markers: &[R::Background]) {
        if markers.is_empty() {
            return;
        }
        self.background.modify_if(|set| {
            let mut changed = false;
            for marker in markers {
                changed |= set.acquire(marker.clone());
            }
            changed
        });
    }

    fn release(&self, markers: &[R::Background]) {
        if markers.is_empty() {
            return;
        }
        self.background.modify_if(|set| {
            let mut changed = false;
            for marker in markers {
                changed |= set.release(marker);
            }
            changed
        });
    }
}
