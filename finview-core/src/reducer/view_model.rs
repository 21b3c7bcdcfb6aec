use std::any::type_name;
use std::fmt;

use finview_config::RuntimeConfig;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tracing::{debug, trace, warn};

use super::context::{Completion, Context};
use super::{BackgroundStates, Published, Reducer};
use crate::error::CoreError;

struct Envelope<R: Reducer> {
    action: R::Action,
    reply: Option<oneshot::Sender<R::State>>,
}

/// Handle to a running reducer.
///
/// Cloning shares the same driver. Once every handle is dropped the driver
/// stops and cancels its in-flight tasks.
pub struct ViewModel<R: Reducer> {
    actions: mpsc::Sender<Envelope<R>>,
    state: Published<R::State>,
    background: Published<BackgroundStates<R::Background>>,
    events: broadcast::Sender<R::Event>,
    fields: R::Fields,
}

impl<R: Reducer> Clone for ViewModel<R> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            state: self.state.clone(),
            background: self.background.clone(),
            events: self.events.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<R: Reducer> fmt::Debug for ViewModel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("reducer", &type_name::<R>())
            .field("state", &*self.state.borrow())
            .field("background", &*self.background.borrow())
            .field("closed", &self.actions.is_closed())
            .finish()
    }
}

impl<R: Reducer> ViewModel<R> {
    /// Start `reducer` on its own driver task. Must be called from within a
    /// tokio runtime.
    pub fn new(reducer: R) -> Self {
        Self::with_config(reducer, &RuntimeConfig::default())
    }

    pub fn with_config(reducer: R, config: &RuntimeConfig) -> Self {
        let (actions, inbox) = mpsc::channel(config.mailbox_capacity.max(1));
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let state = Published::new(R::State::default());
        let background = Published::new(BackgroundStates::new());
        let fields = reducer.fields();

        let cx = Context::new(
            state.clone(),
            background.clone(),
            events.clone(),
            completions_tx,
        );
        tokio::spawn(drive(reducer, cx, inbox, completions));

        Self {
            actions,
            state,
            background,
            events,
            fields,
        }
    }

    /// Enqueue `action` for the driver.
    pub async fn send(&self, action: R::Action) -> Result<(), CoreError> {
        self.actions
            .send(Envelope {
                action,
                reply: None,
            })
            .await
            .map_err(|_| CoreError::Closed)
    }

    /// Enqueue without waiting. Fails when the mailbox is full.
    pub fn try_send(&self, action: R::Action) -> Result<(), CoreError> {
        self.actions
            .try_send(Envelope {
                action,
                reply: None,
            })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(envelope) => {
                    warn!(
                        reducer = type_name::<R>(),
                        action = ?envelope.action,
                        "mailbox full, action dropped"
                    );
                    CoreError::Busy
                }
                mpsc::error::TrySendError::Closed(_) => CoreError::Closed,
            })
    }

    /// Enqueue `action` and wait for the state the reducer answered with.
    pub async fn respond(
        &self,
        action: R::Action,
    ) -> Result<R::State, CoreError> {
        let (reply, answer) = oneshot::channel();
        self.actions
            .send(Envelope {
                action,
                reply: Some(reply),
            })
            .await
            .map_err(|_| CoreError::Closed)?;
        answer.await.map_err(|_| CoreError::Closed)
    }

    pub fn state(&self) -> R::State {
        self.state.get()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<R::State> {
        self.state.subscribe()
    }

    pub fn state_stream(&self) -> WatchStream<R::State> {
        self.state.stream()
    }

    /// Events emitted from now on. Earlier events are not replayed.
    pub fn subscribe_events(&self) -> broadcast::Receiver<R::Event> {
        self.events.subscribe()
    }

    pub fn event_stream(&self) -> BroadcastStream<R::Event> {
        BroadcastStream::new(self.subscribe_events())
    }

    pub fn background_states(&self) -> BackgroundStates<R::Background> {
        self.background.get()
    }

    pub fn subscribe_background(
        &self,
    ) -> watch::Receiver<BackgroundStates<R::Background>> {
        self.background.subscribe()
    }

    pub fn fields(&self) -> &R::Fields {
        &self.fields
    }
}

async fn drive<R: Reducer>(
    mut reducer: R,
    mut cx: Context<R>,
    mut inbox: mpsc::Receiver<Envelope<R>>,
    mut completions: mpsc::UnboundedReceiver<Completion<R>>,
) {
    let name = type_name::<R>();
    debug!(reducer = name, "driver started");

    loop {
        tokio::select! {
            biased;
            Some(completion) = completions.recv() => {
                cx.finish(&mut reducer, completion);
            }
            envelope = inbox.recv() => {
                let Some(Envelope { action, reply }) = envelope else {
                    break;
                };
                let state = dispatch(&mut reducer, &mut cx, action);
                if let Some(reply) = reply {
                    let _ = reply.send(state);
                }
            }
        }

        while let Some(action) = cx.take_pending() {
            dispatch(&mut reducer, &mut cx, action);
        }
    }

    cx.cancel_all();
    debug!(reducer = name, "driver stopped");
}

fn dispatch<R: Reducer>(
    reducer: &mut R,
    cx: &mut Context<R>,
    action: R::Action,
) -> R::State {
    trace!(reducer = type_name::<R>(), ?action, "respond");
    let state = reducer.respond(action, cx);
    cx.set_state(state.clone());
    state
}
