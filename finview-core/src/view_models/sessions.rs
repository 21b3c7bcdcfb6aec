use std::sync::Arc;

use finview_config::SessionsConfig;
use finview_model::prelude::*;
use tracing::{debug, warn};

use crate::error::{CoreError, TaskError};
use crate::reducer::{Context, Published, Reducer, TaskSlot};
use crate::session::UserSession;

const SESSIONS: TaskSlot = TaskSlot::new("sessions");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionsAction {
    Refresh,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SessionsState {
    #[default]
    Initial,
    Content,
    Error(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionsBackground {
    Loading,
}

#[derive(Debug, Clone)]
pub struct SessionsFields {
    pub sessions: Published<Vec<SessionInfo>>,
}

/// Client sessions active on the server within a recent window.
#[derive(Debug)]
pub struct ActiveSessionsViewModel {
    session: UserSession,
    active_within_seconds: u32,
    sessions: Published<Vec<SessionInfo>>,
}

impl ActiveSessionsViewModel {
    pub fn new(session: UserSession, config: &SessionsConfig) -> Self {
        let active_within_seconds =
            u32::try_from(config.active_within.as_secs()).unwrap_or(u32::MAX);
        Self {
            session,
            active_within_seconds,
            sessions: Published::default(),
        }
    }
}

impl Reducer for ActiveSessionsViewModel {
    type Action = SessionsAction;
    type State = SessionsState;
    type Event = ();
    type Background = SessionsBackground;
    type Fields = SessionsFields;

    fn fields(&self) -> SessionsFields {
        SessionsFields {
            sessions: self.sessions.clone(),
        }
    }

    fn respond(
        &mut self,
        action: SessionsAction,
        cx: &mut Context<Self>,
    ) -> SessionsState {
        match action {
            SessionsAction::Refresh => {
                let api = Arc::clone(self.session.api());
                let within = self.active_within_seconds;
                let work = async move {
                    Ok::<_, TaskError>(api.sessions(within).await?)
                };

                cx.spawn_fallible(
                    SESSIONS,
                    [SessionsBackground::Loading],
                    work,
                    |this: &mut Self, result, cx| match result {
                        Ok(sessions) => {
                            debug!(count = sessions.len(), "sessions loaded");
                            this.sessions.set(sessions);
                            cx.set_state(SessionsState::Content);
                        }
                        Err(err) => {
                            warn!(error = %err, "loading sessions failed");
                            cx.set_state(SessionsState::Error(err));
                        }
                    },
                );
                cx.state()
            }
        }
    }
}
