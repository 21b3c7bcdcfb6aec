use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{CoreError, TaskError};
use crate::reducer::{Context, Reducer, TaskSlot};
use crate::session::UserSession;

const RESET: TaskSlot = TaskSlot::new("reset-password");

#[derive(Clone, PartialEq, Eq)]
pub enum ResetPasswordAction {
    Reset { current: String, new: String },
}

impl std::fmt::Debug for ResetPasswordAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetPasswordAction::Reset { .. } => f
                .debug_struct("Reset")
                .field("current", &"<redacted>")
                .field("new", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ResetPasswordState {
    #[default]
    Initial,
    Resetting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetPasswordEvent {
    Success,
    Error(CoreError),
}

/// Changes the signed-in user's password.
#[derive(Debug)]
pub struct ResetUserPasswordViewModel {
    session: UserSession,
}

impl ResetUserPasswordViewModel {
    pub fn new(session: UserSession) -> Self {
        Self { session }
    }
}

impl Reducer for ResetUserPasswordViewModel {
    type Action = ResetPasswordAction;
    type State = ResetPasswordState;
    type Event = ResetPasswordEvent;
    type Background = ();
    type Fields = ();

    fn fields(&self) {}

    fn respond(
        &mut self,
        action: ResetPasswordAction,
        cx: &mut Context<Self>,
    ) -> ResetPasswordState {
        match action {
            ResetPasswordAction::Reset { current, new } => {
                let api = Arc::clone(self.session.api());
                let user_id = self.session.user_id();
                let work = async move {
                    api.update_user_password(user_id, &current, &new).await?;
                    Ok::<_, TaskError>(())
                };

                cx.spawn_fallible(
                    RESET,
                    [],
                    work,
                    move |_: &mut Self, result, cx| {
                        match result {
                            Ok(()) => {
                                info!(%user_id, "password changed");
                                cx.emit(ResetPasswordEvent::Success);
                            }
                            Err(err) => {
                                warn!(error = %err, "password change failed");
                                cx.emit(ResetPasswordEvent::Error(err));
                            }
                        }
                        cx.set_state(ResetPasswordState::Initial);
                    },
                );
                ResetPasswordState::Resetting
            }
        }
    }
}
