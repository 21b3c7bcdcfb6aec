use std::fmt;
use std::future::Future;
use std::sync::Arc;

use finview_contracts::api::MediaServerApi;
use finview_contracts::notify::{ChangeNotifier, ResourceChanged};
use finview_contracts::store::UserStore;
use finview_model::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{CoreError, TaskError, TaskResult};
use crate::reducer::{Context, Published, Reducer, TaskSlot};

const SIGN_IN: TaskSlot = TaskSlot::new("sign-in");
const PUBLIC_DATA: TaskSlot = TaskSlot::new("public-data");

const INTERNAL_ERROR: &str = "An internal error has occurred";

#[derive(Clone, PartialEq, Eq)]
pub enum SignInAction {
    /// Quick connect availability, public users and the login disclaimer.
    GetPublicData,
    SignIn {
        username: String,
        password: String,
        policy: UserAccessPolicy,
    },
    SignInQuickConnect {
        secret: String,
        policy: UserAccessPolicy,
    },
    /// Answer to [`SignInEvent::DuplicateUser`]. `replace` stores the new
    /// access token; otherwise the user signs in with the stored record.
    SignInDuplicate { user: UserState, replace: bool },
    Cancel,
}

impl fmt::Debug for SignInAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInAction::GetPublicData => f.write_str("GetPublicData"),
            SignInAction::SignIn {
                username, policy, ..
            } => f
                .debug_struct("SignIn")
                .field("username", username)
                .field("policy", policy)
                .finish_non_exhaustive(),
            SignInAction::SignInQuickConnect { policy, .. } => f
                .debug_struct("SignInQuickConnect")
                .field("policy", policy)
                .finish_non_exhaustive(),
            SignInAction::SignInDuplicate { user, replace } => f
                .debug_struct("SignInDuplicate")
                .field("user_id", &user.id)
                .field("replace", replace)
                .finish(),
            SignInAction::Cancel => f.write_str("Cancel"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SignInState {
    #[default]
    Initial,
    SigningIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignInBackground {
    GettingPublicData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInEvent {
    /// The user is already stored on this device with a live token. Carries
    /// the stored record with the freshly issued token.
    DuplicateUser(UserState),
    Error(CoreError),
    SignedIn(UserState),
}

#[derive(Debug, Clone)]
pub struct SignInFields {
    pub quick_connect_enabled: Published<bool>,
    pub public_users: Published<Vec<UserDto>>,
    pub server_disclaimer: Published<Option<String>>,
}

#[derive(Debug)]
enum SignInOutcome {
    SignedIn(UserState),
    Duplicate(UserState),
}

#[derive(Debug)]
struct PublicData {
    quick_connect_enabled: bool,
    public_users: Vec<UserDto>,
    disclaimer: Option<String>,
}

/// Signs a user in to one server and records them on this device.
pub struct UserSignInViewModel {
    api: Arc<dyn MediaServerApi>,
    server_id: ServerId,
    store: Arc<dyn UserStore>,
    notifier: Arc<dyn ChangeNotifier>,
    quick_connect_enabled: Published<bool>,
    public_users: Published<Vec<UserDto>>,
    server_disclaimer: Published<Option<String>>,
}

impl fmt::Debug for UserSignInViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSignInViewModel")
            .field("server_id", &self.server_id)
            .field("quick_connect_enabled", &*self.quick_connect_enabled.borrow())
            .field("public_users", &self.public_users.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Trim whitespace and object replacement characters pasted in by some
/// keyboards.
fn clean_credential(value: &str) -> String {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{FFFC}')
        .to_string()
}

fn internal_error() -> CoreError {
    CoreError::validation(INTERNAL_ERROR)
}

/// Decide what a successful authentication means for this device.
async fn resolve_user(
    store: &dyn UserStore,
    server_id: ServerId,
    authentication: AuthenticationResult,
    policy: UserAccessPolicy,
) -> TaskResult<SignInOutcome> {
    let AuthenticationResult {
        user, access_token, ..
    } = authentication;
    let (Some(user), Some(access_token)) = (user, access_token) else {
        warn!("authentication response is missing user data");
        return Err(internal_error().into());
    };
    let Some(id) = user.id else {
        warn!("authentication response is missing the user id");
        return Err(internal_error().into());
    };

    match store.user(id).await? {
        Some(existing) if existing.needs_reauthentication() => {
            let updated = store.update_access_token(id, &access_token).await?;
            Ok(SignInOutcome::SignedIn(updated))
        }
        Some(mut existing) => {
            existing.access_token = access_token;
            existing.data = Some(user);
            Ok(SignInOutcome::Duplicate(existing))
        }
        None => {
            let Some(username) = user.name.clone() else {
                warn!(%id, "authentication response is missing the user name");
                return Err(internal_error().into());
            };
            let mut state = UserState::new(id, server_id, username);
            state.access_token = access_token;
            state.access_policy = policy;
            state.data = Some(user);
            store.save_user(state.clone()).await?;
            Ok(SignInOutcome::SignedIn(state))
        }
    }
}

impl UserSignInViewModel {
    pub fn new(
        api: Arc<dyn MediaServerApi>,
        server_id: ServerId,
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            api,
            server_id,
            store,
            notifier,
            quick_connect_enabled: Published::new(false),
            public_users: Published::default(),
            server_disclaimer: Published::default(),
        }
    }

    fn signed_in(&self, user: UserState, cx: &mut Context<Self>) {
        info!(user_id = %user.id, server_id = %user.server_id, "user signed in");
        self.notifier.post(ResourceChanged::UserSignedIn(user.id));
        cx.emit(SignInEvent::SignedIn(user));
    }

    fn get_public_data(&self, cx: &mut Context<Self>) {
        let api = Arc::clone(&self.api);
        let work = async move {
            let quick_connect_enabled = api.quick_connect_enabled().await?;
            let public_users = api.public_users().await?;
            let disclaimer = api
                .branding_options()
                .await?
                .login_disclaimer
                .filter(|disclaimer| !disclaimer.is_empty());
            Ok::<_, TaskError>(PublicData {
                quick_connect_enabled,
                public_users,
                disclaimer,
            })
        };

        cx.spawn_fallible(
            PUBLIC_DATA,
            [SignInBackground::GettingPublicData],
            work,
            |this: &mut Self, result, _| match result {
                Ok(data) => {
                    this.quick_connect_enabled.set(data.quick_connect_enabled);
                    this.public_users.set(data.public_users);
                    this.server_disclaimer.set(data.disclaimer);
                }
                Err(err) => {
                    debug!(error = %err, "public server data unavailable");
                }
            },
        );
    }

    /// Authenticate with `authenticate`, then resolve the user against the
    /// store.
    fn sign_in<Fut>(
        &self,
        authenticate: Fut,
        policy: UserAccessPolicy,
        cx: &mut Context<Self>,
    ) where
        Fut: Future<Output = TaskResult<AuthenticationResult>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let server_id = self.server_id;
        let work = async move {
            let authentication = authenticate.await?;
            resolve_user(store.as_ref(), server_id, authentication, policy).await
        };

        cx.spawn_fallible(
            SIGN_IN,
            [],
            work,
            |this: &mut Self, result, cx| {
                match result {
                    Ok(SignInOutcome::SignedIn(user)) => this.signed_in(user, cx),
                    Ok(SignInOutcome::Duplicate(user)) => {
                        debug!(user_id = %user.id, "user already signed in on this device");
                        cx.emit(SignInEvent::DuplicateUser(user));
                    }
                    Err(err) => {
                        warn!(error = %err, "sign in failed");
                        cx.emit(SignInEvent::Error(err));
                    }
                }
                cx.set_state(SignInState::Initial);
            },
        );
    }

    fn replace_token(&self, user: UserState, cx: &mut Context<Self>) {
        let store = Arc::clone(&self.store);
        let work = async move {
            let updated =
                store.update_access_token(user.id, &user.access_token).await?;
            Ok::<_, TaskError>(updated)
        };

        cx.spawn_fallible(
            SIGN_IN,
            [],
            work,
            |this: &mut Self, result, cx| match result {
                Ok(user) => this.signed_in(user, cx),
                Err(err) => {
                    warn!(error = %err, "replacing access token failed");
                    cx.emit(SignInEvent::Error(err));
                }
            },
        );
    }
}

impl Reducer for UserSignInViewModel {
    type Action = SignInAction;
    type State = SignInState;
    type Event = SignInEvent;
    type Background = SignInBackground;
    type Fields = SignInFields;

    fn fields(&self) -> SignInFields {
        SignInFields {
            quick_connect_enabled: self.quick_connect_enabled.clone(),
            public_users: self.public_users.clone(),
            server_disclaimer: self.server_disclaimer.clone(),
        }
    }

    fn respond(
        &mut self,
        action: SignInAction,
        cx: &mut Context<Self>,
    ) -> SignInState {
        match action {
            SignInAction::GetPublicData => {
                self.get_public_data(cx);
                cx.state()
            }
            SignInAction::SignIn {
                username,
                password,
                policy,
            } => {
                let api = Arc::clone(&self.api);
                let username = clean_credential(&username);
                let password = clean_credential(&password);
                let authenticate = async move {
                    Ok::<_, TaskError>(
                        api.authenticate_by_name(&username, &password).await?,
                    )
                };
                self.sign_in(authenticate, policy, cx);
                SignInState::SigningIn
            }
            SignInAction::SignInQuickConnect { secret, policy } => {
                let api = Arc::clone(&self.api);
                let authenticate = async move {
                    Ok::<_, TaskError>(
                        api.authenticate_with_quick_connect(&secret).await?,
                    )
                };
                self.sign_in(authenticate, policy, cx);
                SignInState::SigningIn
            }
            SignInAction::SignInDuplicate { user, replace } => {
                if replace {
                    self.replace_token(user, cx);
                } else {
                    self.signed_in(user, cx);
                }
                cx.state()
            }
            SignInAction::Cancel => {
                cx.cancel(SIGN_IN);
                SignInState::Initial
            }
        }
    }
}
