use std::fmt;
use std::sync::Arc;

use finview_contracts::api::MediaServerApi;
use finview_model::ids::{ServerId, UserId};

/// Identity and transport a view-model acts with.
///
/// Handed to every view-model at construction; nothing reads a global
/// current session.
#[derive(Clone)]
pub struct UserSession {
    api: Arc<dyn MediaServerApi>,
    user_id: UserId,
    server_id: ServerId,
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("server_id", &self.server_id)
            .finish_non_exhaustive()
    }
}

impl UserSession {
    pub fn new(
        api: Arc<dyn MediaServerApi>,
        user_id: UserId,
        server_id: ServerId,
    ) -> Self {
        Self {
            api,
            user_id,
            server_id,
        }
    }

    pub fn api(&self) -> &Arc<dyn MediaServerApi> {
        &self.api
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn server_id(&self) -> ServerId {
        self.server_id
    }
}
