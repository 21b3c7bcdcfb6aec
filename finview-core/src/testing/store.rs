use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use finview_contracts::error::StoreError;
use finview_contracts::store::{StoreResult, UserStore};
use finview_model::ids::UserId;
use finview_model::user::UserState;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserState>,
    failure: Option<StoreError>,
}

/// [`UserStore`] kept in memory.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, user: UserState) {
        self.lock().users.insert(user.id, user);
    }

    pub fn get(&self, id: UserId) -> Option<UserState> {
        self.lock().users.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every following write fail with `err`.
    pub fn fail_writes(&self, err: StoreError) {
        self.lock().failure = Some(err);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn user(&self, id: UserId) -> StoreResult<Option<UserState>> {
        Ok(self.get(id))
    }

    async fn save_user(&self, user: UserState) -> StoreResult<()> {
        let mut inner = self.lock();
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }
        inner.users.insert(user.id, user);
        Ok(())
    }

    async fn update_access_token(
        &self,
        id: UserId,
        access_token: &str,
    ) -> StoreResult<UserState> {
        let mut inner = self.lock();
        if let Some(err) = inner.failure.clone() {
            return Err(err);
        }
        let user = inner.users.get_mut(&id).ok_or_else(|| {
            StoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            }
        })?;
        user.access_token = access_token.to_string();
        Ok(user.clone())
    }
}
