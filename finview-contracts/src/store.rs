use async_trait::async_trait;

use finview_model::ids::UserId;
use finview_model::user::UserState;

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Device-local record of signed-in users. Keychain and database details
/// live behind this trait.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user(&self, id: UserId) -> StoreResult<Option<UserState>>;

    /// Persist a newly signed-in user under its server.
    async fn save_user(&self, user: UserState) -> StoreResult<()>;

    /// Replace the stored access token and return the updated record.
    async fn update_access_token(
        &self,
        id: UserId,
        access_token: &str,
    ) -> StoreResult<UserState>;
}
