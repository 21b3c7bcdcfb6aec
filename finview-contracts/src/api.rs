//! Media server transport contract.
//!
//! View-models never build URLs or touch HTTP. They call these typed
//! operations on an injected `Arc<dyn MediaServerApi>`; the HTTP adapter in
//! `finview-core` and the test stubs both implement it.

use async_trait::async_trait;

use finview_model::prelude::*;

use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait MediaServerApi: Send + Sync {
    // === Browsing ===

    /// One page of live TV channels.
    async fn live_tv_channels(
        &self,
        query: &ChannelsQuery,
    ) -> ApiResult<ItemPage<BaseItem>>;

    /// Guide programs for a set of channels.
    async fn live_tv_programs(
        &self,
        query: &ProgramsQuery,
    ) -> ApiResult<ItemPage<BaseItem>>;

    /// One page of library items.
    async fn items(&self, query: &ItemsQuery) -> ApiResult<ItemPage<BaseItem>>;

    /// One page of next-up episodes.
    async fn next_up(
        &self,
        query: &NextUpQuery,
    ) -> ApiResult<ItemPage<BaseItem>>;

    /// Partially watched items for the resume row.
    async fn resume_items(
        &self,
        user_id: UserId,
        query: &ResumeQuery,
    ) -> ApiResult<ItemPage<BaseItem>>;

    /// Top-level libraries visible to the user.
    async fn user_views(&self, user_id: UserId)
    -> ApiResult<ItemPage<BaseItem>>;

    /// A single item, with user data.
    async fn item(&self, user_id: UserId, item_id: ItemId) -> ApiResult<BaseItem>;

    // === Item administration ===

    /// Replace the editable metadata of an item with `item`.
    async fn update_item(&self, item_id: ItemId, item: &BaseItem)
    -> ApiResult<()>;

    /// Every studio known to the server.
    async fn studios(&self) -> ApiResult<ItemPage<BaseItem>>;

    /// Every tag used across the user's libraries.
    async fn tags(&self, user_id: UserId) -> ApiResult<Vec<String>>;

    async fn remote_images(
        &self,
        item_id: ItemId,
        query: &RemoteImagesQuery,
    ) -> ApiResult<RemoteImageResult>;

    /// Fetch the bytes of a provider image through the server.
    async fn download_remote_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        image_url: &str,
    ) -> ApiResult<Vec<u8>>;

    /// Upload an image. `index` addresses one image of an indexed type.
    async fn set_item_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
        data: Vec<u8>,
    ) -> ApiResult<()>;

    async fn delete_item_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
    ) -> ApiResult<()>;

    // === User data ===

    async fn mark_played(&self, user_id: UserId, item_id: ItemId)
    -> ApiResult<()>;

    async fn mark_unplayed(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> ApiResult<()>;

    // === Users and sessions ===

    async fn sessions(
        &self,
        active_within_seconds: u32,
    ) -> ApiResult<Vec<SessionInfo>>;

    async fn current_user(&self) -> ApiResult<UserDto>;

    async fn update_user_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()>;

    async fn authenticate_by_name(
        &self,
        username: &str,
        password: &str,
    ) -> ApiResult<AuthenticationResult>;

    async fn authenticate_with_quick_connect(
        &self,
        secret: &str,
    ) -> ApiResult<AuthenticationResult>;

    async fn public_users(&self) -> ApiResult<Vec<UserDto>>;

    async fn branding_options(&self) -> ApiResult<BrandingOptions>;

    async fn quick_connect_enabled(&self) -> ApiResult<bool>;
}
