use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use finview_contracts::api::{ApiResult, MediaServerApi};
use finview_contracts::error::ApiError;
use finview_model::prelude::*;
use tokio::sync::oneshot;

/// Server endpoint a [`StubApi`] response is scripted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    LiveTvChannels,
    LiveTvPrograms,
    Items,
    NextUp,
    ResumeItems,
    UserViews,
    Item,
    UpdateItem,
    Studios,
    Tags,
    RemoteImages,
    DownloadRemoteImage,
    SetItemImage,
    DeleteItemImage,
    MarkPlayed,
    MarkUnplayed,
    Sessions,
    CurrentUser,
    UpdateUserPassword,
    AuthenticateByName,
    AuthenticateWithQuickConnect,
    PublicUsers,
    BrandingOptions,
    QuickConnectEnabled,
}

/// A request the stub received, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    LiveTvChannels(ChannelsQuery),
    LiveTvPrograms(ProgramsQuery),
    Items(ItemsQuery),
    NextUp(NextUpQuery),
    ResumeItems(UserId, ResumeQuery),
    UserViews(UserId),
    Item(UserId, ItemId),
    UpdateItem(ItemId, Box<BaseItem>),
    Studios,
    Tags(UserId),
    RemoteImages(ItemId, RemoteImagesQuery),
    DownloadRemoteImage {
        item_id: ItemId,
        image_type: ImageType,
        url: String,
    },
    SetItemImage {
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
        data: Vec<u8>,
    },
    DeleteItemImage {
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
    },
    MarkPlayed(UserId, ItemId),
    MarkUnplayed(UserId, ItemId),
    Sessions(u32),
    CurrentUser,
    UpdateUserPassword {
        user_id: UserId,
        current: String,
        new: String,
    },
    AuthenticateByName {
        username: String,
        password: String,
    },
    AuthenticateWithQuickConnect(String),
    PublicUsers,
    BrandingOptions,
    QuickConnectEnabled,
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiCall::LiveTvChannels(_) => Endpoint::LiveTvChannels,
            ApiCall::LiveTvPrograms(_) => Endpoint::LiveTvPrograms,
            ApiCall::Items(_) => Endpoint::Items,
            ApiCall::NextUp(_) => Endpoint::NextUp,
            ApiCall::ResumeItems(..) => Endpoint::ResumeItems,
            ApiCall::UserViews(_) => Endpoint::UserViews,
            ApiCall::Item(..) => Endpoint::Item,
            ApiCall::UpdateItem(..) => Endpoint::UpdateItem,
            ApiCall::Studios => Endpoint::Studios,
            ApiCall::Tags(_) => Endpoint::Tags,
            ApiCall::RemoteImages(..) => Endpoint::RemoteImages,
            ApiCall::DownloadRemoteImage { .. } => Endpoint::DownloadRemoteImage,
            ApiCall::SetItemImage { .. } => Endpoint::SetItemImage,
            ApiCall::DeleteItemImage { .. } => Endpoint::DeleteItemImage,
            ApiCall::MarkPlayed(..) => Endpoint::MarkPlayed,
            ApiCall::MarkUnplayed(..) => Endpoint::MarkUnplayed,
            ApiCall::Sessions(_) => Endpoint::Sessions,
            ApiCall::CurrentUser => Endpoint::CurrentUser,
            ApiCall::UpdateUserPassword { .. } => Endpoint::UpdateUserPassword,
            ApiCall::AuthenticateByName { .. } => Endpoint::AuthenticateByName,
            ApiCall::AuthenticateWithQuickConnect(_) => {
                Endpoint::AuthenticateWithQuickConnect
            }
            ApiCall::PublicUsers => Endpoint::PublicUsers,
            ApiCall::BrandingOptions => Endpoint::BrandingOptions,
            ApiCall::QuickConnectEnabled => Endpoint::QuickConnectEnabled,
        }
    }
}

/// Holds a scripted response back until opened. Dropping it also lets the
/// response through.
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

struct Scripted {
    result: Box<dyn Any + Send>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct Inner {
    scripts: HashMap<Endpoint, VecDeque<Scripted>>,
    calls: Vec<ApiCall>,
}

/// Scripted [`MediaServerApi`] for tests.
///
/// Responses are queued per endpoint and consumed in order. With nothing
/// queued, list endpoints answer with an empty page, mutations succeed,
/// and single-resource lookups fail with `NotFound`.
#[derive(Clone, Default)]
pub struct StubApi {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for StubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("StubApi")
            .field("calls", &inner.calls.len())
            .field("scripted_endpoints", &inner.scripts.len())
            .finish()
    }
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the next response for `endpoint`.
    pub fn push<T: Send + 'static>(
        &self,
        endpoint: Endpoint,
        result: ApiResult<T>,
    ) {
        self.enqueue(endpoint, result, None);
    }

    /// Queue a response that is only delivered once the returned gate is
    /// opened.
    pub fn push_gated<T: Send + 'static>(
        &self,
        endpoint: Endpoint,
        result: ApiResult<T>,
    ) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.enqueue(endpoint, result, Some(rx));
        Gate(tx)
    }

    pub fn push_page(&self, endpoint: Endpoint, items: Vec<BaseItem>) {
        self.push(endpoint, Ok(ItemPage::new(items)));
    }

    fn enqueue<T: Send + 'static>(
        &self,
        endpoint: Endpoint,
        result: ApiResult<T>,
        gate: Option<oneshot::Receiver<()>>,
    ) {
        self.lock()
            .scripts
            .entry(endpoint)
            .or_default()
            .push_back(Scripted {
                result: Box::new(result),
                gate,
            });
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<ApiCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls_to(endpoint).len()
    }

    async fn answer<T: Send + 'static>(
        &self,
        call: ApiCall,
        fallback: impl FnOnce() -> ApiResult<T>,
    ) -> ApiResult<T> {
        let endpoint = call.endpoint();
        let scripted = {
            let mut inner = self.lock();
            inner.calls.push(call);
            inner
                .scripts
                .get_mut(&endpoint)
                .and_then(VecDeque::pop_front)
        };

        let Some(Scripted { result, gate }) = scripted else {
            return fallback();
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match result.downcast::<ApiResult<T>>() {
            Ok(result) => *result,
            Err(_) => Err(ApiError::InvalidRequest(format!(
                "response scripted for {endpoint:?} has the wrong type"
            ))),
        }
    }
}

fn empty_page() -> ApiResult<ItemPage<BaseItem>> {
    Ok(ItemPage::default())
}

fn not_found<T>(what: &str) -> ApiResult<T> {
    Err(ApiError::NotFound(what.to_string()))
}

#[async_trait]
impl MediaServerApi for StubApi {
    async fn live_tv_channels(
        &self,
        query: &ChannelsQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::LiveTvChannels(query.clone()), empty_page)
            .await
    }

    async fn live_tv_programs(
        &self,
        query: &ProgramsQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::LiveTvPrograms(query.clone()), empty_page)
            .await
    }

    async fn items(&self, query: &ItemsQuery) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::Items(query.clone()), empty_page).await
    }

    async fn next_up(
        &self,
        query: &NextUpQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::NextUp(query.clone()), empty_page).await
    }

    async fn resume_items(
        &self,
        user_id: UserId,
        query: &ResumeQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::ResumeItems(user_id, query.clone()), empty_page)
            .await
    }

    async fn user_views(
        &self,
        user_id: UserId,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::UserViews(user_id), empty_page).await
    }

    async fn item(&self, user_id: UserId, item_id: ItemId) -> ApiResult<BaseItem> {
        self.answer(ApiCall::Item(user_id, item_id), || {
            not_found(&format!("item {item_id}"))
        })
        .await
    }

    async fn update_item(
        &self,
        item_id: ItemId,
        item: &BaseItem,
    ) -> ApiResult<()> {
        self.answer(ApiCall::UpdateItem(item_id, Box::new(item.clone())), || {
            Ok(())
        })
        .await
    }

    async fn studios(&self) -> ApiResult<ItemPage<BaseItem>> {
        self.answer(ApiCall::Studios, empty_page).await
    }

    async fn tags(&self, user_id: UserId) -> ApiResult<Vec<String>> {
        self.answer(ApiCall::Tags(user_id), || Ok(Vec::new())).await
    }

    async fn remote_images(
        &self,
        item_id: ItemId,
        query: &RemoteImagesQuery,
    ) -> ApiResult<RemoteImageResult> {
        self.answer(ApiCall::RemoteImages(item_id, query.clone()), || {
            Ok(RemoteImageResult::default())
        })
        .await
    }

    async fn download_remote_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        image_url: &str,
    ) -> ApiResult<Vec<u8>> {
        let call = ApiCall::DownloadRemoteImage {
            item_id,
            image_type,
            url: image_url.to_string(),
        };
        self.answer(call, || not_found(image_url)).await
    }

    async fn set_item_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
        data: Vec<u8>,
    ) -> ApiResult<()> {
        let call = ApiCall::SetItemImage {
            item_id,
            image_type,
            index,
            data,
        };
        self.answer(call, || Ok(())).await
    }

    async fn delete_item_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
    ) -> ApiResult<()> {
        let call = ApiCall::DeleteItemImage {
            item_id,
            image_type,
            index,
        };
        self.answer(call, || Ok(())).await
    }

    async fn mark_played(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> ApiResult<()> {
        self.answer(ApiCall::MarkPlayed(user_id, item_id), || Ok(()))
            .await
    }

    async fn mark_unplayed(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> ApiResult<()> {
        self.answer(ApiCall::MarkUnplayed(user_id, item_id), || Ok(()))
            .await
    }

    async fn sessions(
        &self,
        active_within_seconds: u32,
    ) -> ApiResult<Vec<SessionInfo>> {
        self.answer(ApiCall::Sessions(active_within_seconds), || Ok(Vec::new()))
            .await
    }

    async fn current_user(&self) -> ApiResult<UserDto> {
        self.answer(ApiCall::CurrentUser, || not_found("current user"))
            .await
    }

    async fn update_user_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let call = ApiCall::UpdateUserPassword {
            user_id,
            current: current_password.to_string(),
            new: new_password.to_string(),
        };
        self.answer(call, || Ok(())).await
    }

    async fn authenticate_by_name(
        &self,
        username: &str,
        password: &str,
    ) -> ApiResult<AuthenticationResult> {
        let call = ApiCall::AuthenticateByName {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.answer(call, || Err(ApiError::Unauthorized)).await
    }

    async fn authenticate_with_quick_connect(
        &self,
        secret: &str,
    ) -> ApiResult<AuthenticationResult> {
        let call = ApiCall::AuthenticateWithQuickConnect(secret.to_string());
        self.answer(call, || Err(ApiError::Unauthorized)).await
    }

    async fn public_users(&self) -> ApiResult<Vec<UserDto>> {
        self.answer(ApiCall::PublicUsers, || Ok(Vec::new())).await
    }

    async fn branding_options(&self) -> ApiResult<BrandingOptions> {
        self.answer(ApiCall::BrandingOptions, || {
            Ok(BrandingOptions::default())
        })
        .await
    }

    async fn quick_connect_enabled(&self) -> ApiResult<bool> {
        self.answer(ApiCall::QuickConnectEnabled, || Ok(false)).await
    }
}
