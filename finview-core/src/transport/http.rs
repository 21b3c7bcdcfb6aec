use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use finview_config::ServerConfig;
use finview_contracts::api::{ApiResult, MediaServerApi};
use finview_contracts::error::ApiError;
use finview_model::prelude::*;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

type Params = Vec<(&'static str, String)>;

/// Values sent in the `MediaBrowser` authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ClientIdentity {
    client: String,
    device: String,
    device_id: String,
    version: String,
}

impl ClientIdentity {
    fn header(&self, token: Option<&str>) -> String {
        let mut header = format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            self.client, self.device, self.device_id, self.version
        );
        if let Some(token) = token {
            header.push_str(&format!(r#", Token="{token}""#));
        }
        header
    }
}

/// [`MediaServerApi`] over the server's REST interface.
#[derive(Clone)]
pub struct HttpMediaServerClient {
    client: Client,
    base_url: Url,
    identity: ClientIdentity,
    token: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for HttpMediaServerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMediaServerClient")
            .field("base_url", &self.base_url.as_str())
            .field("identity", &self.identity)
            .field(
                "has_token",
                &self
                    .token
                    .try_read()
                    .map(|token| token.is_some())
                    .unwrap_or(false),
            )
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticateByName<'a> {
    username: &'a str,
    pw: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct QuickConnectSecret<'a> {
    secret: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateUserPassword<'a> {
    current_pw: &'a str,
    new_pw: &'a str,
}

/// The subset of `/Items/Filters` the tag editor reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ItemFilters {
    tags: Option<Vec<String>>,
}

impl HttpMediaServerClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        info!(base_url = %config.base_url, "creating media server client");

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            identity: ClientIdentity {
                client: config.client_name.clone(),
                device: config.device_name.clone(),
                device_id: config.device_id.clone(),
                version: config.client_version.clone(),
            },
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Token sent with every following request. `None` signs the client out.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn access_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// `path` under the server base URL, keeping any base path prefix.
    fn url(&self, path: &str) -> ApiResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|err| ApiError::InvalidRequest(format!("{joined}: {err}")))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
    ) -> ApiResult<RequestBuilder> {
        let url = self.url(path)?;
        let token = self.token.read().await;
        debug!(%method, path, "server request");
        Ok(self
            .client
            .request(method, url)
            .query(params)
            .header("Authorization", self.identity.header(token.as_deref())))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> ApiResult<T> {
        let request = self.request(Method::GET, path, params).await?;
        decode(execute(request).await?).await
    }

    /// Send a request whose response body is ignored.
    async fn send(&self, request: RequestBuilder) -> ApiResult<()> {
        execute(request).await.map(|_| ())
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.request(Method::POST, path, &[]).await?.json(body);
        decode(execute(request).await?).await
    }
}

async fn execute(request: RequestBuilder) -> ApiResult<Response> {
    let response = request.send().await.map_err(map_reqwest)?;
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => {
            Err(ApiError::NotFound(response.url().path().to_string()))
        }
        status => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, body = %message, "server request failed");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await.map_err(map_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

fn map_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

fn join<T>(values: &[T], render: impl Fn(&T) -> String) -> String {
    values.iter().map(render).collect::<Vec<_>>().join(",")
}

/// Push `key=value` for non-empty lists only.
fn push_list<T>(
    params: &mut Params,
    key: &'static str,
    values: &[T],
    render: impl Fn(&T) -> String,
) {
    if !values.is_empty() {
        params.push((key, join(values, render)));
    }
}

fn sort_by(values: &[ItemSortBy]) -> String {
    join(values, |sort| sort.as_str().to_string())
}

fn channels_params(query: &ChannelsQuery) -> Params {
    let mut params = vec![("startIndex", query.start_index.to_string())];
    if let Some(user_id) = query.user_id {
        params.push(("userId", user_id.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if !query.sort_by.is_empty() {
        params.push(("sortBy", sort_by(&query.sort_by)));
    }
    push_list(&mut params, "fields", &query.fields, |f| f.as_str().to_string());
    params
}

fn programs_params(query: &ProgramsQuery) -> Params {
    let mut params = Vec::new();
    push_list(&mut params, "channelIds", &query.channel_ids, |id| {
        id.to_string()
    });
    if let Some(user_id) = query.user_id {
        params.push(("userId", user_id.to_string()));
    }
    if let Some(min_end) = query.min_end_date {
        params.push(("minEndDate", min_end.to_rfc3339()));
    }
    if let Some(max_start) = query.max_start_date {
        params.push(("maxStartDate", max_start.to_rfc3339()));
    }
    if !query.sort_by.is_empty() {
        params.push(("sortBy", sort_by(&query.sort_by)));
    }
    params
}

fn items_params(query: &ItemsQuery) -> Params {
    let mut params = vec![("startIndex", query.start_index.to_string())];
    if let Some(user_id) = query.user_id {
        params.push(("userId", user_id.to_string()));
    }
    if let Some(parent_id) = query.parent_id {
        params.push(("parentId", parent_id.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if query.recursive {
        params.push(("recursive", "true".to_string()));
    }
    push_list(&mut params, "includeItemTypes", &query.include_item_types, |k| {
        k.as_str().to_string()
    });
    if !query.sort_by.is_empty() {
        params.push(("sortBy", sort_by(&query.sort_by)));
        params.push(("sortOrder", query.sort_order.as_str().to_string()));
    }
    if let Some(is_favorite) = query.is_favorite {
        params.push(("isFavorite", is_favorite.to_string()));
    }
    push_list(&mut params, "fields", &query.fields, |f| f.as_str().to_string());
    params
}

fn next_up_params(query: &NextUpQuery) -> Params {
    let mut params = vec![("startIndex", query.start_index.to_string())];
    if let Some(user_id) = query.user_id {
        params.push(("userId", user_id.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    push_list(&mut params, "fields", &query.fields, |f| f.as_str().to_string());
    params
}

fn resume_params(query: &ResumeQuery) -> Params {
    let mut params = vec![("enableUserData", query.enable_user_data.to_string())];
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    push_list(&mut params, "includeItemTypes", &query.include_item_types, |k| {
        k.as_str().to_string()
    });
    push_list(&mut params, "fields", &query.fields, |f| f.as_str().to_string());
    params
}

fn remote_images_params(query: &RemoteImagesQuery) -> Params {
    vec![
        ("type", query.image_type.as_str().to_string()),
        ("startIndex", query.start_index.to_string()),
        ("limit", query.limit.to_string()),
        ("includeAllLanguages", query.include_all_languages.to_string()),
    ]
}

fn image_path(item_id: ItemId, image_type: ImageType, index: Option<u32>) -> String {
    match index {
        Some(index) => format!("Items/{item_id}/Images/{image_type}/{index}"),
        None => format!("Items/{item_id}/Images/{image_type}"),
    }
}

/// Content type of an uploaded image, sniffed from its leading bytes.
fn image_content_type(data: &[u8]) -> &'static str {
    match data {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
            "image/webp"
        }
        _ => "image/jpeg",
    }
}

#[async_trait]
impl MediaServerApi for HttpMediaServerClient {
    async fn live_tv_channels(
        &self,
        query: &ChannelsQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.get("LiveTv/Channels", &channels_params(query)).await
    }

    async fn live_tv_programs(
        &self,
        query: &ProgramsQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.get("LiveTv/Programs", &programs_params(query)).await
    }

    async fn items(&self, query: &ItemsQuery) -> ApiResult<ItemPage<BaseItem>> {
        self.get("Items", &items_params(query)).await
    }

    async fn next_up(
        &self,
        query: &NextUpQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.get("Shows/NextUp", &next_up_params(query)).await
    }

    async fn resume_items(
        &self,
        user_id: UserId,
        query: &ResumeQuery,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.get(
            &format!("Users/{user_id}/Items/Resume"),
            &resume_params(query),
        )
        .await
    }

    async fn user_views(
        &self,
        user_id: UserId,
    ) -> ApiResult<ItemPage<BaseItem>> {
        self.get(&format!("Users/{user_id}/Views"), &[]).await
    }

    async fn item(&self, user_id: UserId, item_id: ItemId) -> ApiResult<BaseItem> {
        self.get(&format!("Users/{user_id}/Items/{item_id}"), &[])
            .await
    }

    async fn update_item(
        &self,
        item_id: ItemId,
        item: &BaseItem,
    ) -> ApiResult<()> {
        let request = self
            .request(Method::POST, &format!("Items/{item_id}"), &[])
            .await?
            .json(item);
        self.send(request).await
    }

    async fn studios(&self) -> ApiResult<ItemPage<BaseItem>> {
        self.get("Studios", &[]).await
    }

    async fn tags(&self, user_id: UserId) -> ApiResult<Vec<String>> {
        let filters: ItemFilters = self
            .get("Items/Filters", &[("userId", user_id.to_string())])
            .await?;
        Ok(filters.tags.unwrap_or_default())
    }

    async fn remote_images(
        &self,
        item_id: ItemId,
        query: &RemoteImagesQuery,
    ) -> ApiResult<RemoteImageResult> {
        self.get(
            &format!("Items/{item_id}/RemoteImages"),
            &remote_images_params(query),
        )
        .await
    }

    async fn download_remote_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        image_url: &str,
    ) -> ApiResult<Vec<u8>> {
        let url = Url::parse(image_url).map_err(|err| {
            ApiError::InvalidRequest(format!("{image_url}: {err}"))
        })?;
        debug!(%item_id, %image_type, %url, "downloading remote image");
        let response = execute(self.client.get(url)).await?;
        let bytes = response.bytes().await.map_err(map_reqwest)?;
        Ok(bytes.to_vec())
    }

    async fn set_item_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
        data: Vec<u8>,
    ) -> ApiResult<()> {
        let content_type = image_content_type(&data);
        let request = self
            .request(Method::POST, &image_path(item_id, image_type, index), &[])
            .await?
            .header("Content-Type", content_type)
            .body(STANDARD.encode(&data));
        self.send(request).await
    }

    async fn delete_item_image(
        &self,
        item_id: ItemId,
        image_type: ImageType,
        index: Option<u32>,
    ) -> ApiResult<()> {
        let request = self
            .request(Method::DELETE, &image_path(item_id, image_type, index), &[])
            .await?;
        self.send(request).await
    }

    async fn mark_played(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> ApiResult<()> {
        let path = format!("Users/{user_id}/PlayedItems/{item_id}");
        let request = self.request(Method::POST, &path, &[]).await?;
        self.send(request).await
    }

    async fn mark_unplayed(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> ApiResult<()> {
        let path = format!("Users/{user_id}/PlayedItems/{item_id}");
        let request = self.request(Method::DELETE, &path, &[]).await?;
        self.send(request).await
    }

    async fn sessions(
        &self,
        active_within_seconds: u32,
    ) -> ApiResult<Vec<SessionInfo>> {
        self.get(
            "Sessions",
            &[("activeWithinSeconds", active_within_seconds.to_string())],
        )
        .await
    }

    async fn current_user(&self) -> ApiResult<UserDto> {
        self.get("Users/Me", &[]).await
    }

    async fn update_user_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let body = UpdateUserPassword {
            current_pw: current_password,
            new_pw: new_password,
        };
        let request = self
            .request(Method::POST, &format!("Users/{user_id}/Password"), &[])
            .await?
            .json(&body);
        self.send(request).await
    }

    async fn authenticate_by_name(
        &self,
        username: &str,
        password: &str,
    ) -> ApiResult<AuthenticationResult> {
        let body = AuthenticateByName {
            username,
            pw: password,
        };
        self.post_json("Users/AuthenticateByName", &body).await
    }

    async fn authenticate_with_quick_connect(
        &self,
        secret: &str,
    ) -> ApiResult<AuthenticationResult> {
        self.post_json(
            "Users/AuthenticateWithQuickConnect",
            &QuickConnectSecret { secret },
        )
        .await
    }

    async fn public_users(&self) -> ApiResult<Vec<UserDto>> {
        self.get("Users/Public", &[]).await
    }

    async fn branding_options(&self) -> ApiResult<BrandingOptions> {
        self.get("Branding/Configuration", &[]).await
    }

    async fn quick_connect_enabled(&self) -> ApiResult<bool> {
        self.get("QuickConnect/Enabled", &[]).await
    }
}
