use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use finview_contracts::notify::{ChangeNotifier, ResourceChanged};
use finview_model::prelude::*;
use tracing::{debug, warn};

use crate::error::{CoreError, TaskError, TaskResult};
use crate::paging::{PageFetcher, PageRequest, Pager};
use crate::reducer::{Context, Published, Reducer, TaskSlot};
use crate::session::UserSession;

/// Paging and mutations share one slot: any action supersedes the last.
const IMAGES: TaskSlot = TaskSlot::new("remote-images");

const NO_IMAGE_DATA: &str = "No image data provided or downloaded.";

fn missing_item_id() -> CoreError {
    CoreError::validation("item has no identifier")
}

/// Remote image candidates from metadata providers for one item and type.
#[derive(Debug, Clone)]
pub struct RemoteImagesFetcher {
    session: UserSession,
    item_id: Option<ItemId>,
    image_type: ImageType,
    include_all_languages: bool,
    page_size: u32,
}

#[async_trait]
impl PageFetcher for RemoteImagesFetcher {
    type Item = RemoteImageInfo;

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn fetch_page(
        &self,
        request: PageRequest,
    ) -> TaskResult<Vec<RemoteImageInfo>> {
        let item_id = self.item_id.ok_or_else(missing_item_id)?;
        let query = RemoteImagesQuery {
            image_type: self.image_type,
            start_index: request.start_index,
            limit: request.limit,
            include_all_languages: self.include_all_languages,
        };
        let result = self.session.api().remote_images(item_id, &query).await?;
        Ok(result.images.unwrap_or_default())
    }
}

/// Which image of which item the screen edits.
#[derive(Debug, Clone)]
pub struct ImageTarget {
    pub item: BaseItem,
    pub image_type: ImageType,
    /// Addresses one image of an indexed type such as backdrops.
    pub image_index: Option<u32>,
    pub include_all_languages: bool,
}

impl ImageTarget {
    pub fn new(item: BaseItem, image_type: ImageType) -> Self {
        Self {
            item,
            image_type,
            image_index: None,
            include_all_languages: false,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.image_index = Some(index);
        self
    }

    pub fn all_languages(mut self, include: bool) -> Self {
        self.include_all_languages = include;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteImageAction {
    Refresh,
    GetNextPage,
    /// Upload `data`, or the image at `url` when no bytes are given.
    SetImage {
        url: Option<String>,
        data: Option<Vec<u8>>,
    },
    DeleteImage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RemoteImageState {
    #[default]
    Initial,
    Content,
    Error(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteImageBackground {
    GettingNextPage,
    Refreshing,
    Updating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteImageEvent {
    Updated,
    Error(CoreError),
}

#[derive(Debug, Clone)]
pub struct RemoteImageFields {
    /// Server copy of the item, replaced wholesale after each mutation.
    pub item: Published<BaseItem>,
    pub images: Published<Vec<RemoteImageInfo>>,
}

pub struct RemoteItemImageViewModel {
    session: UserSession,
    notifier: Arc<dyn ChangeNotifier>,
    item: Published<BaseItem>,
    image_type: ImageType,
    image_index: Option<u32>,
    pager: Pager<RemoteImagesFetcher>,
}

impl fmt::Debug for RemoteItemImageViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteItemImageViewModel")
            .field("item_id", &self.item.borrow().id)
            .field("image_type", &self.image_type)
            .field("image_index", &self.image_index)
            .field("pager", &self.pager)
            .finish()
    }
}

impl RemoteItemImageViewModel {
    pub fn new(
        session: UserSession,
        notifier: Arc<dyn ChangeNotifier>,
        target: ImageTarget,
        page_size: u32,
    ) -> Result<Self, CoreError> {
        let fetcher = RemoteImagesFetcher {
            session: session.clone(),
            item_id: target.item.id,
            image_type: target.image_type,
            include_all_languages: target.include_all_languages,
            page_size,
        };
        Ok(Self {
            session,
            notifier,
            item: Published::new(target.item),
            image_type: target.image_type,
            image_index: target.image_index,
            pager: Pager::new(fetcher)?,
        })
    }

    fn item_id(&self) -> Option<ItemId> {
        self.item.borrow().id
    }

    fn fail(err: CoreError, cx: &mut Context<Self>) {
        warn!(error = %err, "remote image action failed");
        cx.set_state(RemoteImageState::Error(err.clone()));
        cx.emit(RemoteImageEvent::Error(err));
    }

    fn load_next(
        &mut self,
        marker: RemoteImageBackground,
        cx: &mut Context<Self>,
    ) {
        let Some(request) = self.pager.next_request() else {
            return;
        };
        cx.spawn_fallible(
            IMAGES,
            [marker],
            self.pager.load(request),
            |this: &mut Self, result, cx| match result {
                Ok(images) => {
                    this.pager.apply(images);
                    cx.set_state(RemoteImageState::Content);
                    cx.emit(RemoteImageEvent::Updated);
                }
                Err(err) => Self::fail(err, cx),
            },
        );
    }

    fn set_image(
        &mut self,
        item_id: ItemId,
        url: Option<String>,
        data: Option<Vec<u8>>,
        cx: &mut Context<Self>,
    ) {
        let api = Arc::clone(self.session.api());
        let image_type = self.image_type;
        let index = self.image_index;

        let work = async move {
            let bytes = match (data, url) {
                (Some(data), _) => data,
                (None, Some(url)) => {
                    api.download_remote_image(item_id, image_type, &url).await?
                }
                (None, None) => {
                    return Err(TaskError::from(CoreError::validation(
                        NO_IMAGE_DATA,
                    )));
                }
            };
            debug!(%item_id, %image_type, ?index, bytes = bytes.len(), "uploading image");
            api.set_item_image(item_id, image_type, index, bytes).await?;
            Ok(())
        };

        cx.spawn_fallible(
            IMAGES,
            [RemoteImageBackground::Updating],
            work,
            move |this: &mut Self, result, cx| match result {
                Ok(()) => this.refresh_item(item_id, cx),
                Err(err) => Self::fail(err, cx),
            },
        );
    }

    fn delete_image(&mut self, item_id: ItemId, cx: &mut Context<Self>) {
        let api = Arc::clone(self.session.api());
        let image_type = self.image_type;
        let index = self.image_index;

        let work = async move {
            api.delete_item_image(item_id, image_type, index).await?;
            Ok::<_, TaskError>(())
        };

        cx.spawn_fallible(
            IMAGES,
            [RemoteImageBackground::Updating],
            work,
            move |this: &mut Self, result, cx| match result {
                Ok(()) => this.refresh_item(item_id, cx),
                Err(err) => Self::fail(err, cx),
            },
        );
    }

    /// Re-fetch the item after a mutation and replace the held copy.
    fn refresh_item(&mut self, item_id: ItemId, cx: &mut Context<Self>) {
        let api = Arc::clone(self.session.api());
        let user_id = self.session.user_id();

        let work = async move {
            let item = api.item(user_id, item_id).await?;
            Ok::<_, TaskError>(item)
        };

        cx.spawn_fallible(
            IMAGES,
            [RemoteImageBackground::Refreshing],
            work,
            |this: &mut Self, result, cx| match result {
                Ok(item) => {
                    this.item.set(item.clone());
                    this.notifier
                        .post(ResourceChanged::ItemMetadata(Box::new(item)));
                    cx.emit(RemoteImageEvent::Updated);
                }
                Err(err) => Self::fail(err, cx),
            },
        );
    }
}

impl Reducer for RemoteItemImageViewModel {
    type Action = RemoteImageAction;
    type State = RemoteImageState;
    type Event = RemoteImageEvent;
    type Background = RemoteImageBackground;
    type Fields = RemoteImageFields;

    fn fields(&self) -> RemoteImageFields {
        RemoteImageFields {
            item: self.item.clone(),
            images: self.pager.items(),
        }
    }

    fn respond(
        &mut self,
        action: RemoteImageAction,
        cx: &mut Context<Self>,
    ) -> RemoteImageState {
        match action {
            RemoteImageAction::Refresh => {
                cx.cancel(IMAGES);
                self.pager.reset();
                self.load_next(RemoteImageBackground::Refreshing, cx);
                RemoteImageState::Initial
            }
            RemoteImageAction::GetNextPage => {
                self.load_next(RemoteImageBackground::GettingNextPage, cx);
                cx.state()
            }
            RemoteImageAction::SetImage { url, data } => {
                match self.item_id() {
                    Some(item_id) => self.set_image(item_id, url, data, cx),
                    None => Self::fail(missing_item_id(), cx),
                }
                cx.state()
            }
            RemoteImageAction::DeleteImage => {
                match self.item_id() {
                    Some(item_id) => self.delete_image(item_id, cx),
                    None => Self::fail(missing_item_id(), cx),
                }
                cx.state()
            }
        }
    }
}
