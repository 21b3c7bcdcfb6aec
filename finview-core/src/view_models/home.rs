use std::fmt;
use std::sync::Arc;

use finview_config::HomeConfig;
use finview_contracts::api::MediaServerApi;
use finview_contracts::notify::{ChangeNotifier, ResourceChanged};
use finview_model::prelude::*;
use tracing::{debug, warn};

use super::items::{ItemsFetcher, ItemsViewModel};
use crate::error::{CoreError, TaskError, TaskResult};
use crate::paging::PagingAction;
use crate::reducer::{Context, Published, Reducer, TaskSlot, ViewModel};
use crate::session::UserSession;

const RESUME: TaskSlot = TaskSlot::new("home-resume");
const LIBRARIES: TaskSlot = TaskSlot::new("home-libraries");
const USER_DATA: TaskSlot = TaskSlot::new("home-user-data");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    Refresh,
    MarkPlayed(BaseItem),
    MarkUnplayed(BaseItem),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum HomeState {
    #[default]
    Initial,
    Refreshing,
    Content,
    Error(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HomeBackground {
    /// Reloading the resume row after a played-state change.
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeEvent {
    Error(CoreError),
}

#[derive(Debug, Clone)]
pub struct HomeFields {
    pub resume_items: Published<Vec<BaseItem>>,
    pub libraries: Published<Vec<BaseItem>>,
    pub next_up: ViewModel<ItemsViewModel>,
    pub recently_added: ViewModel<ItemsViewModel>,
}

/// Home screen: resume row, latest-media libraries, and the next-up and
/// recently-added paged rows as child view-models.
pub struct HomeViewModel {
    session: UserSession,
    notifier: Arc<dyn ChangeNotifier>,
    resume_limit: u32,
    resume_items: Published<Vec<BaseItem>>,
    libraries: Published<Vec<BaseItem>>,
    next_up: ViewModel<ItemsViewModel>,
    recently_added: ViewModel<ItemsViewModel>,
}

impl fmt::Debug for HomeViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeViewModel")
            .field("session", &self.session)
            .field("resume_limit", &self.resume_limit)
            .field("resume_items", &self.resume_items.borrow().len())
            .field("libraries", &self.libraries.borrow().len())
            .finish_non_exhaustive()
    }
}

impl HomeViewModel {
    /// Starts the child row view-models, so it must run inside a tokio
    /// runtime.
    pub fn new(
        session: UserSession,
        notifier: Arc<dyn ChangeNotifier>,
        config: &HomeConfig,
        page_size: u32,
    ) -> Result<Self, CoreError> {
        let next_up =
            ItemsFetcher::next_up(session.clone(), page_size).view_model()?;
        let recently_added =
            ItemsFetcher::recently_added(session.clone(), page_size)
                .view_model()?;

        Ok(Self {
            session,
            notifier,
            resume_limit: config.resume_limit,
            resume_items: Published::default(),
            libraries: Published::default(),
            next_up: ViewModel::new(next_up),
            recently_added: ViewModel::new(recently_added),
        })
    }

    fn refresh_children(&self) {
        for row in [&self.next_up, &self.recently_added] {
            if let Err(err) = row.try_send(PagingAction::Refresh) {
                warn!(error = %err, "could not refresh home row");
            }
        }
    }

    /// Reload the resume row. A failure only logs and leaves the row as is.
    fn refresh_resume(
        &self,
        markers: Vec<HomeBackground>,
        cx: &mut Context<Self>,
    ) {
        let api = Arc::clone(self.session.api());
        let user_id = self.session.user_id();
        let query = ResumeQuery {
            limit: Some(self.resume_limit),
            fields: ItemFields::MINIMUM.to_vec(),
            enable_user_data: true,
            include_item_types: vec![ItemKind::Movie, ItemKind::Episode],
        };
        let work = async move {
            Ok::<_, TaskError>(api.resume_items(user_id, &query).await?.items)
        };

        cx.spawn_fallible(RESUME, markers, work, |this: &mut Self, result, _| {
            match result {
                Ok(items) => {
                    debug!(resume = items.len(), "resume row loaded");
                    this.resume_items.set(items);
                }
                Err(err) => warn!(error = %err, "resume row refresh failed"),
            }
        });
    }

    /// Reload the latest-media libraries. This is the request that decides
    /// between content and error.
    fn refresh_libraries(&self, cx: &mut Context<Self>) {
        let api = Arc::clone(self.session.api());
        let user_id = self.session.user_id();
        let work = async move { latest_libraries(api.as_ref(), user_id).await };

        cx.spawn_fallible(
            LIBRARIES,
            [],
            work,
            |this: &mut Self, result, cx| match result {
                Ok(libraries) => {
                    debug!(libraries = libraries.len(), "home libraries loaded");
                    this.libraries.set(libraries);
                    cx.set_state(HomeState::Content);
                }
                Err(err) => {
                    warn!(error = %err, "home refresh failed");
                    cx.set_state(HomeState::Error(err.clone()));
                    cx.emit(HomeEvent::Error(err));
                }
            },
        );
    }

    fn set_played(
        &mut self,
        item: BaseItem,
        played: bool,
        cx: &mut Context<Self>,
    ) {
        let Some(item_id) = item.id else {
            return;
        };
        let in_resume = self
            .resume_items
            .borrow()
            .iter()
            .any(|resume| resume.id == Some(item_id));
        if !in_resume {
            debug!(%item_id, "ignoring played change outside the resume row");
            return;
        }

        let api = Arc::clone(self.session.api());
        let user_id = self.session.user_id();
        let work = async move {
            if played {
                api.mark_played(user_id, item_id).await?;
            } else {
                api.mark_unplayed(user_id, item_id).await?;
            }
            Ok::<_, TaskError>(())
        };

        cx.spawn_fallible(
            USER_DATA,
            [HomeBackground::Refreshing],
            work,
            move |this: &mut Self, result, cx| match result {
                Ok(()) => {
                    this.notifier
                        .post(ResourceChanged::ItemUserData { user_id, item_id });
                    this.refresh_resume(vec![HomeBackground::Refreshing], cx);
                    this.refresh_children();
                }
                Err(err) => {
                    warn!(error = %err, %item_id, "played state change failed");
                    cx.emit(HomeEvent::Error(err));
                }
            },
        );
    }
}

/// Movie and show libraries the user has not excluded from "latest" rows.
/// Excludes that cannot be read count as none.
async fn latest_libraries(
    api: &dyn MediaServerApi,
    user_id: UserId,
) -> TaskResult<Vec<BaseItem>> {
    let views = api.user_views(user_id).await?;
    let excludes = match api.current_user().await {
        Ok(user) => user
            .configuration
            .map(|configuration| configuration.latest_items_excludes)
            .unwrap_or_default(),
        Err(err) => {
            debug!(error = %err, "latest-items excludes unavailable");
            Vec::new()
        }
    };
    Ok(filter_latest(views.items, &excludes))
}

pub fn filter_latest(views: Vec<BaseItem>, excludes: &[ItemId]) -> Vec<BaseItem> {
    views
        .into_iter()
        .filter(|view| {
            matches!(
                &view.collection_type,
                Some(kind) if *kind == CollectionType::MOVIES
                    || *kind == CollectionType::TV_SHOWS
            )
        })
        .filter(|view| view.id.is_none_or(|id| !excludes.contains(&id)))
        .collect()
}

impl Reducer for HomeViewModel {
    type Action = HomeAction;
    type State = HomeState;
    type Event = HomeEvent;
    type Background = HomeBackground;
    type Fields = HomeFields;

    fn fields(&self) -> HomeFields {
        HomeFields {
            resume_items: self.resume_items.clone(),
            libraries: self.libraries.clone(),
            next_up: self.next_up.clone(),
            recently_added: self.recently_added.clone(),
        }
    }

    fn respond(
        &mut self,
        action: HomeAction,
        cx: &mut Context<Self>,
    ) -> HomeState {
        match action {
            HomeAction::Refresh => {
                cx.cancel(USER_DATA);
                self.resume_items.set(Vec::new());
                self.libraries.set(Vec::new());
                self.refresh_resume(Vec::new(), cx);
                self.refresh_children();
                self.refresh_libraries(cx);
                HomeState::Refreshing
            }
            HomeAction::MarkPlayed(item) => {
                self.set_played(item, true, cx);
                cx.state()
            }
            HomeAction::MarkUnplayed(item) => {
                self.set_played(item, false, cx);
                cx.state()
            }
        }
    }
}
