use std::sync::Arc;

use finview_config::LibraryDisplaySettings;
use finview_model::prelude::*;
use tracing::{debug, warn};

use crate::error::{CoreError, TaskError};
use crate::reducer::{Context, Published, Reducer, TaskSlot};
use crate::session::UserSession;

const MEDIA: TaskSlot = TaskSlot::new("media");

/// Collection types the media screen can open.
const SUPPORTED: [CollectionType; 5] = [
    CollectionType::BOX_SETS,
    CollectionType::FOLDERS,
    CollectionType::MOVIES,
    CollectionType::TV_SHOWS,
    CollectionType::UNKNOWN,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaAction {
    Refresh,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum MediaState {
    #[default]
    Initial,
    Content,
    Error(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaBackground {
    Refreshing,
}

#[derive(Debug, Clone)]
pub struct MediaFields {
    pub libraries: Published<Vec<BaseItem>>,
}

/// The user's libraries, led by the client-side shortcuts.
#[derive(Debug)]
pub struct MediaViewModel {
    session: UserSession,
    settings: LibraryDisplaySettings,
    libraries: Published<Vec<BaseItem>>,
}

impl MediaViewModel {
    pub fn new(session: UserSession, settings: LibraryDisplaySettings) -> Self {
        Self {
            session,
            settings,
            libraries: Published::default(),
        }
    }
}

fn is_supported(library: &BaseItem) -> bool {
    match &library.collection_type {
        Some(collection_type) => SUPPORTED.contains(collection_type),
        None => true,
    }
}

/// Supported server libraries behind the shortcuts enabled in `settings`,
/// in the order downloads, favorites, live TV.
pub fn arrange_libraries(
    views: Vec<BaseItem>,
    settings: &LibraryDisplaySettings,
) -> Vec<BaseItem> {
    let mut libraries = Vec::with_capacity(views.len() + 3);
    if settings.downloads_enabled {
        libraries.push(BaseItem::pseudo_library(
            CollectionType::DOWNLOADS,
            "Downloads",
        ));
    }
    if settings.show_favorites {
        libraries.push(BaseItem::pseudo_library(
            CollectionType::FAVORITES,
            "Favorites",
        ));
    }
    if settings.live_tv_enabled {
        libraries.push(BaseItem::pseudo_library(
            CollectionType::LIVE_TV,
            "Live TV",
        ));
    }
    libraries.extend(views.into_iter().filter(is_supported));
    libraries
}

impl Reducer for MediaViewModel {
    type Action = MediaAction;
    type State = MediaState;
    type Event = ();
    type Background = MediaBackground;
    type Fields = MediaFields;

    fn fields(&self) -> MediaFields {
        MediaFields {
            libraries: self.libraries.clone(),
        }
    }

    fn respond(
        &mut self,
        action: MediaAction,
        cx: &mut Context<Self>,
    ) -> MediaState {
        match action {
            MediaAction::Refresh => {
                let api = Arc::clone(self.session.api());
                let user_id = self.session.user_id();
                let work = async move {
                    let views = api.user_views(user_id).await?;
                    Ok::<_, TaskError>(views.items)
                };

                cx.spawn_fallible(
                    MEDIA,
                    [MediaBackground::Refreshing],
                    work,
                    |this: &mut Self, result, cx| match result {
                        Ok(views) => {
                            let libraries =
                                arrange_libraries(views, &this.settings);
                            debug!(count = libraries.len(), "libraries loaded");
                            this.libraries.set(libraries);
                            cx.set_state(MediaState::Content);
                        }
                        Err(err) => {
                            warn!(error = %err, "loading libraries failed");
                            this.libraries.set(Vec::new());
                            cx.set_state(MediaState::Error(err));
                        }
                    },
                );
                cx.state()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::library;

    fn names(libraries: &[BaseItem]) -> Vec<&str> {
        libraries.iter().map(BaseItem::display_name).collect()
    }

    #[test]
    fn shortcuts_lead_in_fixed_order() {
        let settings = LibraryDisplaySettings {
            show_favorites: true,
            live_tv_enabled: true,
            downloads_enabled: true,
        };
        let views = vec![library("Films", CollectionType::MOVIES)];

        let arranged = arrange_libraries(views, &settings);

        assert_eq!(
            names(&arranged),
            vec!["Downloads", "Favorites", "Live TV", "Films"]
        );
    }

    #[test]
    fn unsupported_collection_types_are_hidden() {
        let settings = LibraryDisplaySettings {
            show_favorites: false,
            live_tv_enabled: false,
            downloads_enabled: false,
        };
        let mut untyped = library("Mixed", CollectionType::UNKNOWN);
        untyped.collection_type = None;
        let views = vec![
            library("Albums", CollectionType::MUSIC),
            library("Shows", CollectionType::TV_SHOWS),
            library("Sets", CollectionType::BOX_SETS),
            untyped,
            library("Lists", CollectionType::PLAYLISTS),
        ];

        let arranged = arrange_libraries(views, &settings);

        assert_eq!(names(&arranged), vec!["Shows", "Sets", "Mixed"]);
    }
}
