use std::fmt;

use tracing::{debug, warn};

use super::fetcher::{PageFetcher, Pager};
use crate::error::CoreError;
use crate::reducer::{Context, Published, Reducer, TaskSlot};

const PAGING: TaskSlot = TaskSlot::new("paging");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingAction {
    Refresh,
    GetNextPage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PagingState {
    #[default]
    Initial,
    Content,
    Error(CoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PagingBackground {
    Refreshing,
    GettingNextPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingEvent {
    Updated,
    Error(CoreError),
}

/// Fields a paging screen renders from.
pub struct PagingFields<T> {
    pub items: Published<Vec<T>>,
}

impl<T> Clone for PagingFields<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PagingFields<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingFields")
            .field("items", &self.items)
            .finish()
    }
}

/// Generic list screen over any [`PageFetcher`].
///
/// `Refresh` and `GetNextPage` share one task slot, so either supersedes
/// whatever page load is still running.
#[derive(Debug)]
pub struct PagingLibraryViewModel<F: PageFetcher> {
    pager: Pager<F>,
}

impl<F: PageFetcher> PagingLibraryViewModel<F> {
    pub fn new(fetcher: F) -> Result<Self, CoreError> {
        Ok(Self {
            pager: Pager::new(fetcher)?,
        })
    }

    pub fn pager(&self) -> &Pager<F> {
        &self.pager
    }

    fn load_next(
        &mut self,
        marker: PagingBackground,
        cx: &mut Context<Self>,
    ) -> bool {
        let Some(request) = self.pager.next_request() else {
            return false;
        };
        debug!(page = request.page, start_index = request.start_index, "fetching page");

        cx.spawn_fallible(
            PAGING,
            [marker],
            self.pager.load(request),
            |this: &mut Self, result, cx| match result {
                Ok(page) => {
                    this.pager.apply(page);
                    cx.set_state(PagingState::Content);
                    cx.emit(PagingEvent::Updated);
                }
                Err(err) => {
                    warn!(error = %err, "page fetch failed");
                    cx.set_state(PagingState::Error(err.clone()));
                    cx.emit(PagingEvent::Error(err));
                }
            },
        );
        true
    }
}

impl<F: PageFetcher> Reducer for PagingLibraryViewModel<F> {
    type Action = PagingAction;
    type State = PagingState;
    type Event = PagingEvent;
    type Background = PagingBackground;
    type Fields = PagingFields<F::Item>;

    fn fields(&self) -> Self::Fields {
        PagingFields {
            items: self.pager.items(),
        }
    }

    fn respond(
        &mut self,
        action: PagingAction,
        cx: &mut Context<Self>,
    ) -> PagingState {
        match action {
            PagingAction::Refresh => {
                cx.cancel(PAGING);
                self.pager.reset();
                self.load_next(PagingBackground::Refreshing, cx);
                PagingState::Initial
            }
            PagingAction::GetNextPage => {
                self.load_next(PagingBackground::GettingNextPage, cx);
                cx.state()
            }
        }
    }
}
