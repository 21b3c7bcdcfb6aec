use async_trait::async_trait;
use finview_model::prelude::*;

use crate::error::{CoreError, TaskResult};
use crate::paging::{PageFetcher, PageRequest, PagingLibraryViewModel};
use crate::session::UserSession;

pub type ItemsViewModel = PagingLibraryViewModel<ItemsFetcher>;

/// Which server listing an [`ItemsFetcher`] pages through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemsSource {
    /// `/Items` with the given filters; paging fields are overwritten.
    Query(ItemsQuery),
    NextUp,
    /// Newest first, optionally under one library.
    RecentlyAdded { parent_id: Option<ItemId> },
}

#[derive(Debug, Clone)]
pub struct ItemsFetcher {
    session: UserSession,
    source: ItemsSource,
    page_size: u32,
}

impl ItemsFetcher {
    pub fn new(session: UserSession, source: ItemsSource, page_size: u32) -> Self {
        Self {
            session,
            source,
            page_size,
        }
    }

    /// Contents of one library, sorted by name.
    pub fn library(session: UserSession, parent_id: ItemId, page_size: u32) -> Self {
        let query = ItemsQuery {
            parent_id: Some(parent_id),
            sort_by: vec![ItemSortBy::SortName],
            fields: ItemFields::MINIMUM.to_vec(),
            ..ItemsQuery::default()
        };
        Self::new(session, ItemsSource::Query(query), page_size)
    }

    pub fn next_up(session: UserSession, page_size: u32) -> Self {
        Self::new(session, ItemsSource::NextUp, page_size)
    }

    pub fn recently_added(session: UserSession, page_size: u32) -> Self {
        Self::new(
            session,
            ItemsSource::RecentlyAdded { parent_id: None },
            page_size,
        )
    }

    pub fn source(&self) -> &ItemsSource {
        &self.source
    }

    pub fn view_model(self) -> Result<ItemsViewModel, CoreError> {
        PagingLibraryViewModel::new(self)
    }

    fn items_query(&self, request: PageRequest) -> Option<ItemsQuery> {
        let mut query = match &self.source {
            ItemsSource::Query(query) => query.clone(),
            ItemsSource::RecentlyAdded { parent_id } => ItemsQuery {
                parent_id: *parent_id,
                recursive: true,
                include_item_types: vec![
                    ItemKind::Movie,
                    ItemKind::Series,
                    ItemKind::Episode,
                ],
                sort_by: vec![ItemSortBy::DateCreated],
                sort_order: SortOrder::Descending,
                fields: ItemFields::MINIMUM.to_vec(),
                ..ItemsQuery::default()
            },
            ItemsSource::NextUp => return None,
        };
        query.user_id = Some(self.session.user_id());
        query.start_index = request.start_index;
        query.limit = Some(request.limit);
        Some(query)
    }
}

#[async_trait]
impl PageFetcher for ItemsFetcher {
    type Item = BaseItem;

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn fetch_page(&self, request: PageRequest) -> TaskResult<Vec<BaseItem>> {
        let api = self.session.api();
        let page = match self.items_query(request) {
            Some(query) => api.items(&query).await?,
            None => {
                let query = NextUpQuery {
                    user_id: Some(self.session.user_id()),
                    start_index: request.start_index,
                    limit: Some(request.limit),
                    fields: ItemFields::MINIMUM.to_vec(),
                };
                api.next_up(&query).await?
            }
        };
        Ok(page.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubApi, session};

    #[test]
    fn recently_added_sorts_newest_first() {
        let api = StubApi::new();
        let fetcher = ItemsFetcher::recently_added(session(&api), 20);

        let query = fetcher
            .items_query(PageRequest {
                page: 1,
                start_index: 20,
                limit: 20,
            })
            .unwrap();

        assert_eq!(query.sort_by, vec![ItemSortBy::DateCreated]);
        assert_eq!(query.sort_order, SortOrder::Descending);
        assert_eq!(query.start_index, 20);
        assert_eq!(query.limit, Some(20));
        assert!(query.recursive);
    }

    #[test]
    fn next_up_uses_its_own_endpoint() {
        let api = StubApi::new();
        let fetcher = ItemsFetcher::next_up(session(&api), 10);
        assert!(fetcher.items_query(PageRequest {
            page: 0,
            start_index: 0,
            limit: 10,
        })
        .is_none());
    }
}
