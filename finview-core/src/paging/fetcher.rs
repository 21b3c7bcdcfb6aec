use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use finview_contracts::id::ItemKeyed;

use super::collection::{PageRequest, PagedCollection};
use crate::error::{CoreError, TaskResult};
use crate::reducer::Published;

/// How a specialization fetches one page of its collection.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    type Item: ItemKeyed + Clone + fmt::Debug + Send + Sync + 'static;

    fn page_size(&self) -> u32;

    async fn fetch_page(
        &self,
        request: PageRequest,
    ) -> TaskResult<Vec<Self::Item>>;
}

/// A fetcher, the collection it fills, and the published copy of the
/// collection's items.
///
/// Owned by a reducer; every method runs on the reducer's driver.
pub struct Pager<F: PageFetcher> {
    fetcher: Arc<F>,
    collection: PagedCollection<F::Item>,
    items: Published<Vec<F::Item>>,
}

impl<F: PageFetcher> fmt::Debug for Pager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("fetcher", &std::any::type_name::<F>())
            .field("collection", &self.collection)
            .finish()
    }
}

impl<F: PageFetcher> Pager<F> {
    pub fn new(fetcher: F) -> Result<Self, CoreError> {
        let collection = PagedCollection::new(fetcher.page_size())?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            collection,
            items: Published::default(),
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn collection(&self) -> &PagedCollection<F::Item> {
        &self.collection
    }

    pub fn items(&self) -> Published<Vec<F::Item>> {
        self.items.clone()
    }

    /// Clear items and cursor in one publication.
    pub fn reset(&mut self) {
        self.collection.reset();
        self.items.set(Vec::new());
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        self.collection.next_request()
    }

    /// Future fetching `request`, detached from `self` so it can run off
    /// the driver.
    pub fn load(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = TaskResult<Vec<F::Item>>> + Send + 'static
    {
        let fetcher = Arc::clone(&self.fetcher);
        async move { fetcher.fetch_page(request).await }
    }

    pub fn apply(&mut self, page: Vec<F::Item>) {
        self.collection.apply_page(page);
        self.items.set(self.collection.items().to_vec());
    }
}
