use std::collections::HashSet;
use std::fmt;

use finview_contracts::id::ItemKeyed;

use crate::error::CoreError;

/// Offset and limit of the next page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub start_index: u32,
    pub limit: u32,
}

/// Server collection accumulated page by page.
///
/// Items keep first-page server order followed by append order. Keyed items
/// are never stored twice; items without a key are always appended.
pub struct PagedCollection<T: ItemKeyed> {
    items: Vec<T>,
    seen: HashSet<T::Key>,
    current_page: u32,
    page_size: u32,
    has_next_page: bool,
}

impl<T: ItemKeyed + fmt::Debug> fmt::Debug for PagedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedCollection")
            .field("len", &self.items.len())
            .field("current_page", &self.current_page)
            .field("page_size", &self.page_size)
            .field("has_next_page", &self.has_next_page)
            .finish()
    }
}

impl<T: ItemKeyed> PagedCollection<T> {
    pub fn new(page_size: u32) -> Result<Self, CoreError> {
        if page_size == 0 {
            return Err(CoreError::validation("page size must be positive"));
        }
        Ok(Self {
            items: Vec::new(),
            seen: HashSet::new(),
            current_page: 0,
            page_size,
            has_next_page: true,
        })
    }

    /// Drop every item and rewind the cursor to the first page.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.current_page = 0;
        self.has_next_page = true;
    }

    /// The page to fetch next, or `None` once the server ran out.
    pub fn next_request(&self) -> Option<PageRequest> {
        self.has_next_page.then(|| PageRequest {
            page: self.current_page,
            start_index: self.current_page * self.page_size,
            limit: self.page_size,
        })
    }

    /// Append a fetched page and advance the cursor. Returns how many items
    /// were new.
    pub fn apply_page(&mut self, page: Vec<T>) -> usize {
        let returned = page.len();
        let before = self.items.len();

        for item in page {
            match item.item_key() {
                Some(key) => {
                    if self.seen.insert(key) {
                        self.items.push(item);
                    }
                }
                None => self.items.push(item),
            }
        }

        self.has_next_page = returned >= self.page_size as usize;
        self.current_page += 1;
        self.items.len() - before
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }
}
