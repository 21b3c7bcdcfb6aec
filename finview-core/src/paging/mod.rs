//! Paged collection engine: a cursor-tracking, duplicate-free collection,
//! the per-specialization page fetch, and the generic list reducer.

mod collection;
mod fetcher;
mod view_model;

pub use collection::{PageRequest, PagedCollection};
pub use fetcher::{PageFetcher, Pager};
pub use view_model::{
    PagingAction, PagingBackground, PagingEvent, PagingFields,
    PagingLibraryViewModel, PagingState,
};
