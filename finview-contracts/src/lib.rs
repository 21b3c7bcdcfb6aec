//! Trait surfaces that describe the collaborators a finview view-model talks
//! to: the server transport, the change notification channel, and the local
//! user store.

pub mod api;
pub mod error;
pub mod id;
pub mod notify;
pub mod store;

/// Frequently used contracts for view-model and adapter crates.
pub mod prelude {
    pub use super::api::{ApiResult, MediaServerApi};
    pub use super::error::{ApiError, StoreError};
    pub use super::id::ItemKeyed;
    pub use super::notify::{ChangeNotifier, ResourceChanged, ResourceKind};
    pub use super::store::{StoreResult, UserStore};
}
