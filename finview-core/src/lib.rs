//! # finview core
//!
//! Client core for a Jellyfin media server: the state machines behind each
//! screen, without any UI.
//!
//! - [`reducer`]: the action → state contract. A [`ViewModel`] handle runs
//!   a [`Reducer`] on its own driver task, publishes state, background
//!   markers and events in one total order, and supervises async work per
//!   [`TaskSlot`].
//! - [`paging`]: a duplicate-free collection filled page by page, and the
//!   generic [`PagingLibraryViewModel`] over any [`PageFetcher`].
//! - [`view_models`]: live TV channels, library items, remote images, item
//!   element editors, media, home, sessions, sign-in and password reset.
//! - [`transport`]: the reqwest-backed server client (feature `http`).
//! - [`notify`]: the in-process change bus.
//! - [`testing`]: stub collaborators for exercising view-models.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use finview_config::ConfigLoader;
//! use finview_core::transport::HttpMediaServerClient;
//! use finview_core::view_models::ItemsFetcher;
//! use finview_core::{PagingAction, UserSession, ViewModel};
//! use finview_model::prelude::*;
//!
//! # async fn run(user_id: UserId, server_id: ServerId, library: ItemId) -> anyhow::Result<()> {
//! let config = ConfigLoader::new().load()?.config;
//! let api = HttpMediaServerClient::new(&config.server)?;
//! let session = UserSession::new(Arc::new(api), user_id, server_id);
//!
//! let items = ItemsFetcher::library(session, library, config.paging.page_size);
//! let vm = ViewModel::new(items.view_model()?);
//! vm.send(PagingAction::Refresh).await?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod error;
pub mod notify;
pub mod paging;
pub mod reducer;
pub mod session;
pub mod testing;
pub mod transport;
pub mod view_models;

pub use error::{CoreError, TaskError, TaskResult};
pub use notify::ChangeBus;
pub use paging::{
    PageFetcher, PageRequest, PagedCollection, Pager, PagingAction,
    PagingLibraryViewModel, PagingState,
};
pub use reducer::{BackgroundStates, Context, Published, Reducer, TaskSlot, ViewModel};
pub use session::UserSession;
