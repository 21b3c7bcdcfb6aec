//! Server data model definitions shared across finview crates.
//!
//! The shapes follow the media server's REST DTOs. With the `serde` feature
//! enabled they (de)serialize using the server's PascalCase field names.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod image;
pub mod item;
pub mod live_tv;
pub mod prelude;
pub mod query;
pub mod session;
pub mod user;

pub use error::{ModelError, Result as ModelResult};
pub use ids::{ItemId, ServerId, UserId};
pub use image::{ImageType, RemoteImageInfo, RemoteImageResult};
pub use item::{
    BaseItem, CollectionType, ItemKind, ItemPage, NameGuidPair, UserItemData,
};
pub use live_tv::ChannelProgram;
pub use query::{
    ChannelsQuery, ItemFields, ItemSortBy, ItemsQuery, NextUpQuery,
    ProgramsQuery, RemoteImagesQuery, ResumeQuery, SortOrder,
};
pub use session::SessionInfo;
pub use user::{
    AuthenticationResult, BrandingOptions, UserAccessPolicy,
    UserConfiguration, UserDto, UserState,
};
