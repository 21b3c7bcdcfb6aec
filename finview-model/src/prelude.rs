//! Snapshot of the model surface for view-model and transport code.
//! Prefer importing from this module instead of individual tree nodes.

pub use super::ids::{ItemId, ServerId, UserId};
pub use super::image::{ImageType, RemoteImageInfo, RemoteImageResult};
pub use super::item::{
    BaseItem, CollectionType, ItemKind, ItemPage, NameGuidPair, UserItemData,
};
pub use super::live_tv::ChannelProgram;
pub use super::query::{
    ChannelsQuery, ItemFields, ItemSortBy, ItemsQuery, NextUpQuery,
    ProgramsQuery, RemoteImagesQuery, ResumeQuery, SortOrder,
};
pub use super::session::SessionInfo;
pub use super::user::{
    AuthenticationResult, BrandingOptions, UserAccessPolicy,
    UserConfiguration, UserDto, UserState,
};
