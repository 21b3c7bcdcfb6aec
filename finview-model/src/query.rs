//! Query parameter shapes for the paged and filtered server endpoints.
//!
//! These carry values only; turning them into a query string belongs to the
//! transport.

use chrono::{DateTime, Utc};

use crate::ids::{ItemId, UserId};
use crate::image::ImageType;
use crate::item::ItemKind;

/// Optional item fields the server only returns when asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemFields {
    Overview,
    ParentId,
    MediaSources,
    Chapters,
    Taglines,
    Genres,
    Studios,
    Tags,
    People,
    ChannelInfo,
}

impl ItemFields {
    /// The field set list screens request for poster/label rendering.
    pub const MINIMUM: &'static [ItemFields] = &[
        ItemFields::Chapters,
        ItemFields::MediaSources,
        ItemFields::Overview,
        ItemFields::ParentId,
        ItemFields::Taglines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemFields::Overview => "Overview",
            ItemFields::ParentId => "ParentId",
            ItemFields::MediaSources => "MediaSources",
            ItemFields::Chapters => "Chapters",
            ItemFields::Taglines => "Taglines",
            ItemFields::Genres => "Genres",
            ItemFields::Studios => "Studios",
            ItemFields::Tags => "Tags",
            ItemFields::People => "People",
            ItemFields::ChannelInfo => "ChannelInfo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemSortBy {
    SortName,
    StartDate,
    DateCreated,
    PremiereDate,
    DatePlayed,
    CommunityRating,
    Random,
}

impl ItemSortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSortBy::SortName => "SortName",
            ItemSortBy::StartDate => "StartDate",
            ItemSortBy::DateCreated => "DateCreated",
            ItemSortBy::PremiereDate => "PremiereDate",
            ItemSortBy::DatePlayed => "DatePlayed",
            ItemSortBy::CommunityRating => "CommunityRating",
            ItemSortBy::Random => "Random",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

/// `GET /LiveTv/Channels`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelsQuery {
    pub user_id: Option<UserId>,
    pub start_index: u32,
    pub limit: Option<u32>,
    pub sort_by: Vec<ItemSortBy>,
    pub fields: Vec<ItemFields>,
}

/// `GET /LiveTv/Programs`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramsQuery {
    pub channel_ids: Vec<ItemId>,
    pub user_id: Option<UserId>,
    pub min_end_date: Option<DateTime<Utc>>,
    pub max_start_date: Option<DateTime<Utc>>,
    pub sort_by: Vec<ItemSortBy>,
}

/// `GET /Items/{id}/RemoteImages`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImagesQuery {
    pub image_type: ImageType,
    pub start_index: u32,
    pub limit: u32,
    pub include_all_languages: bool,
}

/// `GET /Items` scoped to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsQuery {
    pub user_id: Option<UserId>,
    pub parent_id: Option<ItemId>,
    pub start_index: u32,
    pub limit: Option<u32>,
    pub recursive: bool,
    pub include_item_types: Vec<ItemKind>,
    pub sort_by: Vec<ItemSortBy>,
    pub sort_order: SortOrder,
    pub is_favorite: Option<bool>,
    pub fields: Vec<ItemFields>,
}

/// `GET /Shows/NextUp`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextUpQuery {
    pub user_id: Option<UserId>,
    pub start_index: u32,
    pub limit: Option<u32>,
    pub fields: Vec<ItemFields>,
}

/// `GET /Users/{id}/Items/Resume`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeQuery {
    pub limit: Option<u32>,
    pub fields: Vec<ItemFields>,
    pub enable_user_data: bool,
    pub include_item_types: Vec<ItemKind>,
}
