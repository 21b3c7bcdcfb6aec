use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::ids::ItemId;

/// A server item as returned by the item, channel, and program endpoints.
///
/// Every field is optional on the wire; the server omits whatever was not
/// requested through the `fields` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct BaseItem {
    pub id: Option<ItemId>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Type"))]
    pub kind: Option<ItemKind>,
    pub collection_type: Option<CollectionType>,
    pub parent_id: Option<ItemId>,
    pub channel_id: Option<ItemId>,
    pub series_name: Option<String>,
    pub overview: Option<String>,
    pub production_year: Option<i32>,
    pub index_number: Option<i32>,
    pub parent_index_number: Option<i32>,
    pub run_time_ticks: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub studios: Option<Vec<NameGuidPair>>,
    pub tags: Option<Vec<String>>,
    pub genres: Option<Vec<String>>,
    pub image_tags: Option<BTreeMap<String, String>>,
    pub user_data: Option<UserItemData>,
}

impl BaseItem {
    /// Pseudo library entry that has no server counterpart (favorites,
    /// downloads, live TV shortcuts on the media screen).
    pub fn pseudo_library(
        collection_type: CollectionType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            collection_type: Some(collection_type),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Whether the program airs at `now`, using the start/end window.
    pub fn is_airing_at(&self, now: DateTime<Utc>) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }
}

/// Server item kind. Unrecognised kinds decode as [`ItemKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Movie,
    Series,
    Season,
    Episode,
    BoxSet,
    Folder,
    CollectionFolder,
    UserView,
    TvChannel,
    LiveTvChannel,
    LiveTvProgram,
    Program,
    Audio,
    MusicAlbum,
    Playlist,
    Person,
    Studio,
    Genre,
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Movie => "Movie",
            ItemKind::Series => "Series",
            ItemKind::Season => "Season",
            ItemKind::Episode => "Episode",
            ItemKind::BoxSet => "BoxSet",
            ItemKind::Folder => "Folder",
            ItemKind::CollectionFolder => "CollectionFolder",
            ItemKind::UserView => "UserView",
            ItemKind::TvChannel => "TvChannel",
            ItemKind::LiveTvChannel => "LiveTvChannel",
            ItemKind::LiveTvProgram => "LiveTvProgram",
            ItemKind::Program => "Program",
            ItemKind::Audio => "Audio",
            ItemKind::MusicAlbum => "MusicAlbum",
            ItemKind::Playlist => "Playlist",
            ItemKind::Person => "Person",
            ItemKind::Studio => "Studio",
            ItemKind::Genre => "Genre",
            ItemKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library collection type. Kept open-ended because servers and plugins
/// introduce their own values; the well-known ones are associated consts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CollectionType(Cow<'static, str>);

impl CollectionType {
    pub const MOVIES: Self = Self(Cow::Borrowed("movies"));
    pub const TV_SHOWS: Self = Self(Cow::Borrowed("tvshows"));
    pub const BOX_SETS: Self = Self(Cow::Borrowed("boxsets"));
    pub const FOLDERS: Self = Self(Cow::Borrowed("folders"));
    pub const MUSIC: Self = Self(Cow::Borrowed("music"));
    pub const LIVE_TV: Self = Self(Cow::Borrowed("livetv"));
    pub const PLAYLISTS: Self = Self(Cow::Borrowed("playlists"));
    pub const UNKNOWN: Self = Self(Cow::Borrowed("unknown"));
    /// Client-side only: the favorites shortcut.
    pub const FAVORITES: Self = Self(Cow::Borrowed("favorites"));
    /// Client-side only: the downloads shortcut.
    pub const DOWNLOADS: Self = Self(Cow::Borrowed("downloads"));

    pub fn new(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name/identifier pair used for studios and similar sub-collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct NameGuidPair {
    pub name: Option<String>,
    pub id: Option<ItemId>,
}

impl NameGuidPair {
    pub fn new(name: impl Into<String>, id: Option<ItemId>) -> Self {
        Self {
            name: Some(name.into()),
            id,
        }
    }
}

/// Per-user playback data attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct UserItemData {
    pub played: bool,
    pub is_favorite: bool,
    pub play_count: i32,
    pub playback_position_ticks: i64,
    pub last_played_date: Option<DateTime<Utc>>,
}

/// One page of a server query result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct ItemPage<T> {
    #[cfg_attr(feature = "serde", serde(default = "Vec::new"))]
    pub items: Vec<T>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_record_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_index: u32,
}

impl<T> ItemPage<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total_record_count = items.len() as u32;
        Self {
            items,
            total_record_count,
            start_index: 0,
        }
    }
}

impl<T> Default for ItemPage<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
