use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Image slot on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageType {
    Primary,
    Art,
    Backdrop,
    Banner,
    Logo,
    Thumb,
    Disc,
    Box,
    Screenshot,
    Menu,
    Chapter,
    BoxRear,
    Profile,
}

impl ImageType {
    pub const ALL: [ImageType; 13] = [
        ImageType::Primary,
        ImageType::Art,
        ImageType::Backdrop,
        ImageType::Banner,
        ImageType::Logo,
        ImageType::Thumb,
        ImageType::Disc,
        ImageType::Box,
        ImageType::Screenshot,
        ImageType::Menu,
        ImageType::Chapter,
        ImageType::BoxRear,
        ImageType::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Primary => "Primary",
            ImageType::Art => "Art",
            ImageType::Backdrop => "Backdrop",
            ImageType::Banner => "Banner",
            ImageType::Logo => "Logo",
            ImageType::Thumb => "Thumb",
            ImageType::Disc => "Disc",
            ImageType::Box => "Box",
            ImageType::Screenshot => "Screenshot",
            ImageType::Menu => "Menu",
            ImageType::Chapter => "Chapter",
            ImageType::BoxRear => "BoxRear",
            ImageType::Profile => "Profile",
        }
    }

    /// Image types an item can hold several of, addressed by index.
    pub fn is_indexed(&self) -> bool {
        matches!(
            self,
            ImageType::Backdrop | ImageType::Screenshot | ImageType::Chapter
        )
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ImageType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ModelError::InvalidImageType(value.to_string()))
    }
}

/// A candidate image offered by a remote metadata provider.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct RemoteImageInfo {
    pub provider_name: Option<String>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub community_rating: Option<f64>,
    pub vote_count: Option<u32>,
    pub language: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Type"))]
    pub image_type: Option<ImageType>,
}

/// Remote image search result.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct RemoteImageResult {
    pub images: Option<Vec<RemoteImageInfo>>,
    pub total_record_count: u32,
    pub providers: Option<Vec<String>>,
}
