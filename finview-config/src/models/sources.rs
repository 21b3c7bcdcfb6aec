use serde::{Deserialize, Serialize};

use crate::util::{parse_bool, parse_number};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub paging: FilePagingConfig,
    #[serde(default)]
    pub guide: FileGuideConfig,
    #[serde(default)]
    pub home: FileHomeConfig,
    #[serde(default)]
    pub sessions: FileSessionsConfig,
    #[serde(default)]
    pub runtime: FileRuntimeConfig,
    #[serde(default)]
    pub library: FileLibraryConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Humantime duration, e.g. `"30s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilePagingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_images_page_size: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileGuideConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookahead: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileHomeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_limit: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSessionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_within: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRuntimeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailbox_capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_capacity: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLibraryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_favorites: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_tv_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads_enabled: Option<bool>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub server_url: Option<String>,
    pub client_name: Option<String>,
    pub device_name: Option<String>,
    pub device_id: Option<String>,
    pub request_timeout: Option<String>,
    pub page_size: Option<u32>,
    pub remote_images_page_size: Option<u32>,
    pub guide_lookback: Option<String>,
    pub guide_lookahead: Option<String>,
    pub resume_limit: Option<u32>,
    pub sessions_active_within: Option<String>,
    pub mailbox_capacity: Option<usize>,
    pub event_capacity: Option<usize>,
    pub show_favorites: Option<bool>,
    pub live_tv_enabled: Option<bool>,
    pub downloads_enabled: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };

        Self {
            server_url: var("FINVIEW_SERVER_URL"),
            client_name: var("FINVIEW_CLIENT_NAME"),
            device_name: var("FINVIEW_DEVICE_NAME"),
            device_id: var("FINVIEW_DEVICE_ID"),
            request_timeout: var("FINVIEW_REQUEST_TIMEOUT"),
            page_size: var("FINVIEW_PAGE_SIZE").and_then(|s| parse_number(&s)),
            remote_images_page_size: var("FINVIEW_REMOTE_IMAGES_PAGE_SIZE")
                .and_then(|s| parse_number(&s)),
            guide_lookback: var("FINVIEW_GUIDE_LOOKBACK"),
            guide_lookahead: var("FINVIEW_GUIDE_LOOKAHEAD"),
            resume_limit: var("FINVIEW_RESUME_LIMIT")
                .and_then(|s| parse_number(&s)),
            sessions_active_within: var("FINVIEW_SESSIONS_ACTIVE_WITHIN"),
            mailbox_capacity: var("FINVIEW_MAILBOX_CAPACITY")
                .and_then(|s| parse_number(&s)),
            event_capacity: var("FINVIEW_EVENT_CAPACITY")
                .and_then(|s| parse_number(&s)),
            show_favorites: var("FINVIEW_SHOW_FAVORITES")
                .and_then(|s| parse_bool(&s)),
            live_tv_enabled: var("FINVIEW_LIVE_TV")
                .and_then(|s| parse_bool(&s)),
            downloads_enabled: var("FINVIEW_DOWNLOADS")
                .and_then(|s| parse_bool(&s)),
        }
    }
}
