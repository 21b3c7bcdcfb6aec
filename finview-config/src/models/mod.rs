pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8096";
pub const DEFAULT_CLIENT_NAME: &str = "finview";
pub const DEFAULT_DEVICE_NAME: &str = "finview-device";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_GUIDE_LOOKBACK: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_GUIDE_LOOKAHEAD: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_RESUME_LIMIT: u32 = 20;
pub const DEFAULT_SESSIONS_ACTIVE_WITHIN: Duration = Duration::from_secs(960);
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;
pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub paging: PagingConfig,
    pub guide: GuideConfig,
    pub home: HomeConfig,
    pub sessions: SessionsConfig,
    pub runtime: RuntimeConfig,
    pub library: LibraryDisplaySettings,
    pub metadata: ConfigMetadata,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            paging: PagingConfig::default(),
            guide: GuideConfig::default(),
            home: HomeConfig::default(),
            sessions: SessionsConfig::default(),
            runtime: RuntimeConfig::default(),
            library: LibraryDisplaySettings::default(),
            metadata: ConfigMetadata::default(),
        }
    }
}

/// Server address and the identity this client reports to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: Url,
    pub client_name: String,
    pub client_version: String,
    pub device_name: String,
    pub device_id: String,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_SERVER_URL)
                .expect("default server URL is valid"),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            device_id: DEFAULT_DEVICE_NAME.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Page size for library and channel lists.
    pub page_size: u32,
    pub remote_images_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            remote_images_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Live TV guide window relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideConfig {
    pub lookback: Duration,
    pub lookahead: Duration,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_GUIDE_LOOKBACK,
            lookahead: DEFAULT_GUIDE_LOOKAHEAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeConfig {
    pub resume_limit: u32,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            resume_limit: DEFAULT_RESUME_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionsConfig {
    pub active_within: Duration,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            active_within: DEFAULT_SESSIONS_ACTIVE_WITHIN,
        }
    }
}

/// Channel sizing for view-model drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub mailbox_capacity: usize,
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Which client-side shortcuts the media screen shows ahead of the
/// server's libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryDisplaySettings {
    pub show_favorites: bool,
    pub live_tv_enabled: bool,
    pub downloads_enabled: bool,
}

impl Default for LibraryDisplaySettings {
    fn default() -> Self {
        Self {
            show_favorites: true,
            live_tv_enabled: false,
            downloads_enabled: false,
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
