pub mod error;

use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{Config, ConfigMetadata};
use crate::util::parse_duration;

use error::ConfigLoadError;

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
}

/// Composes defaults, an optional TOML file and the environment into a
/// validated [`Config`].
///
/// Precedence, lowest to highest: defaults, file, `.env` file, process
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    env_override: Option<EnvConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Use the given values instead of reading the process environment.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env_override = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let file = match self.config_path.as_deref() {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };

        let dotenv = match self.env_file.as_deref() {
            Some(path) => Some(read_env_file(path)?),
            None => None,
        };

        let process_env = match &self.env_override {
            Some(env) => env.clone(),
            None => EnvConfig::gather(),
        };

        let env = match &dotenv {
            Some(vars) => {
                let from_file =
                    EnvConfig::from_lookup(|name| vars.get(name).cloned());
                overlay_env(from_file, process_env)
            }
            None => process_env,
        };

        let metadata = ConfigMetadata {
            config_path: self.config_path.clone(),
            env_file_loaded: dotenv.is_some(),
        };

        let config = compose(file, env, metadata)?;
        validate(&config)?;

        debug!(
            server = %config.server.base_url,
            page_size = config.paging.page_size,
            "configuration loaded"
        );

        Ok(ConfigLoad { config })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let raw = read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_env_file(
    path: &Path,
) -> Result<HashMap<String, String>, ConfigLoadError> {
    let env_err = |source| ConfigLoadError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let mut vars = HashMap::new();
    for entry in dotenvy::from_path_iter(path).map_err(env_err)? {
        let (key, value) = entry.map_err(env_err)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Fields set in `top` win over `base`.
fn overlay_env(base: EnvConfig, top: EnvConfig) -> EnvConfig {
    EnvConfig {
        server_url: top.server_url.or(base.server_url),
        client_name: top.client_name.or(base.client_name),
        device_name: top.device_name.or(base.device_name),
        device_id: top.device_id.or(base.device_id),
        request_timeout: top.request_timeout.or(base.request_timeout),
        page_size: top.page_size.or(base.page_size),
        remote_images_page_size: top
            .remote_images_page_size
            .or(base.remote_images_page_size),
        guide_lookback: top.guide_lookback.or(base.guide_lookback),
        guide_lookahead: top.guide_lookahead.or(base.guide_lookahead),
        resume_limit: top.resume_limit.or(base.resume_limit),
        sessions_active_within: top
            .sessions_active_within
            .or(base.sessions_active_within),
        mailbox_capacity: top.mailbox_capacity.or(base.mailbox_capacity),
        event_capacity: top.event_capacity.or(base.event_capacity),
        show_favorites: top.show_favorites.or(base.show_favorites),
        live_tv_enabled: top.live_tv_enabled.or(base.live_tv_enabled),
        downloads_enabled: top.downloads_enabled.or(base.downloads_enabled),
    }
}

fn duration_field(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        Some(raw) => parse_duration(&raw)
            .map_err(|source| ConfigLoadError::InvalidDuration { field, source }),
        None => Ok(default),
    }
}

fn compose(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let mut config = Config {
        metadata,
        ..Config::default()
    };

    let server = &mut config.server;
    if let Some(raw) = env.server_url.or(file.server.url) {
        server.base_url = Url::parse(raw.trim())
            .map_err(|source| ConfigLoadError::InvalidServerUrl { source })?;
    }
    if let Some(name) = env.client_name.or(file.server.client_name) {
        server.client_name = name;
    }
    if let Some(name) = env.device_name.or(file.server.device_name) {
        server.device_name = name;
    }
    match env.device_id.or(file.server.device_id) {
        Some(id) => server.device_id = id,
        None => server.device_id = server.device_name.clone(),
    }
    server.request_timeout = duration_field(
        "server.request_timeout",
        env.request_timeout.or(file.server.request_timeout),
        server.request_timeout,
    )?;

    let paging = &mut config.paging;
    if let Some(size) = env.page_size.or(file.paging.page_size) {
        paging.page_size = size;
    }
    if let Some(size) = env
        .remote_images_page_size
        .or(file.paging.remote_images_page_size)
    {
        paging.remote_images_page_size = size;
    }

    config.guide.lookback = duration_field(
        "guide.lookback",
        env.guide_lookback.or(file.guide.lookback),
        config.guide.lookback,
    )?;
    config.guide.lookahead = duration_field(
        "guide.lookahead",
        env.guide_lookahead.or(file.guide.lookahead),
        config.guide.lookahead,
    )?;

    if let Some(limit) = env.resume_limit.or(file.home.resume_limit) {
        config.home.resume_limit = limit;
    }

    config.sessions.active_within = duration_field(
        "sessions.active_within",
        env.sessions_active_within.or(file.sessions.active_within),
        config.sessions.active_within,
    )?;

    let runtime = &mut config.runtime;
    if let Some(capacity) =
        env.mailbox_capacity.or(file.runtime.mailbox_capacity)
    {
        runtime.mailbox_capacity = capacity;
    }
    if let Some(capacity) = env.event_capacity.or(file.runtime.event_capacity)
    {
        runtime.event_capacity = capacity;
    }

    let library = &mut config.library;
    if let Some(show) = env.show_favorites.or(file.library.show_favorites) {
        library.show_favorites = show;
    }
    if let Some(enabled) = env.live_tv_enabled.or(file.library.live_tv_enabled)
    {
        library.live_tv_enabled = enabled;
    }
    if let Some(enabled) =
        env.downloads_enabled.or(file.library.downloads_enabled)
    {
        library.downloads_enabled = enabled;
    }

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigLoadError> {
    let scheme = config.server.base_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigLoadError::Invalid {
            field: "server.url",
            reason: format!("unsupported scheme `{scheme}`"),
        });
    }

    let positive = [
        ("paging.page_size", config.paging.page_size as usize),
        (
            "paging.remote_images_page_size",
            config.paging.remote_images_page_size as usize,
        ),
        ("home.resume_limit", config.home.resume_limit as usize),
        ("runtime.mailbox_capacity", config.runtime.mailbox_capacity),
        ("runtime.event_capacity", config.runtime.event_capacity),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ConfigLoadError::Invalid {
                field,
                reason: "must be greater than zero".into(),
            });
        }
    }

    if config.server.request_timeout.is_zero() {
        return Err(ConfigLoadError::Invalid {
            field: "server.request_timeout",
            reason: "must be greater than zero".into(),
        });
    }

    if config.guide.lookahead.is_zero() {
        warn!("guide lookahead is zero; the channel guide will be empty");
    }

    Ok(())
}
