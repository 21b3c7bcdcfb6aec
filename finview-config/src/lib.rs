//! Configuration for the finview client core.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `FINVIEW_*` environment variables (optionally read from a `.env` file).
//! The merged [`Config`] is validated before it is handed out.

pub mod loader;
pub mod models;
pub mod util;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    Config, ConfigMetadata, GuideConfig, HomeConfig, LibraryDisplaySettings,
    PagingConfig, RuntimeConfig, ServerConfig, SessionsConfig,
};
