//! Configuration file loading for boomerang
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `BOOMERANG_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./boomerang.toml` or `./.boomerang.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/boomerang/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileConfig, FileEventsConfig, FileProviderConfig,
    FileStorageConfig,
};
pub use loader::ConfigLoader;
