//! Configuration file loading for refract
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `REFRACT_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./refract.toml` or `./.refract.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/refract/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    BackendSettings, FileBackendConfig, FileBatchConfig, FileConfig, FileEditorConfig,
    FilePathsConfig, FileProvidersConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
