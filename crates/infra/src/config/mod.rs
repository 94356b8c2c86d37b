//! Configuration loading
//!
//! Reads `AppConfig` from TOML/JSON files and `AUTOPOST_*` environment
//! variables.

pub mod loader;

pub use loader::{
    apply_env_overrides, find_config_file, load, load_from_file, parse_config, validate,
    CONFIG_PATH_ENV,
};
