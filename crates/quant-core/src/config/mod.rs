//! Configuration system for quant
//!
//! ## Configuration Discovery
//!
//! Without an explicit `--config`, files are searched from the working
//! directory upward in this order: `.quantrc.json`, `.quantrc.toml`,
//! `quant.yaml`, `quant.yml`, `quant.json`. With no file at all the defaults
//! apply.
//!
//! ## Example Configuration
//!
//! ```json
//! {
//!   "source": "styles/utilities.qs",
//!   "content": "src",
//!   "output": "dist/quant.css",
//!   "matchMode": "flex",
//!   "minify": false,
//!   "cache": { "enabled": true },
//!   "variants": ["print"]
//! }
//! ```

mod loader;
mod quant_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader, LoadedConfig};
pub use quant_config::{CacheConfiguration, QuantConfig};
