//! Configuration for linemap components.
//!
//! The persistent user configuration lives in `~/.linemap/config.ini` and is
//! represented by [`ConfigFile`]. Individual settings can be read and written
//! by dotted key name through [`ConfigKey`]. A [`MapConfig`] is the runtime
//! view of those settings handed to a [`crate::view::MapView`].
//!
//! # Example
//!
//! ```
//! use linemap::config::{ConfigFile, ConfigKey, MapConfig};
//!
//! let mut file = ConfigFile::default();
//! ConfigKey::MapBasemap.set(&mut file, "topo").unwrap();
//!
//! let config = MapConfig::from(&file);
//! assert_eq!(config.basemap(), "topo");
//! ```

mod defaults;
mod file;
mod keys;
mod map;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use map::MapConfig;
pub use settings::{
    ConfigFile, FocusSettings, LayerSettings, LoggingSettings, MapSettings, RiskSettings,
};
