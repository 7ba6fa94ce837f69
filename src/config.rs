use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error("item {id} is invalid: {reason}")]
    InvalidItem { id: String, reason: &'static str },
    #[error("item {0} is defined more than once")]
    DuplicateItem(String),
}

/// A single item archetype as written in the config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "ItemConfig::default_stack_size")]
    pub stack_size: u32,
    /// Whether the player may throw stacks of this item away.
    #[serde(default = "ItemConfig::default_droppable")]
    pub droppable: bool,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            id: String::default(),
            name: String::default(),
            stack_size: Self::default_stack_size(),
            droppable: Self::default_droppable(),
        }
    }
}

impl ItemConfig {
    fn default_stack_size() -> u32 {
        1
    }

    fn default_droppable() -> bool {
        true
    }
}

/// Settings for a single storage place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceConfig {
    /// Number of slots shown per row.
    #[serde(default = "PlaceConfig::default_columns")]
    pub columns: u32,
    /// Number of rows visible at once.
    #[serde(default = "PlaceConfig::default_rows")]
    pub rows: u32,
    /// Whether items in this place may be sold.
    #[serde(default)]
    pub sellable: bool,
}

impl Default for PlaceConfig {
    fn default() -> Self {
        Self {
            columns: Self::default_columns(),
            rows: Self::default_rows(),
            sellable: false,
        }
    }
}

impl PlaceConfig {
    fn default_columns() -> u32 {
        5
    }

    fn default_rows() -> u32 {
        7
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacesConfig {
    #[serde(default)]
    pub player_bag: PlaceConfig,
    #[serde(default = "PlacesConfig::default_storehouse")]
    pub storehouse: PlaceConfig,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            player_bag: PlaceConfig::default(),
            storehouse: Self::default_storehouse(),
        }
    }
}

impl PlacesConfig {
    fn default_storehouse() -> PlaceConfig {
        PlaceConfig {
            columns: 10,
            rows: 10,
            sellable: true,
        }
    }
}

/// Global and all-encompassing config.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Every item archetype known to the process.
    #[serde(default)]
    pub items: Vec<ItemConfig>,
    #[serde(default)]
    pub places: PlacesConfig,
}

impl Config {
    pub fn from_yaml(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml_ng::from_str(data)?)
    }
}

/// Reads the config at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let data = std::fs::read_to_string(path)?;
    Config::from_yaml(&data)
}

/// Reads `config.yaml` from the working directory, or the defaults if there is none.
pub fn get_config() -> Result<Config, ConfigError> {
    if Path::new(CONFIG_PATH).exists() {
        load_config(CONFIG_PATH)
    } else {
        tracing::debug!("No {CONFIG_PATH} found, using the default config");
        Ok(Config::default())
    }
}
