//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.config/tileplane/config.ini` (or the
//! platform equivalent). A missing file yields the defaults; command-line
//! flags override whatever the file says.
//!
//! ```ini
//! [viewer]
//! grid_size = 5
//! zoom_level = 15
//! view_type = Aerial
//! tile_width = 256
//! tile_height = 256
//! latitude = 47.639597
//! longitude = -122.12845
//!
//! [provider]
//! api_key = ...
//! timeout = 30
//!
//! [logging]
//! directory = /var/log/tileplane
//! level = info
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::coord::{GeoCoordinate, TileDimensions, ZoomLevel};
use crate::provider::{ViewType, DEFAULT_TIMEOUT_SECS};

/// Default edge length of the tile plane.
pub const DEFAULT_GRID_SIZE: usize = 5;

/// Default starting point (Redmond, WA).
pub const DEFAULT_CENTER: GeoCoordinate = GeoCoordinate::new(47.639597, -122.12845);

/// Default log level directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tileplane")
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// `[viewer]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    pub grid_size: usize,
    pub zoom_level: ZoomLevel,
    pub view_type: ViewType,
    pub tile_dimensions: TileDimensions,
    /// Coordinate the viewer starts on.
    pub center: GeoCoordinate,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            zoom_level: ZoomLevel::default(),
            view_type: ViewType::default(),
            tile_dimensions: TileDimensions::default(),
            center: DEFAULT_CENTER,
        }
    }
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Write a log file here in addition to stderr.
    pub directory: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: None,
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub viewer: ViewerSettings,
    pub provider: ProviderSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from [`config_file_path`], falling back to defaults if the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        })?;
        Self::from_ini(&ini)
    }

    /// Build a configuration from parsed INI data. Absent keys keep their
    /// defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("viewer")) {
            let viewer = &mut config.viewer;
            if let Some(v) = section.get("grid_size") {
                viewer.grid_size = parse_value("viewer.grid_size", v)?;
            }
            if let Some(v) = section.get("zoom_level") {
                let level: u8 = parse_value("viewer.zoom_level", v)?;
                viewer.zoom_level = ZoomLevel::new(level)
                    .map_err(|e| ConfigError::invalid("viewer.zoom_level", v, e))?;
            }
            if let Some(v) = section.get("view_type") {
                viewer.view_type = parse_value("viewer.view_type", v)?;
            }
            if let Some(v) = section.get("tile_width") {
                viewer.tile_dimensions.width = parse_value("viewer.tile_width", v)?;
            }
            if let Some(v) = section.get("tile_height") {
                viewer.tile_dimensions.height = parse_value("viewer.tile_height", v)?;
            }

            let latitude = match section.get("latitude") {
                Some(v) => parse_value("viewer.latitude", v)?,
                None => viewer.center.latitude(),
            };
            let longitude = match section.get("longitude") {
                Some(v) => parse_value("viewer.longitude", v)?,
                None => viewer.center.longitude(),
            };
            viewer.center = GeoCoordinate::try_new(latitude, longitude).map_err(|e| {
                ConfigError::invalid(
                    "viewer.latitude/longitude",
                    &format!("{},{}", latitude, longitude),
                    e,
                )
            })?;
        }

        if let Some(section) = ini.section(Some("provider")) {
            config.provider.api_key = section
                .get("api_key")
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from);
            if let Some(v) = section.get("timeout") {
                config.provider.timeout_secs = parse_value("provider.timeout", v)?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            config.logging.directory = section
                .get("directory")
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from);
            if let Some(v) = section.get("level") {
                config.logging.level = v.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Render the configuration as INI data.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        let viewer = &self.viewer;

        ini.with_section(Some("viewer"))
            .set("grid_size", viewer.grid_size.to_string())
            .set("zoom_level", viewer.zoom_level.to_string())
            .set("view_type", viewer.view_type.as_str())
            .set("tile_width", viewer.tile_dimensions.width.to_string())
            .set("tile_height", viewer.tile_dimensions.height.to_string())
            .set("latitude", viewer.center.latitude().to_string())
            .set("longitude", viewer.center.longitude().to_string());

        ini.with_section(Some("provider"))
            .set("api_key", self.provider.api_key.clone().unwrap_or_default())
            .set("timeout", self.provider.timeout_secs.to_string());

        let directory = self
            .logging
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        ini.with_section(Some("logging"))
            .set("directory", directory)
            .set("level", self.logging.level.as_str());

        ini
    }

    /// Set one value addressed as `section.key`, e.g. `viewer.zoom_level`.
    ///
    /// The value is validated like a value read from the file; on error the
    /// configuration is left unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let mut ini = self.to_ini();
        let known = ini
            .section(Some(section))
            .is_some_and(|properties| properties.contains_key(name));
        if !known {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        ini.with_section(Some(section)).set(name, value);
        *self = Self::from_ini(&ini)?;
        Ok(())
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.viewer.grid_size = grid_size;
        self
    }

    pub fn with_zoom_level(mut self, zoom_level: ZoomLevel) -> Self {
        self.viewer.zoom_level = zoom_level;
        self
    }

    pub fn with_view_type(mut self, view_type: ViewType) -> Self {
        self.viewer.view_type = view_type;
        self
    }

    pub fn with_center(mut self, center: GeoCoordinate) -> Self {
        self.viewer.center = center;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.provider.api_key = Some(api_key.into());
        self
    }

    pub fn with_log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.logging.directory = Some(directory.into());
        self
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(key, value, e))
}
