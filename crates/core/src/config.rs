use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::color_math::{DEFAULT_PALETTE_SIZE, WHITE_COLOR_COUNT};
use crate::game::classic::DEFAULT_TOTAL_ROUNDS;
use crate::game::map_game::DEFAULT_TIME_LIMIT_SECS;
use crate::gradient::gradient_map::{DEFAULT_MAP_SIZE, DEFAULT_SEARCH_STEP};

/// Game settings shared by both modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub total_rounds: u32,
    pub time_limit_secs: u32,
    pub palette_size: usize,
    pub map_width: u32,
    pub map_height: u32,
    pub search_step: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            palette_size: DEFAULT_PALETTE_SIZE,
            map_width: DEFAULT_MAP_SIZE,
            map_height: DEFAULT_MAP_SIZE,
            search_step: DEFAULT_SEARCH_STEP,
        }
    }
}

/// Configuration manager for game settings
/// Settings live in a versioned JSON file, by default `shiro-guessr/config.json` under the
/// platform config directory
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub game: GameConfigSchema,
    pub map: MapConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfigSchema {
    pub total_rounds: ConfigOption<u32>,
    pub time_limit_secs: ConfigOption<u32>,
    pub palette_size: ConfigOption<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfigSchema {
    pub map_width: ConfigOption<u32>,
    pub map_height: ConfigOption<u32>,
    pub search_step: ConfigOption<f64>,
}

/// Configuration option with validation range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub description: String,
}

impl<T: PartialOrd + Copy> ConfigOption<T> {
    fn in_range(&self, value: T) -> bool {
        match self.valid_range {
            Some((min, max)) => value >= min && value <= max,
            None => true,
        }
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// Without an explicit path the platform config directory is used, or `config.json` in the
    /// working directory when there is none
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(Self::default_path);

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("shiro-guessr").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// Load settings from configuration file
    /// Writes a default file when none exists yet
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            log::info!(
                "No config at {}, writing defaults",
                self.config_path.display()
            );
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let created_at = self.existing_created_at().unwrap_or_else(|| now.clone());

        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at,
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        log::debug!("Saved settings to {}", self.config_path.display());
        Ok(())
    }

    fn existing_created_at(&self) -> Option<String> {
        let content = fs::read_to_string(&self.config_path).ok()?;
        let config_file: ConfigFile = serde_json::from_str(&content).ok()?;
        Some(config_file.created_at)
    }

    /// Validate, update settings and save to file
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        ConfigSchema {
            game: GameConfigSchema {
                total_rounds: ConfigOption {
                    default: DEFAULT_TOTAL_ROUNDS,
                    valid_range: Some((1, 20)),
                    description: "Rounds per game".to_string(),
                },
                time_limit_secs: ConfigOption {
                    default: DEFAULT_TIME_LIMIT_SECS,
                    valid_range: Some((10, 600)),
                    description: "Seconds per map-mode round".to_string(),
                },
                palette_size: ConfigOption {
                    default: DEFAULT_PALETTE_SIZE,
                    valid_range: Some((1, WHITE_COLOR_COUNT)),
                    description: "Colors offered per classic round".to_string(),
                },
            },
            map: MapConfigSchema {
                map_width: ConfigOption {
                    default: DEFAULT_MAP_SIZE,
                    valid_range: Some((2, 1000)),
                    description: "Gradient map width in pixels".to_string(),
                },
                map_height: ConfigOption {
                    default: DEFAULT_MAP_SIZE,
                    valid_range: Some((2, 1000)),
                    description: "Gradient map height in pixels".to_string(),
                },
                search_step: ConfigOption {
                    default: DEFAULT_SEARCH_STEP,
                    valid_range: Some((0.001, 0.25)),
                    description: "Grid step of the color location search".to_string(),
                },
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        fn check<T>(errors: &mut Vec<String>, name: &str, option: &ConfigOption<T>, value: T)
        where
            T: PartialOrd + Copy + std::fmt::Display,
        {
            if !option.in_range(value) {
                if let Some((min, max)) = option.valid_range {
                    errors.push(format!("{} must be between {} and {}", name, min, max));
                }
            }
        }

        check(&mut errors, "total_rounds", &schema.game.total_rounds, settings.total_rounds);
        check(
            &mut errors,
            "time_limit_secs",
            &schema.game.time_limit_secs,
            settings.time_limit_secs,
        );
        check(&mut errors, "palette_size", &schema.game.palette_size, settings.palette_size);
        check(&mut errors, "map_width", &schema.map.map_width, settings.map_width);
        check(&mut errors, "map_height", &schema.map.map_height, settings.map_height);

        // NaN fails every comparison, so it is rejected here too
        if !schema.map.search_step.in_range(settings.search_step) || settings.search_step.is_nan() {
            errors.push("search_step must be between 0.001 and 0.25".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset settings to defaults
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
