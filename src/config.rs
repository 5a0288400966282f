use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::logging::LogConfig;
use crate::long_run::LongRunCapFormula;
use crate::models::ZoneBoundaryConfig;
use crate::prediction::DEFAULT_FATIGUE_EXPONENT;
use crate::zones::ZoneMode;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Engine tuning
    pub engine: EngineSettings,

    /// Logging setup for the CLI
    pub logging: LogConfig,

    /// Output preferences
    pub output: OutputSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Settings that change engine results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Riegel fatigue exponent
    pub fatigue_exponent: Decimal,

    /// Long run duration cap formula
    pub long_run_cap: LongRunCapFormula,

    /// Automatic Karvonen zones or manual HRR% boundaries
    pub zone_mode: ZoneMode,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fatigue_exponent: DEFAULT_FATIGUE_EXPONENT,
            long_run_cap: LongRunCapFormula::default(),
            zone_mode: ZoneMode::default(),
        }
    }
}

impl EngineSettings {
    /// Same rules as form input: positive exponent, well-formed boundaries
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.fatigue_exponent <= Decimal::ZERO {
            return Err(ValidationError::NotPositive {
                field: "engine.fatigue_exponent".to_string(),
                value: self.fatigue_exponent.to_string(),
            });
        }
        if let ZoneMode::Manual(boundaries) = &self.zone_mode {
            ZoneBoundaryConfig::new(*boundaries.upper_percentages())?;
        }
        Ok(())
    }
}

/// Output preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Default output format when `--json` is not given
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Configuration management implementation
impl PlannerConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: PlannerConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine settings in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".racecraft")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Ignoring config file {}: {:#}", config_path.display(), e);
                Self::default()
            }
        }
    }
}
