// Application settings
//
// Layered with the `config` crate: built-in defaults, then an optional TOML file, then
// `CLUB_SIGNUP__<SECTION>__<KEY>` environment variables.

use crate::wizard::validation::{RuleSet, DEFAULT_USERNAME_MIN_LENGTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CLUB_SIGNUP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub validation: ValidationSettings,
    pub theme: ThemeSettings,
    pub logging: LoggingSettings,
    pub submission: SubmissionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub username_min_length: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            username_min_length: DEFAULT_USERNAME_MIN_LENGTH,
        }
    }
}

/// Terminal colors by name (`green`, `darkgray`, `lightyellow`, `#rrggbb`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub accent: String,
    pub highlight: String,
    pub disabled: String,
    pub error: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            accent: "green".to_string(),
            highlight: "yellow".to_string(),
            disabled: "darkgray".to_string(),
            error: "red".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSettings {
    /// Overrides the discovered `Signup_Log/` folder.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
    /// `log`, `stdout`, or a file path that receives one JSON line per signup.
    pub output: String,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            output: "log".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    Log,
    Stdout,
    File(PathBuf),
}

impl SubmissionSettings {
    pub fn target(&self) -> SubmissionTarget {
        match self.output.trim() {
            "" | "log" => SubmissionTarget::Log,
            "stdout" | "-" => SubmissionTarget::Stdout,
            path => SubmissionTarget::File(PathBuf::from(path)),
        }
    }
}

impl Settings {
    /// Load settings. A missing file at the default location is not an error; a missing file
    /// passed explicitly is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow::anyhow!(
                        "Settings file not found: {}",
                        path.display()
                    ));
                }
                builder = builder.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                if let Some(path) = default_settings_path() {
                    builder =
                        builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let cfg = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read settings")?;

        let settings: Settings = cfg
            .try_deserialize()
            .context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.validation.username_min_length == 0 {
            return Err(anyhow::anyhow!(
                "validation.username_min_length must be at least 1"
            ));
        }
        Ok(())
    }

    pub fn rules(&self) -> RuleSet {
        RuleSet::new(self.validation.username_min_length)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render settings as TOML")
    }
}

/// `<config_dir>/club-signup/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("club-signup").join("settings.toml"))
}
