//! Settings file loading
//!
//! Reads an optional TOML settings file and merges it over the built-in
//! defaults. The merge is shallow: within each known group (`app`, `model`,
//! `style`) every key present in the file overwrites the default key of the
//! same name. A value that is itself a table replaces the default wholesale.
//!
//! Loading never fails. A missing or unreadable file, or one that is not
//! TOML, yields the defaults unchanged. A key whose value has the wrong type
//! keeps its default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default settings file path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level groups recognized in the settings file
const GROUPS: &[&str] = &["app", "model", "style"];

/// Application text shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppText {
    pub title: String,
    pub warning_message: String,
    pub crisis_hotline: String,
    pub crisis_text: String,
}

impl Default for AppText {
    fn default() -> Self {
        Self {
            title: "MH Consult — Mental Health Consultation".to_string(),
            warning_message:
                "This app is informational and not a replacement for licensed care.".to_string(),
            crisis_hotline: "Replace with national crisis hotline".to_string(),
            crisis_text: "Replace with crisis text line".to_string(),
        }
    }
}

/// Parameters for the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".to_string(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub background_color: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: "#FFFFFF".to_string(),
        }
    }
}

/// Loaded configuration, immutable for the life of the process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppText,
    pub model: ModelParams,
    pub style: Style,
}

#[derive(Debug, Error)]
enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings do not match the expected shape: {0}")]
    Decode(String),
}

/// Load settings from `path`, falling back to defaults on any problem
pub fn load_config(path: &Path) -> AppConfig {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No settings file, using defaults");
        return AppConfig::default();
    }

    match read_and_merge(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Loaded settings file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed loading settings, using defaults"
            );
            AppConfig::default()
        }
    }
}

fn read_and_merge(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let overrides: toml::Table = toml::from_str(&content)?;
    merge_over_defaults(&overrides)
}

/// Shallow-merge `overrides` over the defaults, one group at a time.
///
/// Keys are applied one by one. A value of the wrong type is skipped with a
/// warning and its default kept, so the other supplied keys still apply.
fn merge_over_defaults(overrides: &toml::Table) -> Result<AppConfig, ConfigError> {
    let toml::Value::Table(mut merged) = toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Decode(e.to_string()))?
    else {
        return Err(ConfigError::Decode("defaults are not a table".to_string()));
    };

    for group in GROUPS {
        let Some(toml::Value::Table(supplied)) = overrides.get(*group) else {
            continue;
        };
        for (key, value) in supplied {
            let mut candidate = merged.clone();
            if let Some(toml::Value::Table(target)) = candidate.get_mut(*group) {
                target.insert(key.clone(), value.clone());
            }
            match decode(candidate.clone()) {
                Ok(_) => merged = candidate,
                Err(e) => tracing::warn!(
                    group = *group,
                    key = %key,
                    error = %e,
                    "Ignoring invalid setting, keeping default"
                ),
            }
        }
    }

    decode(merged)
}

fn decode(table: toml::Table) -> Result<AppConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_settings(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.app.title, "MH Consult — Mental Health Consultation");
        assert_eq!(config.model.default_model, "gpt-4o-mini");
        assert_eq!(config.model.max_tokens, 512);
        assert!((config.model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.style.background_color, "#FFFFFF");
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let file = write_settings("[app\ntitle = ");
        assert_eq!(load_config(file.path()), AppConfig::default());
    }

    #[test]
    fn test_partial_group_keeps_sibling_defaults() {
        let file = write_settings(
            r#"
[model]
max_tokens = 256

[app]
crisis_hotline = "988"
"#,
        );
        let config = load_config(file.path());

        assert_eq!(config.model.max_tokens, 256);
        assert_eq!(config.model.default_model, "gpt-4o-mini");
        assert!((config.model.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.app.crisis_hotline, "988");
        assert_eq!(config.app.title, AppText::default().title);
        assert_eq!(config.style, Style::default());
    }

    #[test]
    fn test_full_override() {
        let file = write_settings(
            r##"
[app]
title = "Support"
warning_message = "Not medical advice."
crisis_hotline = "988"
crisis_text = "Text HOME to 741741"

[model]
default_model = "gpt-4o"
max_tokens = 1024
temperature = 0.2

[style]
background_color = "#F0F0F0"
"##,
        );
        let config = load_config(file.path());

        assert_eq!(config.app.title, "Support");
        assert_eq!(config.app.crisis_text, "Text HOME to 741741");
        assert_eq!(config.model.default_model, "gpt-4o");
        assert_eq!(config.model.max_tokens, 1024);
        assert!((config.model.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.style.background_color, "#F0F0F0");
    }

    #[test]
    fn test_integer_temperature_accepted() {
        let file = write_settings("[model]\ntemperature = 1\n");
        let config = load_config(file.path());
        assert!((config.model.temperature - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_groups_and_keys_ignored() {
        let file = write_settings(
            r#"
[server]
port = 9000

[style]
background_color = "black"
font = "serif"
"#,
        );
        let config = load_config(file.path());
        assert_eq!(config.style.background_color, "black");
        assert_eq!(config.app, AppText::default());
    }

    #[test]
    fn test_non_table_group_ignored() {
        let file = write_settings("model = \"gpt-4o\"\n");
        assert_eq!(load_config(file.path()), AppConfig::default());
    }

    #[test]
    fn test_wrong_value_type_keeps_other_keys() {
        let file = write_settings(
            r#"
[app]
crisis_hotline = 988
crisis_text = "Text HOME to 741741"

[model]
max_tokens = "lots"
default_model = "gpt-4o"
temperature = 0.3
"#,
        );
        let config = load_config(file.path());

        assert_eq!(config.model.max_tokens, ModelParams::default().max_tokens);
        assert_eq!(config.model.default_model, "gpt-4o");
        assert!((config.model.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.app.crisis_hotline, AppText::default().crisis_hotline);
        assert_eq!(config.app.crisis_text, "Text HOME to 741741");
        assert_eq!(config.style, Style::default());
    }

    #[test]
    fn test_only_wrong_value_type_yields_defaults() {
        let file = write_settings("[model]\nmax_tokens = \"lots\"\n");
        assert_eq!(load_config(file.path()), AppConfig::default());
    }
}
