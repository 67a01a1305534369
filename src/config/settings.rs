use std::path::{Path, PathBuf};

use clap::ValueEnum;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::{ext::BestEffortPathExt, tree::DirectoryFailurePolicy};

const SETTINGS_FILE_NAME: &str = "treeforge.yaml";

/// Values read from a settings file. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub base: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub on_directory_failure: Option<DirectoryFailurePolicy>,
    pub color: Option<bool>,
}

impl Settings {
    /// Reads `explicit` if given, otherwise `treeforge.yaml` in `dir` when it exists.
    pub async fn read(explicit: Option<&Path>, dir: &Path) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::from_path(path).await;
        }

        let default_path = dir.join(SETTINGS_FILE_NAME);
        if default_path.is_file() {
            Self::from_path(&default_path).await
        } else {
            debug!(
                "No settings file at {}, using defaults",
                default_path.best_effort_path_display()
            );
            Ok(Self::default())
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, SettingsError> {
        debug!("Reading settings file: {}", path.best_effort_path_display());
        let bytes = compio::fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read settings file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_settings_from_yaml(
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Self, SettingsError> {
        top_level
            .iter()
            .try_fold(Settings::default(), |mut settings, (key, value)| {
                let Yaml::Value(Scalar::String(key)) = key else {
                    debug!("Skipping non-string settings key: {:?}", key);
                    return Ok(settings);
                };
                let key: &str = key;

                match key {
                    "base" => settings.base = Some(string_value(key, value)?.into()),
                    "input" => settings.input = Some(string_value(key, value)?.into()),
                    "on_directory_failure" => {
                        let raw = string_value(key, value)?;
                        let policy = <DirectoryFailurePolicy as ValueEnum>::from_str(raw, true)
                            .map_err(|_| SettingsError::InvalidValueError {
                                key: key.to_string(),
                            })?;
                        settings.on_directory_failure = Some(policy);
                    }
                    "color" => match value {
                        Yaml::Value(Scalar::Boolean(color)) => settings.color = Some(*color),
                        _ => return InvalidValueSnafu { key }.fail(),
                    },
                    other => debug!("Ignoring unknown settings key '{}'", other),
                }
                Ok(settings)
            })
    }
}

fn string_value<'a>(key: &str, value: &'a Yaml) -> Result<&'a str, SettingsError> {
    match value {
        Yaml::Value(Scalar::String(text)) => Ok(&**text),
        _ => InvalidValueSnafu { key }.fail(),
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Settings::default());
        };

        let top_level = document
            .as_mapping()
            .ok_or(SettingsError::TopLevelNotMap)?;

        Self::parse_settings_from_yaml(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Settings file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of settings should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Invalid value for setting '{}'", key))]
    InvalidValueError { key: String },
}
