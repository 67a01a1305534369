use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Settings;
use crate::tree::DirectoryFailurePolicy;

const STDIN_MARKER: &str = "-";

/// Where the tree listing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Builtin,
    Stdin,
    File(PathBuf),
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == STDIN_MARKER {
            InputSource::Stdin
        } else {
            InputSource::File(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub input: InputSource,
    pub base: PathBuf,
    pub policy: DirectoryFailurePolicy,
    pub color: bool,
}

impl RuntimeConfig {
    /// Command line flags take precedence over settings, settings over defaults.
    pub fn resolve(cli: Cli, settings: Settings) -> Self {
        Self {
            input: cli
                .input
                .or(settings.input)
                .map(InputSource::from)
                .unwrap_or(InputSource::Builtin),
            base: cli
                .base
                .or(settings.base)
                .unwrap_or_else(|| PathBuf::from(".")),
            policy: cli
                .on_directory_failure
                .or(settings.on_directory_failure)
                .unwrap_or_default(),
            color: !cli.no_color && settings.color.unwrap_or(true),
        }
    }
}
