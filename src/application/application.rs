use std::borrow::Cow;
use std::io;
use std::path::Path;

use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info};

use crate::application::{InputSource, RuntimeConfig};
use crate::cli::Cli;
use crate::config::{Settings, SettingsError};
use crate::ext::BestEffortPathExt;
use crate::report::{ConsoleReporter, Summary};
use crate::tree::{EXAMPLE_TREE, Materializer};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<Summary, ApplicationError> {
        let settings = Settings::read(cli.config.as_deref(), Path::new("."))
            .await
            .context(SettingsSnafu)?;
        debug!("Loaded settings: {:?}", settings);

        let runtime_config = RuntimeConfig::resolve(cli, settings);
        debug!("Resolved runtime config: {:?}", runtime_config);

        let tree_text = Self::load_tree_text(&runtime_config.input).await?;

        let color = runtime_config.color && supports_color::on(Stream::Stdout).is_some();
        let mut reporter = ConsoleReporter::stdout(color);
        let summary = Materializer::new(runtime_config.base.clone())
            .with_policy(runtime_config.policy)
            .run(&tree_text, &mut reporter);
        info!("Materialization finished: {:?}", summary);

        Ok(summary)
    }

    async fn load_tree_text(input: &InputSource) -> Result<Cow<'static, str>, ApplicationError> {
        match input {
            InputSource::Builtin => {
                debug!("Using the built-in example tree");
                Ok(Cow::Borrowed(EXAMPLE_TREE))
            }
            InputSource::Stdin => {
                debug!("Reading tree from stdin");
                io::read_to_string(io::stdin())
                    .map(Cow::Owned)
                    .context(StdinReadSnafu)
            }
            InputSource::File(path) => {
                debug!("Reading tree from {}", path.best_effort_path_display());
                let bytes = compio::fs::read(path).await.context(InputReadSnafu {
                    file_path: path.best_effort_path_display(),
                })?;
                String::from_utf8(bytes)
                    .map(Cow::Owned)
                    .context(InputEncodingSnafu {
                        file_path: path.best_effort_path_display(),
                    })
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading settings"))]
    SettingsError { source: SettingsError },
    #[snafu(display("Failed to read the tree file: {}", file_path))]
    InputReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Tree file {} is not valid UTF-8", file_path))]
    InputEncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to read the tree from stdin"))]
    StdinReadError { source: std::io::Error },
}
