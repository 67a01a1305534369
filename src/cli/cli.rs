use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::tree::DirectoryFailurePolicy;

/// Creates empty directories and files from a tree listing.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// File holding the tree listing. `-` reads stdin; omitted uses the built-in example
    pub input: Option<PathBuf>,

    /// Directory the tree is created in [default: .]
    #[clap(long, short)]
    pub base: Option<PathBuf>,

    /// Settings file [default: treeforge.yaml when present]
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// What to do with entries nested under a directory that could not be created
    #[clap(long, value_enum)]
    pub on_directory_failure: Option<DirectoryFailurePolicy>,

    /// Disable colored progress output
    #[clap(long)]
    pub no_color: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
