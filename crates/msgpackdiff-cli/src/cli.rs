use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use msgpackdiff_diff::DiffConfig;

#[derive(Parser, Debug)]
#[command(
    name = "msgpackdiff",
    about = "Compare two MessagePack objects and report their differences",
    version
)]
pub struct Cli {
    /// First object: base64 text, or a file with raw or base64 MessagePack
    pub first: String,

    /// Second object, in the same forms as the first
    pub second: String,

    /// Stop at the first difference and print no report
    #[arg(long)]
    pub brief: bool,

    /// Treat missing fields as empty values
    #[arg(long)]
    pub ignore_empty: bool,

    /// Ignore the order of map keys
    #[arg(long)]
    pub ignore_order: bool,

    /// Compare numbers of different types by value
    #[arg(long)]
    pub flexible_types: bool,

    /// Unchanged entries shown around each change
    #[arg(long, value_name = "N")]
    pub context: Option<usize>,

    /// TOML file with default options
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl Cli {
    /// Layer the command-line flags over a base configuration. Flags can
    /// only switch options on.
    pub fn apply(&self, mut config: DiffConfig) -> DiffConfig {
        let options = &mut config.options;
        options.brief |= self.brief;
        options.ignore_empty |= self.ignore_empty;
        options.ignore_order |= self.ignore_order;
        options.flexible_types |= self.flexible_types;
        if let Some(context) = self.context {
            config.context = context;
        }
        config
    }
}
