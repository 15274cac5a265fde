use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find flag references in NDJSON file records ({"path", "lines"})
    Scan {
        /// JSON object mapping each flag key to its aliases
        #[clap(long, value_parser)]
        flags: PathBuf,

        #[clap(long, value_parser)]
        config: Option<PathBuf>,

        #[clap(long, value_parser)]
        project_key: Option<String>,

        #[clap(long, value_parser, allow_hyphen_values = true)]
        context_lines: Option<i32>,

        /// Read file records from here instead of stdin
        #[clap(long, value_parser)]
        input: Option<PathBuf>,

        #[clap(long, value_parser, default_value_t = false)]
        pretty: bool,

        #[clap(long, value_parser, default_value_t = false)]
        print_metrics: bool,
    },
    /// Resolve the GitHub Actions environment into scan options
    GithubEnv,
}
