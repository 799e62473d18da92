use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "etap", about = "Run the staged self-report assessment bot")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Run(Run),
    Validate(Validate),
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Run {
    #[arg(short, long, help = "The directory the battery and interpretation documents are stored in")]
    pub(crate) config: PathBuf,

    #[arg(long, help = "Webhook the operator is notified on when a respondent finishes")]
    pub(crate) operator_webhook: Option<Url>,

    #[arg(long, default_value = "dev", help = "Set the environment reported in logs")]
    pub(crate) env: String,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Validate {
    #[arg(short, long, help = "The directory the battery and interpretation documents are stored in")]
    pub(crate) config: PathBuf,
}
