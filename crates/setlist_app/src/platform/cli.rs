use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use setlist_engine::TransportKind;

/// Turn a setlist.fm setlist into a playlist.
#[derive(Parser, Debug)]
#[command(name = "setlist")]
#[command(version)]
pub struct Cli {
    /// Setlist page, e.g. https://www.setlist.fm/setlist/<artist>/<year>/<venue>.html
    pub url: Option<String>,

    /// Link carrying the setlist in its `auto` query parameter
    #[arg(long, conflicts_with = "url")]
    pub link: Option<String>,

    /// RON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the conversion service
    #[arg(long)]
    pub server: Option<String>,

    /// How jobs reach the service
    #[arg(long, value_enum)]
    pub transport: Option<Transport>,

    /// Directory for the saved option selection
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Also log to the terminal, at debug level
    #[arg(long)]
    pub verbose: bool,

    /// Comma-separated options to enable; the rest are disabled and the choice is saved
    #[arg(long, value_delimiter = ',')]
    pub options: Option<Vec<String>>,
}

/// Transport choice as written on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum Transport {
    #[default]
    Streaming,
    Request,
}

impl From<Transport> for TransportKind {
    fn from(transport: Transport) -> Self {
        match transport {
            Transport::Streaming => TransportKind::Streaming,
            Transport::Request => TransportKind::Request,
        }
    }
}
