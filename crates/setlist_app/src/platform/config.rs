use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use setlist_engine::EngineSettings;

use super::cli::{Cli, Transport};

/// Option toggles offered to the user, in display order.
pub const DEFAULT_OPTION_IDS: [&str; 6] = [
    "tapes-main",
    "tapes-foreign",
    "cover-originals",
    "medleys",
    "strict-search",
    "attach-image",
];

/// Settings read from the optional RON config file, then overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_base_url: String,
    pub transport: Transport,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub job_timeout_secs: u64,
    pub state_dir: PathBuf,
    pub log_file: PathBuf,
    pub verbose: bool,
    pub options: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            server_base_url: engine.server_base_url,
            transport: Transport::default(),
            connect_timeout_secs: engine.connect_timeout.as_secs(),
            request_timeout_secs: engine.request_timeout.as_secs(),
            job_timeout_secs: engine.job_timeout.as_secs(),
            state_dir: PathBuf::from(".setlist"),
            log_file: PathBuf::from("setlist.log"),
            verbose: false,
            options: DEFAULT_OPTION_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// A missing file yields the defaults; a file that does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server_base_url = server.clone();
        }
        if let Some(transport) = cli.transport {
            self.transport = transport;
        }
        if let Some(state_dir) = &cli.state_dir {
            self.state_dir = state_dir.clone();
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = log_file.clone();
        }
        self.verbose |= cli.verbose;
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            server_base_url: self.server_base_url.clone(),
            transport: self.transport.into(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            job_timeout: Duration::from_secs(self.job_timeout_secs),
            ..EngineSettings::default()
        }
    }
}
