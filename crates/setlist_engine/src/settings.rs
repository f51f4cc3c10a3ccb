use std::time::Duration;

use url::Url;

use crate::{ChannelError, FailureKind};

/// Which transport carries a job to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// WebSocket with streamed progress messages.
    #[default]
    Streaming,
    /// Single HTTP request, no progress.
    Request,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Base of the conversion service, e.g. `https://converter.example`.
    pub server_base_url: String,
    pub transport: TransportKind,
    pub connect_timeout: Duration,
    /// Upper bound for a single HTTP exchange (request variant and counter).
    pub request_timeout: Duration,
    /// Upper bound for a whole job, regardless of transport.
    pub job_timeout: Duration,
    /// Largest response body accepted from the request variant.
    pub max_bytes: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            server_base_url: "http://localhost:8080".to_string(),
            transport: TransportKind::Streaming,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            job_timeout: Duration::from_secs(300),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl EngineSettings {
    /// Resolves `path` against the server base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ChannelError> {
        let mut base = self.server_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|base| base.join(path))
            .map_err(|err| {
                ChannelError::new(
                    FailureKind::Transport,
                    format!("invalid server url {:?}: {err}", self.server_base_url),
                )
            })
    }

    /// Same as [`endpoint`](Self::endpoint) with the scheme switched to `ws`/`wss`.
    pub fn websocket_endpoint(&self, path: &str) -> Result<Url, ChannelError> {
        let mut url = self.endpoint(path)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ChannelError::new(
                    FailureKind::Transport,
                    format!("unsupported scheme {other:?} for a websocket"),
                ))
            }
        };
        if url.set_scheme(scheme).is_err() {
            return Err(ChannelError::new(
                FailureKind::Transport,
                format!("cannot switch {url} to {scheme}"),
            ));
        }
        Ok(url)
    }
}
