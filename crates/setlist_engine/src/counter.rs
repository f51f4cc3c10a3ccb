use url::Url;

use crate::request::{build_client, map_reqwest_error};
use crate::{ChannelError, EngineSettings, FailureKind};

const COUNTER_PATH: &str = "counter";

/// Reads the global "playlists created" counter from its plain-text endpoint.
#[derive(Debug, Clone)]
pub struct CounterClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl CounterClient {
    pub fn new(settings: &EngineSettings) -> Result<Self, ChannelError> {
        Ok(Self {
            client: build_client(settings)?,
            endpoint: settings.endpoint(COUNTER_PATH)?,
        })
    }

    pub async fn fetch(&self) -> Result<u64, ChannelError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::new(
                FailureKind::ServerRejected {
                    status: Some(status.as_u16()),
                },
                status.to_string(),
            ));
        }

        let text = response.text().await.map_err(map_reqwest_error)?;
        parse_counter(&text)
    }
}

/// Parses the counter text, which the server may format with thousands separators.
pub fn parse_counter(text: &str) -> Result<u64, ChannelError> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\u{a0}'))
        .collect();
    digits.parse().map_err(|_| {
        ChannelError::new(
            FailureKind::PayloadMalformed,
            format!("counter is not a number: {:?}", text.trim()),
        )
    })
}
