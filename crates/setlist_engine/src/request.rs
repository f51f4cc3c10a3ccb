use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use setlist_logging::{setlist_debug, setlist_info};

use crate::{
    ChannelError, CreationRequest, EngineSettings, FailureKind, JobChannel, JobId, ProgressSink,
};

const CONVERT_PATH: &str = "convert";

/// Single request/response variant: `GET /convert?url=..&options=..`.
///
/// No progress is ever emitted; the body of a 2xx response is the payload.
#[derive(Debug, Clone)]
pub struct RequestChannel {
    settings: EngineSettings,
    client: reqwest::Client,
}

impl RequestChannel {
    pub fn new(settings: EngineSettings) -> Result<Self, ChannelError> {
        let client = build_client(&settings)?;
        Ok(Self { settings, client })
    }
}

pub(crate) fn build_client(settings: &EngineSettings) -> Result<reqwest::Client, ChannelError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| ChannelError::new(FailureKind::Transport, err.to_string()))
}

#[async_trait::async_trait]
impl JobChannel for RequestChannel {
    async fn run(
        &self,
        job_id: JobId,
        request: &CreationRequest,
        _sink: &dyn ProgressSink,
    ) -> Result<serde_json::Value, ChannelError> {
        let mut endpoint = self.settings.endpoint(CONVERT_PATH)?;
        endpoint
            .query_pairs_mut()
            .append_pair("url", &request.url)
            .append_pair("options", &request.options);
        setlist_info!("Job {} requesting {}", job_id, endpoint);

        let response = self
            .client
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // The body carries no structured detail worth reading.
            return Err(ChannelError::new(
                FailureKind::ServerRejected {
                    status: Some(status.as_u16()),
                },
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        setlist_debug!("Job {} received {} bytes", job_id, body.len());

        serde_json::from_slice(&body).map_err(|err| {
            ChannelError::new(
                FailureKind::PayloadMalformed,
                format!("response is not json: {err}"),
            )
        })
    }
}

fn too_large(max_bytes: u64, actual: u64) -> ChannelError {
    ChannelError::new(
        FailureKind::PayloadMalformed,
        format!("response too large (max {max_bytes}, actual {actual})"),
    )
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ChannelError {
    if err.is_timeout() {
        return ChannelError::new(FailureKind::Timeout, err.to_string());
    }
    ChannelError::new(FailureKind::Transport, err.to_string())
}
