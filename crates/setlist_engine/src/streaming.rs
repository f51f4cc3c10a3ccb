use futures_util::{SinkExt, Stream, StreamExt};
use serde::Serialize;
use setlist_logging::{setlist_debug, setlist_info, setlist_trace};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{
    ChannelError, CreationRequest, EngineEvent, EngineSettings, FailureKind, JobChannel, JobId,
    ProgressSink,
};

const STREAM_PATH: &str = "convert-ws";

/// Text the server sends instead of a payload when the job failed.
pub const ERROR_SENTINEL: &str = "ERROR";

/// Streaming variant: one WebSocket per job.
///
/// The client sends `{url, options}` once connected, then reads progress
/// text until the error sentinel or a JSON object with `searchResults`.
#[derive(Debug, Clone)]
pub struct StreamingChannel {
    settings: EngineSettings,
}

impl StreamingChannel {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

#[derive(Serialize)]
struct StreamRequest<'a> {
    url: &'a str,
    options: &'a str,
}

/// How a single text frame from the server is understood.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Error,
    Payload(serde_json::Value),
    Progress(String),
}

pub fn classify_message(text: &str) -> StreamMessage {
    if text == ERROR_SENTINEL {
        return StreamMessage::Error;
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) if value.get("searchResults").is_some() => StreamMessage::Payload(value),
        _ => StreamMessage::Progress(text.to_string()),
    }
}

#[async_trait::async_trait]
impl JobChannel for StreamingChannel {
    async fn run(
        &self,
        job_id: JobId,
        request: &CreationRequest,
        sink: &dyn ProgressSink,
    ) -> Result<serde_json::Value, ChannelError> {
        let endpoint = self.settings.websocket_endpoint(STREAM_PATH)?;
        let connect = tokio::time::timeout(
            self.settings.connect_timeout,
            connect_async(endpoint.as_str()),
        );
        let (mut socket, _) = match connect.await {
            Ok(Ok(connected)) => connected,
            Ok(Err(err)) => return Err(transport(err)),
            Err(_) => {
                return Err(ChannelError::new(
                    FailureKind::Timeout,
                    format!("connecting to {endpoint} timed out"),
                ))
            }
        };
        setlist_info!("Job {} connected to {}", job_id, endpoint);

        let body = serde_json::to_string(&StreamRequest {
            url: &request.url,
            options: &request.options,
        })
        .map_err(|err| ChannelError::new(FailureKind::Transport, err.to_string()))?;
        socket.send(Message::text(body)).await.map_err(transport)?;

        let outcome = read_until_terminal(job_id, &mut socket, sink).await;

        // Close from our side once the outcome is known; the server may already be gone.
        if let Err(err) = socket.close(None).await {
            setlist_debug!("Job {} close after terminal message: {}", job_id, err);
        }
        outcome
    }
}

async fn read_until_terminal<S>(
    job_id: JobId,
    socket: &mut S,
    sink: &dyn ProgressSink,
) -> Result<serde_json::Value, ChannelError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(message) = socket.next().await {
        match message {
            Ok(Message::Text(text)) => match classify_message(text.as_str()) {
                StreamMessage::Error => {
                    return Err(ChannelError::new(
                        FailureKind::ServerRejected { status: None },
                        "server reported an error",
                    ))
                }
                StreamMessage::Payload(payload) => return Ok(payload),
                StreamMessage::Progress(text) => {
                    setlist_trace!("Job {} progress: {}", job_id, text);
                    sink.emit(EngineEvent::Progress { job_id, text });
                }
            },
            Ok(Message::Close(frame)) => {
                setlist_debug!("Job {} closed by server: {:?}", job_id, frame);
                break;
            }
            Ok(_) => {}
            Err(err) => return Err(transport(err)),
        }
    }
    Err(ChannelError::new(
        FailureKind::Transport,
        "connection closed before a result arrived",
    ))
}

fn transport(err: WsError) -> ChannelError {
    ChannelError::new(FailureKind::Transport, err.to_string())
}
