use std::sync::mpsc;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    ChannelError, CreationRequest, EngineEvent, EngineSettings, JobId, RequestChannel,
    StreamingChannel, TransportKind,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Forwards events to the engine's event queue until the job is cancelled.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        if !self.cancel.is_cancelled() {
            let _ = self.tx.send(event);
        }
    }
}

/// Transport that carries one creation request to the server.
///
/// Progress text goes through `sink` in delivery order; the return value is
/// the terminal outcome: the raw success payload or a classified failure.
#[async_trait::async_trait]
pub trait JobChannel: Send + Sync {
    async fn run(
        &self,
        job_id: JobId,
        request: &CreationRequest,
        sink: &dyn ProgressSink,
    ) -> Result<serde_json::Value, ChannelError>;
}

pub fn build_channel(settings: &EngineSettings) -> Result<Arc<dyn JobChannel>, ChannelError> {
    let channel: Arc<dyn JobChannel> = match settings.transport {
        TransportKind::Streaming => Arc::new(StreamingChannel::new(settings.clone())),
        TransportKind::Request => Arc::new(RequestChannel::new(settings.clone())?),
    };
    Ok(channel)
}
