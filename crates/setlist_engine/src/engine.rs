use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use setlist_logging::{setlist_debug, setlist_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::channel::{build_channel, ChannelProgressSink, JobChannel};
use crate::{
    ChannelError, CounterClient, CreationRequest, EngineEvent, EngineSettings, FailureKind, JobId,
};

/// No job is running.
const IDLE: JobId = 0;

enum EngineCommand {
    Start {
        job_id: JobId,
        request: CreationRequest,
    },
    Cancel {
        job_id: JobId,
    },
    RefreshCounter,
}

/// Front-end side of the engine: commands in, events out.
///
/// All I/O runs on a tokio runtime owned by a background thread. At most one
/// job channel runs at a time; starting another cancels the previous one.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    active: Arc<AtomicU64>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, ChannelError> {
        let channel = build_channel(&settings)?;
        Self::with_channel(settings, channel)
    }

    /// Builds an engine around an explicit channel implementation.
    pub fn with_channel(
        settings: EngineSettings,
        channel: Arc<dyn JobChannel>,
    ) -> Result<Self, ChannelError> {
        let counter = Arc::new(CounterClient::new(&settings)?);
        let runtime = Runtime::new().map_err(|err| {
            ChannelError::new(
                FailureKind::Transport,
                format!("cannot start engine runtime: {err}"),
            )
        })?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let active = Arc::new(AtomicU64::new(IDLE));

        let worker = Worker {
            channel,
            counter,
            job_timeout: settings.job_timeout,
            event_tx,
            active: active.clone(),
        };
        thread::spawn(move || worker.run(runtime, cmd_rx));

        Ok(Self {
            cmd_tx,
            event_rx,
            active,
        })
    }

    /// Opens a channel for `job_id`; its events arrive through [`try_recv`](Self::try_recv).
    pub fn start_job(&self, job_id: JobId, url: impl Into<String>, options: impl Into<String>) {
        // Mark active right away so `is_active` holds before the worker picks it up.
        self.active.store(job_id, Ordering::SeqCst);
        let _ = self.cmd_tx.send(EngineCommand::Start {
            job_id,
            request: CreationRequest {
                url: url.into(),
                options: options.into(),
            },
        });
    }

    /// Releases the channel of `job_id`. Nothing more is reported for it.
    pub fn cancel_job(&self, job_id: JobId) {
        let _ = self
            .active
            .compare_exchange(job_id, IDLE, Ordering::SeqCst, Ordering::SeqCst);
        let _ = self.cmd_tx.send(EngineCommand::Cancel { job_id });
    }

    pub fn refresh_counter(&self) {
        let _ = self.cmd_tx.send(EngineCommand::RefreshCounter);
    }

    pub fn is_active(&self) -> bool {
        self.active_job().is_some()
    }

    pub fn active_job(&self) -> Option<JobId> {
        match self.active.load(Ordering::SeqCst) {
            IDLE => None,
            job_id => Some(job_id),
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct Worker {
    channel: Arc<dyn JobChannel>,
    counter: Arc<CounterClient>,
    job_timeout: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
    active: Arc<AtomicU64>,
}

impl Worker {
    fn run(self, runtime: Runtime, cmd_rx: mpsc::Receiver<EngineCommand>) {
        let mut running: Option<(JobId, CancellationToken)> = None;
        while let Ok(command) = cmd_rx.recv() {
            match command {
                EngineCommand::Start { job_id, request } => {
                    if let Some((previous, token)) = running.take() {
                        setlist_warn!("Job {} replaced by job {}, cancelling it", previous, job_id);
                        token.cancel();
                    }
                    let token = CancellationToken::new();
                    running = Some((job_id, token.clone()));
                    runtime.spawn(self.job_task(job_id, request, token));
                }
                EngineCommand::Cancel { job_id } => {
                    if let Some((_, token)) = running.take_if(|(running_id, _)| *running_id == job_id) {
                        setlist_debug!("Releasing channel of job {}", job_id);
                        token.cancel();
                    }
                }
                EngineCommand::RefreshCounter => {
                    let counter = self.counter.clone();
                    let event_tx = self.event_tx.clone();
                    runtime.spawn(async move {
                        let result = counter.fetch().await;
                        if let Err(err) = &result {
                            setlist_warn!("Counter refresh failed: {}", err);
                        }
                        let _ = event_tx.send(EngineEvent::CounterRefreshed(result));
                    });
                }
            }
        }
    }

    fn job_task(
        &self,
        job_id: JobId,
        request: CreationRequest,
        token: CancellationToken,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let channel = self.channel.clone();
        let event_tx = self.event_tx.clone();
        let active = self.active.clone();
        let job_timeout = self.job_timeout;

        async move {
            let sink = ChannelProgressSink::new(event_tx.clone(), token.clone());
            let outcome = tokio::select! {
                _ = token.cancelled() => None,
                outcome = tokio::time::timeout(job_timeout, channel.run(job_id, &request, &sink)) => {
                    Some(outcome.unwrap_or_else(|_| {
                        Err(ChannelError::new(
                            FailureKind::Timeout,
                            format!("no result within {}s", job_timeout.as_secs()),
                        ))
                    }))
                }
            };

            let _ = active.compare_exchange(job_id, IDLE, Ordering::SeqCst, Ordering::SeqCst);
            match outcome {
                Some(result) if !token.is_cancelled() => {
                    let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
                }
                _ => setlist_debug!("Job {} cancelled, dropping its outcome", job_id),
            }
        }
    }
}
