use std::time::Duration;

use anyhow::Result;
use setlist_core::{Effect, ErrorKind, ErrorOutcome, Msg};
use setlist_engine::{ChannelError, EngineEvent, EngineHandle, EngineSettings, FailureKind, StateDir};
use setlist_logging::{setlist_debug, setlist_info, setlist_warn};

use super::persistence;

/// Executes core effects against the engine and the state directory, and
/// turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    state_dir: StateDir,
    counter_requests: PendingCounters,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings, state_dir: StateDir) -> Result<Self> {
        let engine = EngineHandle::new(settings)?;
        Ok(Self {
            engine,
            state_dir,
            counter_requests: PendingCounters::default(),
        })
    }

    pub fn state_dir(&self) -> &StateDir {
        &self.state_dir
    }

    /// A counter refresh was requested and has not answered yet.
    pub fn counter_pending(&self) -> bool {
        self.counter_requests.is_pending()
    }

    pub fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenChannel {
                    job_id,
                    url,
                    options,
                } => {
                    setlist_info!(
                        "OpenChannel job_id={} url={} options={}",
                        job_id,
                        url,
                        options.to_comma_joined()
                    );
                    self.engine.start_job(job_id, url, options.to_comma_joined());
                }
                Effect::CloseChannel { job_id } => {
                    setlist_debug!("CloseChannel job_id={}", job_id);
                    self.engine.cancel_job(job_id);
                }
                Effect::SaveOptions(options) => {
                    persistence::save_options(&self.state_dir, &options);
                }
                Effect::RefreshCounter => {
                    self.counter_requests.requested();
                    self.engine.refresh_counter();
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event that means something to the core.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        if matches!(event, EngineEvent::CounterRefreshed(_)) {
            self.counter_requests.answered();
        }
        event_to_msg(event)
    }
}

/// Counter refreshes in flight; each request gets exactly one reply event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingCounters(usize);

impl PendingCounters {
    pub(crate) fn requested(&mut self) {
        self.0 += 1;
    }

    pub(crate) fn answered(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    pub(crate) fn is_pending(self) -> bool {
        self.0 > 0
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress { job_id, text } => Some(Msg::JobProgress { job_id, text }),
        EngineEvent::JobCompleted {
            job_id,
            result: Ok(payload),
        } => Some(Msg::JobSucceeded { job_id, payload }),
        EngineEvent::JobCompleted {
            job_id,
            result: Err(err),
        } => {
            setlist_warn!("Job {} failed: {}", job_id, err);
            Some(Msg::JobFailed {
                job_id,
                error: map_failure(&err),
            })
        }
        EngineEvent::CounterRefreshed(Ok(count)) => Some(Msg::CounterRefreshed(count)),
        EngineEvent::CounterRefreshed(Err(err)) => {
            setlist_warn!("Counter unavailable: {}", err);
            None
        }
    }
}

fn map_failure(err: &ChannelError) -> ErrorOutcome {
    let kind = match err.kind {
        FailureKind::Transport => ErrorKind::TransportError,
        FailureKind::ServerRejected { .. } => ErrorKind::ServerRejected,
        FailureKind::Timeout => ErrorKind::Timeout,
        FailureKind::PayloadMalformed => ErrorKind::PayloadMalformed,
    };
    ErrorOutcome::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn failures_keep_their_category() {
        let msg = event_to_msg(EngineEvent::JobCompleted {
            job_id: 3,
            result: Err(ChannelError::new(
                FailureKind::ServerRejected { status: Some(500) },
                "500 Internal Server Error",
            )),
        });
        assert_eq!(
            msg,
            Some(Msg::JobFailed {
                job_id: 3,
                error: ErrorOutcome::new(
                    ErrorKind::ServerRejected,
                    "server rejected the request (http status 500): 500 Internal Server Error"
                ),
            })
        );
    }

    #[test]
    fn payload_and_progress_pass_through() {
        assert_eq!(
            event_to_msg(EngineEvent::Progress {
                job_id: 1,
                text: "Queued...".to_string()
            }),
            Some(Msg::JobProgress {
                job_id: 1,
                text: "Queued...".to_string()
            })
        );
        let payload = json!({"searchResults": []});
        assert_eq!(
            event_to_msg(EngineEvent::JobCompleted {
                job_id: 1,
                result: Ok(payload.clone())
            }),
            Some(Msg::JobSucceeded { job_id: 1, payload })
        );
    }

    #[test]
    fn early_counter_reply_leaves_the_later_request_pending() {
        let mut pending = PendingCounters::default();
        assert!(!pending.is_pending());

        // Start-up refresh, then the refresh after a completed job.
        pending.requested();
        pending.requested();
        pending.answered();
        assert!(pending.is_pending());

        pending.answered();
        assert!(!pending.is_pending());

        pending.answered();
        assert!(!pending.is_pending());
    }

    #[test]
    fn counter_failure_is_dropped() {
        let err = ChannelError::new(FailureKind::Timeout, "slow");
        assert_eq!(event_to_msg(EngineEvent::CounterRefreshed(Err(err))), None);
        assert_eq!(
            event_to_msg(EngineEvent::CounterRefreshed(Ok(7))),
            Some(Msg::CounterRefreshed(7))
        );
    }
}
