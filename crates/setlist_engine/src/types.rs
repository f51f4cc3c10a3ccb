use std::fmt;

use thiserror::Error;

pub type JobId = u64;

/// What a job channel sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub url: String,
    /// Comma-joined enabled option identifiers.
    pub options: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Progress {
        job_id: JobId,
        text: String,
    },
    JobCompleted {
        job_id: JobId,
        result: Result<serde_json::Value, ChannelError>,
    },
    CounterRefreshed(Result<u64, ChannelError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ChannelError {
    pub kind: FailureKind,
    pub message: String,
}

impl ChannelError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection failed or dropped before a terminal message.
    Transport,
    /// Non-2xx status or the server's error sentinel.
    ServerRejected { status: Option<u16> },
    Timeout,
    /// Terminal message could not be read as a payload.
    PayloadMalformed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport error"),
            FailureKind::ServerRejected { status: Some(code) } => {
                write!(f, "server rejected the request (http status {code})")
            }
            FailureKind::ServerRejected { status: None } => {
                write!(f, "server rejected the request")
            }
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::PayloadMalformed => write!(f, "malformed payload"),
        }
    }
}
