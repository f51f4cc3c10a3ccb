//! Setlist engine: job channels, counter client and state files.
mod channel;
mod counter;
mod engine;
mod persist;
mod request;
mod settings;
mod streaming;
mod types;

pub use channel::{build_channel, ChannelProgressSink, JobChannel, ProgressSink};
pub use counter::{parse_counter, CounterClient};
pub use engine::EngineHandle;
pub use persist::{PersistError, StateDir};
pub use request::RequestChannel;
pub use settings::{EngineSettings, TransportKind};
pub use streaming::{classify_message, StreamMessage, StreamingChannel, ERROR_SENTINEL};
pub use types::{ChannelError, CreationRequest, EngineEvent, FailureKind, JobId};
