use crate::{JobId, OptionSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a job channel for `url` with the option snapshot taken at submit time.
    OpenChannel {
        job_id: JobId,
        url: String,
        options: OptionSet,
    },
    /// Release the channel of a job that reached a terminal state or was abandoned.
    CloseChannel { job_id: JobId },
    /// Persist the option selection, best effort.
    SaveOptions(OptionSet),
    /// Fetch the global counter.
    RefreshCounter,
}
