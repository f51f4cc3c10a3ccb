use crate::{ErrorOutcome, JobId, OptionSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front-end finished initializing ("page load").
    Started,
    /// User edited the setlist URL input box.
    InputChanged(String),
    /// User clicked Create Playlist or pressed Enter.
    SubmitClicked,
    /// User abandoned the running job.
    CancelClicked,
    /// Front-end reports which option toggles exist, in display order.
    AvailableOptions(Vec<String>),
    /// Previously persisted option selection, `None` if nothing was stored.
    OptionsRestored(Option<OptionSet>),
    /// User flipped a single option toggle.
    OptionToggled { id: String, enabled: bool },
    /// Front-end was opened through a link that may carry an auto-start URL.
    DeepLinkOpened(String),
    /// Channel progress text for a job.
    JobProgress { job_id: JobId, text: String },
    /// Channel delivered the terminal success payload for a job.
    JobSucceeded {
        job_id: JobId,
        payload: serde_json::Value,
    },
    /// Channel failed before or instead of delivering a payload.
    JobFailed { job_id: JobId, error: ErrorOutcome },
    /// Global "playlists created" counter was fetched.
    CounterRefreshed(u64),
    /// UI/render tick to coalesce rendering.
    Tick,
}
