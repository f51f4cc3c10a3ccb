//! Setlist core: pure job state machine, result model and view-model helpers.
mod deep_link;
mod effect;
mod msg;
mod options;
mod result;
mod state;
mod update;
mod validate;
mod view_model;

pub use deep_link::{auto_start_candidate, AUTO_START_PARAM};
pub use effect::Effect;
pub use msg::Msg;
pub use options::OptionSet;
pub use result::{MatchedTrack, PayloadError, ResultModel, ResultType, TrackOutcome};
pub use state::{AppState, ErrorKind, ErrorOutcome, Job, JobId, JobStatus};
pub use update::update;
pub use validate::{input_hint, is_valid_setlist_url, InputHint};
pub use view_model::{AppViewModel, OptionToggleView, ResultView, TrackRowView};
