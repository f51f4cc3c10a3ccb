use crate::{ErrorOutcome, InputHint, JobId, JobStatus, ResultModel, ResultType};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub status: JobStatus,
    pub job_id: Option<JobId>,
    pub input: String,
    pub input_valid: bool,
    pub input_hint: Option<InputHint>,
    pub can_submit: bool,
    pub options: Vec<OptionToggleView>,
    /// Most recent progress text of the active job.
    pub latest_progress: Option<String>,
    pub result: Option<ResultView>,
    pub error: Option<ErrorOutcome>,
    pub counter: Option<u64>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionToggleView {
    pub id: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub headline: String,
    pub summary: String,
    pub playlist_url: String,
    pub rows: Vec<TrackRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRowView {
    pub index: u32,
    pub name: String,
    pub result_type: ResultType,
    pub label: &'static str,
    pub is_match: bool,
}

impl ResultView {
    pub fn from_model(model: &ResultModel) -> Self {
        let headline = match &model.venue {
            Some(venue) => format!(
                "{} @ {}, {} ({})",
                model.artist_name, venue, model.city, model.event_date
            ),
            None => format!(
                "{} @ {} ({})",
                model.artist_name, model.city, model.event_date
            ),
        };

        let summary = if model.tracks.is_empty() && model.missed_count > 0 {
            format!(
                "Playlist created in ~{}, {} songs could not be found",
                model.elapsed_display(),
                model.missed_count
            )
        } else {
            format!(
                "Playlist created with {} of {} songs in ~{}",
                model.found_count(),
                model.total_count(),
                model.elapsed_display()
            )
        };

        let rows = model
            .tracks
            .iter()
            .map(|track| TrackRowView {
                index: track.index,
                name: track.display_name().to_string(),
                result_type: track.result_type,
                label: track.result_type.label(),
                is_match: track.result_type.is_found(),
            })
            .collect();

        Self {
            headline,
            summary,
            playlist_url: model.playlist_url.clone(),
            rows,
        }
    }
}
