use setlist_logging::{setlist_debug, setlist_info, setlist_warn};

use crate::{
    auto_start_candidate, is_valid_setlist_url, AppState, Effect, ErrorKind, ErrorOutcome, JobId,
    Msg, ResultModel,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![Effect::RefreshCounter],
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::CancelClicked => match state.abandon_job() {
            Some(job_id) => {
                setlist_info!("Job {} cancelled by user", job_id);
                vec![Effect::CloseChannel { job_id }]
            }
            None => Vec::new(),
        },
        Msg::AvailableOptions(ids) => {
            state.set_available_options(ids);
            Vec::new()
        }
        Msg::OptionsRestored(stored) => {
            state.restore_options(stored);
            Vec::new()
        }
        Msg::OptionToggled { id, enabled } => {
            if state.toggle_option(&id, enabled) {
                vec![Effect::SaveOptions(state.enabled_options().clone())]
            } else {
                Vec::new()
            }
        }
        Msg::DeepLinkOpened(link) => return auto_start(state, &link),
        Msg::JobProgress { job_id, text } => {
            if !accepts(&state, job_id) {
                return (state, Vec::new());
            }
            state.apply_progress(text);
            Vec::new()
        }
        Msg::JobSucceeded { job_id, payload } => {
            if !accepts(&state, job_id) {
                return (state, Vec::new());
            }
            match ResultModel::from_payload(&payload) {
                Ok(result) => {
                    setlist_info!(
                        "Job {} completed: playlist {} ({} of {} songs)",
                        job_id,
                        result.playlist_id,
                        result.found_count(),
                        result.total_count()
                    );
                    state.complete_job(result);
                    vec![Effect::CloseChannel { job_id }, Effect::RefreshCounter]
                }
                Err(err) => {
                    setlist_warn!("Job {} returned an unusable payload: {}", job_id, err);
                    state.fail_job(ErrorOutcome::new(ErrorKind::PayloadMalformed, err.to_string()));
                    vec![Effect::CloseChannel { job_id }]
                }
            }
        }
        Msg::JobFailed { job_id, error } => {
            if !accepts(&state, job_id) {
                return (state, Vec::new());
            }
            setlist_warn!("Job {} failed ({:?}): {}", job_id, error.kind, error.message);
            state.fail_job(error);
            vec![Effect::CloseChannel { job_id }]
        }
        Msg::CounterRefreshed(value) => {
            state.set_counter(value);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    // Re-validate: the affordance may be stale relative to the input.
    if !is_valid_setlist_url(state.input()) {
        setlist_debug!("Submit ignored: input is not a setlist url");
        return Vec::new();
    }
    if state.is_job_active() {
        setlist_debug!("Submit ignored: a job is already active");
        return Vec::new();
    }
    if state.is_completed() {
        setlist_debug!("Submit ignored: playlist already created");
        return Vec::new();
    }

    let job = state.begin_job();
    setlist_info!(
        "Submitting job {} url={} options={}",
        job.id,
        job.url,
        job.options.to_comma_joined()
    );
    vec![
        Effect::SaveOptions(job.options.clone()),
        Effect::OpenChannel {
            job_id: job.id,
            url: job.url.clone(),
            options: job.options.clone(),
        },
    ]
}

/// Runs the manual submit path for a deep-link candidate.
fn auto_start(state: AppState, link: &str) -> (AppState, Vec<Effect>) {
    let Some(candidate) = auto_start_candidate(link) else {
        return (state, Vec::new());
    };
    if !is_valid_setlist_url(&candidate) {
        setlist_debug!("Auto-start ignored: {} is not a setlist url", candidate);
        return (state, Vec::new());
    }
    setlist_info!("Auto-starting job for {}", candidate);
    let (state, _) = update(state, Msg::InputChanged(candidate));
    update(state, Msg::SubmitClicked)
}

fn accepts(state: &AppState, job_id: JobId) -> bool {
    if state.accepts_callback(job_id) {
        return true;
    }
    let current = state.job().map(|job| (job.id, job.status));
    setlist_debug!(
        "Discarding callback for job {} (current job: {:?})",
        job_id,
        current
    );
    false
}
