use chrono::{DateTime, Utc};

use crate::view_model::{AppViewModel, OptionToggleView, ResultView};
use crate::{input_hint, is_valid_setlist_url, OptionSet, ResultModel};

/// Generation number of a job. Every submission gets a fresh, larger id.
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Submitting,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Submitting | JobStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransportError,
    ServerRejected,
    Timeout,
    PayloadMalformed,
}

/// Failure surfaced once for a failed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorOutcome {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorOutcome {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub options: OptionSet,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub latest_progress: Option<String>,
    pub progress_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    input: String,
    input_valid: bool,
    available_options: Vec<String>,
    enabled_options: OptionSet,
    /// Selection of record once the stored options were restored: `Some(None)`
    /// means nothing was stored. Re-applied whenever the available list changes.
    restored_options: Option<Option<OptionSet>>,
    job: Option<Job>,
    next_job_id: JobId,
    result: Option<ResultModel>,
    last_error: Option<ErrorOutcome>,
    counter: Option<u64>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input: String::new(),
            input_valid: false,
            available_options: Vec::new(),
            enabled_options: OptionSet::new(),
            restored_options: None,
            job: None,
            next_job_id: 1,
            result: None,
            last_error: None,
            counter: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let options = self
            .available_options
            .iter()
            .map(|id| OptionToggleView {
                id: id.clone(),
                enabled: self.enabled_options.contains(id),
            })
            .collect();

        AppViewModel {
            status: self.status(),
            job_id: self.job.as_ref().map(|job| job.id),
            input: self.input.clone(),
            input_valid: self.input_valid,
            input_hint: input_hint(&self.input),
            can_submit: self.can_submit(),
            options,
            latest_progress: self
                .job
                .as_ref()
                .filter(|job| job.status.is_active())
                .and_then(|job| job.latest_progress.clone()),
            result: self.result.as_ref().map(ResultView::from_model),
            error: self.last_error.clone(),
            counter: self.counter,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Status of the controller: the current job's status, or `Idle` without one.
    pub fn status(&self) -> JobStatus {
        self.job.as_ref().map_or(JobStatus::Idle, |job| job.status)
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn result(&self) -> Option<&ResultModel> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&ErrorOutcome> {
        self.last_error.as_ref()
    }

    pub fn counter(&self) -> Option<u64> {
        self.counter
    }

    /// The options currently toggled on.
    pub fn enabled_options(&self) -> &OptionSet {
        &self.enabled_options
    }

    pub fn is_job_active(&self) -> bool {
        self.status().is_active()
    }

    /// A completed job locks this controller; a new submission needs a new state.
    pub fn is_completed(&self) -> bool {
        self.status() == JobStatus::Completed
    }

    pub fn can_submit(&self) -> bool {
        self.input_valid && !self.is_job_active() && !self.is_completed()
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input_valid = is_valid_setlist_url(&input);
            self.input = input;
            self.mark_dirty();
        }
    }

    /// Whether callbacks for `job_id` should still be honored.
    pub(crate) fn accepts_callback(&self, job_id: JobId) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| job.id == job_id && job.status.is_active())
    }

    pub(crate) fn set_available_options(&mut self, ids: Vec<String>) {
        self.available_options = ids;
        match self.restored_options.clone() {
            Some(stored) => self.apply_restore_policy(stored.as_ref()),
            None => {
                self.enabled_options = self
                    .enabled_options
                    .iter()
                    .filter(|id| self.available_options.iter().any(|available| available == id))
                    .collect();
            }
        }
        self.mark_dirty();
    }

    /// Applies the load policy: nothing stored enables everything, otherwise
    /// exactly the stored subset of the available options is enabled.
    pub(crate) fn restore_options(&mut self, stored: Option<OptionSet>) {
        self.apply_restore_policy(stored.as_ref());
        self.restored_options = Some(stored);
        self.mark_dirty();
    }

    fn apply_restore_policy(&mut self, stored: Option<&OptionSet>) {
        self.enabled_options = match stored {
            None => self.available_options.iter().cloned().collect(),
            Some(stored) => self
                .available_options
                .iter()
                .filter(|id| stored.contains(id))
                .cloned()
                .collect(),
        };
    }

    /// Returns true if the toggle changed anything.
    pub(crate) fn toggle_option(&mut self, id: &str, enabled: bool) -> bool {
        if !self.available_options.iter().any(|available| available == id) {
            return false;
        }
        let changed = if enabled {
            self.enabled_options.insert(id)
        } else {
            self.enabled_options.remove(id)
        };
        if changed {
            if self.restored_options.is_some() {
                self.restored_options = Some(Some(self.enabled_options.clone()));
            }
            self.mark_dirty();
        }
        changed
    }

    /// Creates a fresh job for the current input with a snapshot of the enabled options.
    pub(crate) fn begin_job(&mut self) -> &Job {
        let id = self.next_job_id;
        self.next_job_id += 1;
        self.last_error = None;
        self.mark_dirty();
        self.job.insert(Job {
            id,
            url: self.input.clone(),
            options: self.enabled_options.clone(),
            status: JobStatus::Submitting,
            started_at: Utc::now(),
            latest_progress: None,
            progress_count: 0,
        })
    }

    pub(crate) fn apply_progress(&mut self, text: String) {
        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::InProgress;
            job.latest_progress = Some(text);
            job.progress_count += 1;
            self.mark_dirty();
        }
    }

    pub(crate) fn complete_job(&mut self, result: ResultModel) {
        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::Completed;
            self.result = Some(result);
            self.mark_dirty();
        }
    }

    pub(crate) fn fail_job(&mut self, error: ErrorOutcome) {
        if let Some(job) = self.job.as_mut() {
            job.status = JobStatus::Failed;
            self.last_error = Some(error);
            self.mark_dirty();
        }
    }

    /// Drops the active job without an error; returns its id.
    pub(crate) fn abandon_job(&mut self) -> Option<JobId> {
        let job = self.job.take_if(|job| job.status.is_active())?;
        self.mark_dirty();
        Some(job.id)
    }

    pub(crate) fn set_counter(&mut self, value: u64) {
        if self.counter != Some(value) {
            self.counter = Some(value);
            self.mark_dirty();
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
