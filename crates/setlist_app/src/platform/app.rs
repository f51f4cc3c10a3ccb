use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use setlist_core::{update, AppState, JobStatus, Msg};
use setlist_engine::StateDir;
use setlist_logging::{setlist_info, setlist_warn, LevelFilter, LogDestination};

use super::cli::Cli;
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::persistence;
use super::render::Renderer;

const POLL_INTERVAL: Duration = Duration::from_millis(75);
/// How long to wait for a requested counter after everything else settled.
const COUNTER_GRACE: Duration = Duration::from_secs(2);
/// Slack on top of the engine's own job timeout before the app gives up.
const JOB_DEADLINE_SLACK: Duration = Duration::from_secs(5);

/// Exit status when a URL was given but no job could be started for it.
const EXIT_NOT_SUBMITTED: u8 = 2;

pub fn run_app() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    initialize_logging(&config);
    setlist_info!("Starting against {}", config.server_base_url);

    let state_dir = StateDir::new(&config.state_dir);
    let runner = EffectRunner::new(config.engine_settings(), state_dir)?;
    let job_deadline = Duration::from_secs(config.job_timeout_secs) + JOB_DEADLINE_SLACK;
    let mut app = App::new(runner, job_deadline);

    app.dispatch(Msg::AvailableOptions(config.options.clone()));
    let restored = persistence::load_options(app.runner.state_dir());
    app.dispatch(Msg::OptionsRestored(restored));
    app.dispatch(Msg::Started);

    if let Some(selected) = &cli.options {
        for id in selected {
            if !config.options.iter().any(|known| known == id.trim()) {
                setlist_warn!("Ignoring unknown option {:?}", id);
            }
        }
        for id in &config.options {
            let enabled = selected.iter().any(|wanted| wanted.trim() == id);
            app.dispatch(Msg::OptionToggled {
                id: id.clone(),
                enabled,
            });
        }
    }

    let requested = cli.link.is_some() || cli.url.is_some();
    if let Some(link) = cli.link {
        app.dispatch(Msg::DeepLinkOpened(link));
    } else if let Some(url) = cli.url {
        app.dispatch(Msg::InputChanged(url));
        app.dispatch(Msg::SubmitClicked);
    }

    app.run_until_settled();
    Ok(app.exit_code(requested))
}

fn initialize_logging(config: &AppConfig) {
    let (destination, level) = if config.verbose {
        (LogDestination::Both(config.log_file.clone()), LevelFilter::Debug)
    } else {
        (LogDestination::File(config.log_file.clone()), LevelFilter::Info)
    };
    setlist_logging::initialize(destination, level);
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    job_deadline: Duration,
}

impl App {
    fn new(runner: EffectRunner, job_deadline: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::default(),
            job_deadline,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            for line in self.renderer.render(&state.view()) {
                println!("{line}");
            }
        }
        self.state = state;
        self.runner.execute(effects);
    }

    /// Pumps engine events until no job is active and no counter is outstanding.
    fn run_until_settled(&mut self) {
        let mut job_started: Option<Instant> = None;
        let mut grace_until: Option<Instant> = None;

        loop {
            if self.state.is_job_active() {
                let started = *job_started.get_or_insert_with(Instant::now);
                if started.elapsed() > self.job_deadline {
                    setlist_warn!("Engine did not finish the job in time, abandoning it");
                    self.dispatch(Msg::CancelClicked);
                    continue;
                }
            } else {
                if !self.runner.counter_pending() {
                    break;
                }
                let deadline = *grace_until.get_or_insert_with(|| Instant::now() + COUNTER_GRACE);
                if Instant::now() >= deadline {
                    break;
                }
            }

            match self.runner.next_msg(POLL_INTERVAL) {
                Some(msg) => self.dispatch(msg),
                None => self.dispatch(Msg::Tick),
            }
        }
    }

    fn exit_code(&self, requested: bool) -> ExitCode {
        match self.state.status() {
            JobStatus::Completed => ExitCode::SUCCESS,
            JobStatus::Failed => ExitCode::FAILURE,
            _ if requested => ExitCode::from(EXIT_NOT_SUBMITTED),
            _ => ExitCode::SUCCESS,
        }
    }
}
