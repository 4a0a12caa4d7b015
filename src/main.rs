use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    time::{Duration, Instant},
};

use voicecoach::{
    app_dirs::AppDirs,
    catalog::{self, Catalog, Difficulty, ExerciseType, ALL},
    config::{Config, ConfigStore, FileConfigStore},
    dashboard::Dashboard,
    devices::SystemDevices,
    identity::{Identity, LocalStorage, AUTH_TOKEN_KEY, USER_ID_KEY},
    logging,
    progress::{HttpProgressApi, ProgressClient, ProgressService},
    runtime::{ChannelEventSource, FixedTicker, Runner},
    ui,
};

const TICK_RATE_MS: u64 = 100;

/// guided speech-therapy exercises in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal speech coach: browse speech-therapy exercises, practice them step by step with a timer, narration and optional recording, and track your progress."
)]
pub struct Cli {
    /// base url of the progress backend
    #[clap(long = "api-url")]
    api_url: Option<String>,

    /// initial difficulty filter (All, Beginner, Intermediate, Advanced)
    #[clap(short = 'd', long, value_parser = parse_difficulty)]
    difficulty: Option<String>,

    /// initial exercise type filter (All, Pronunciation, Fluency, ...)
    #[clap(short = 't', long = "type", value_parser = parse_exercise_type)]
    exercise_type: Option<String>,

    /// seconds between progress refreshes
    #[clap(long = "refresh-secs")]
    refresh_secs: Option<u64>,

    /// practice without recording from the microphone
    #[clap(long)]
    no_audio: bool,

    /// program used to speak instructions, e.g. espeak-ng or say
    #[clap(long)]
    speech_command: Option<String>,

    /// store this user id for progress calls
    #[clap(long)]
    user_id: Option<String>,

    /// store this bearer token for progress calls
    #[clap(long)]
    auth_token: Option<String>,

    /// print the filtered exercise catalog and exit
    #[clap(long)]
    list: bool,
}

fn parse_difficulty(s: &str) -> Result<String, String> {
    if s.eq_ignore_ascii_case(ALL) {
        return Ok(ALL.to_string());
    }
    s.parse::<Difficulty>()
        .map(|d| d.to_string())
        .map_err(|e| e.to_string())
}

fn parse_exercise_type(s: &str) -> Result<String, String> {
    if s.eq_ignore_ascii_case(ALL) {
        return Ok(ALL.to_string());
    }
    s.parse::<ExerciseType>()
        .map(|t| t.to_string())
        .map_err(|e| e.to_string())
}

impl Cli {
    /// Flags override whatever the config file holds
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(difficulty) = &self.difficulty {
            config.default_difficulty = difficulty.clone();
        }
        if let Some(exercise_type) = &self.exercise_type {
            config.default_type = exercise_type.clone();
        }
        if let Some(secs) = self.refresh_secs {
            config.refresh_interval_secs = secs;
        }
        if self.no_audio {
            config.record_audio = false;
        }
        if let Some(command) = &self.speech_command {
            config.speech_command = Some(command.clone());
        }
        config
    }

    fn store_identity(&self, storage: &LocalStorage) -> io::Result<()> {
        if let Some(user_id) = &self.user_id {
            storage.set(USER_ID_KEY, user_id)?;
        }
        if let Some(token) = &self.auth_token {
            storage.set(AUTH_TOKEN_KEY, token)?;
        }
        Ok(())
    }
}

fn print_catalog(config: &Config, out: &mut impl Write) -> io::Result<()> {
    let catalog = Catalog::builtin();
    let exercises = catalog::filter_exercises(
        catalog.exercises(),
        &config.default_difficulty,
        &config.default_type,
    );
    for e in exercises {
        writeln!(
            out,
            "{:>3}  {:<32} {:<14} {:<13} {} min",
            e.id, e.title, e.exercise_type, e.difficulty, e.duration
        )?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.apply_to(FileConfigStore::new().load());

    if cli.list {
        print_catalog(&config, &mut io::stdout().lock())?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = logging::init(&AppDirs::log_path()) {
        eprintln!("logging disabled: {e}");
    }

    let storage = LocalStorage::new();
    cli.store_identity(&storage)?;
    let identity = Identity::load(&storage);
    tracing::info!(user_id = %identity.user_id, api = %config.api_base_url, "starting");

    let source = ChannelEventSource::new();
    let api = HttpProgressApi::new(&config.api_base_url, &identity, config.request_timeout())?;
    let service = ProgressService::new(api, identity.user_id.clone());
    let progress = ProgressClient::spawn(service, source.sender())?;
    let devices = SystemDevices::from_config(&config, AppDirs::recordings_dir());

    let mut dashboard = Dashboard::new(
        config,
        Catalog::builtin(),
        progress,
        source.sender(),
        Box::new(devices),
    );
    dashboard.refresh(Instant::now());

    source.spawn_terminal_reader()?;
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &runner, &mut dashboard);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("exiting on error: {e}");
    }
    // devices and worker handles are released before the process exits
    drop(dashboard);
    tracing::info!("bye");
    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    runner: &Runner<ChannelEventSource, FixedTicker>,
    dashboard: &mut Dashboard,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(f, dashboard))?;
    while !dashboard.should_quit() {
        let event = runner.step();
        dashboard.handle_event(event);
        terminal.draw(|f| ui::draw(f, dashboard))?;
    }
    Ok(())
}
