mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc::Sender,
    time::Duration,
};
use typeline::{
    auth::{AuthProvider, LocalAuth, UserId},
    clock::{ClockSignal, TimerMode},
    config::{Config, ConfigStore, FileConfigStore},
    game::TypingGame,
    history::GameHistory,
    logging,
    publisher::{PublishOutcome, ResultSummary},
    runtime::{
        CrosstermEventSource, FixedTicker, Runner, ScheduledTick, TypingEvent, TypingEventSource,
    },
    sentences::{fetch_or_empty, Corpus, Difficulty, FetchRequest, SentenceItem, SentencePool},
    session::{SessionConfig, StartTrigger},
    storage::GameDb,
};

const TICK_RATE_MS: u64 = 100;

/// line-by-line typing trainer with speed charts and saved game history
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A typing trainer that scrolls difficulty-graded sentences line by line, charts your speed over the session, and keeps a per-user history of finished games."
)]
pub struct Cli {
    /// sentence difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// session length: 15s, 30s, 1m or unlimited
    #[clap(short = 't', long)]
    timer: Option<TimerMode>,

    /// sign in as this user so finished games are saved
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// start the clock on the first keystroke instead of enter
    #[clap(long)]
    start_on_keystroke: bool,

    /// number of sentences to fetch per session
    #[clap(short = 'n', long)]
    lines: Option<usize>,

    /// path of the game database
    #[clap(long)]
    db: Option<PathBuf>,

    /// add a sentence at the chosen difficulty and exit
    #[clap(long, value_name = "TEXT")]
    add_sentence: Option<String>,

    /// print the last result as JSON on exit
    #[clap(long)]
    json: bool,
}

impl Cli {
    /// Layer command line flags over the saved preferences
    fn apply(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(timer) = self.timer {
            config.timer = timer;
        }
        if self.start_on_keystroke {
            config.start_trigger = StartTrigger::FirstKeystroke;
        }
        if let Some(lines) = self.lines {
            config.sentence_count = lines;
        }
        if let Some(user) = &self.user {
            config.user = Some(user.clone());
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    SignIn,
    History,
}

#[derive(Debug)]
pub struct App {
    pub game: TypingGame,
    pub state: AppState,
    pub config: Config,
    pub auth: LocalAuth,
    pub db: GameDb,
    pub pool: SentencePool,
    pub history: GameHistory,
    pub sign_in_input: String,
    /// One-line status shown under the stats
    pub notice: Option<String>,
    /// Most recent result, kept across restarts for `--json`
    pub last_result: Option<ResultSummary>,
    config_store: Option<FileConfigStore>,
    clock_tx: Option<Sender<TypingEvent>>,
    ticks: Option<ScheduledTick>,
}

impl App {
    pub fn new(config: Config, db: GameDb) -> Self {
        let mut pool = SentencePool::from_store(&db).unwrap_or_else(|e| {
            log::warn!("could not load sentences: {e}");
            SentencePool::default()
        });
        let auth = LocalAuth::new(config.user.as_deref().and_then(UserId::parse));
        let session = config.session();
        let sentences = fetch_sentences(&mut pool, &auth, &session);

        Self {
            game: TypingGame::new(session, sentences),
            state: AppState::Typing,
            config,
            auth,
            db,
            pool,
            history: GameHistory::default(),
            sign_in_input: String::new(),
            notice: None,
            last_result: None,
            config_store: None,
            clock_tx: None,
            ticks: None,
        }
    }

    /// Drive the session clock through `tx`
    pub fn with_clock(mut self, tx: Sender<TypingEvent>) -> Self {
        self.clock_tx = Some(tx);
        self
    }

    /// Persist preference changes through `store`
    pub fn with_config_store(mut self, store: FileConfigStore) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn auth_user(&self) -> Option<UserId> {
        self.auth.current_user()
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.game.cancel();
            return true;
        }

        let quit = match self.state {
            AppState::Typing => self.on_typing_key(key),
            AppState::Results => self.on_results_key(key),
            AppState::SignIn => {
                self.on_sign_in_key(key);
                false
            }
            AppState::History => self.on_history_key(key),
        };
        self.sync_clock();
        quit
    }

    /// One second of wall time elapsed
    pub fn on_second(&mut self) {
        if self.game.on_second() == ClockSignal::Expired {
            self.complete();
        }
        self.sync_clock();
    }

    fn on_typing_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.game.cancel();
                return true;
            }
            KeyCode::Enter => {
                if self.game.has_started() {
                    if self.game.finish().is_some() {
                        self.complete();
                    }
                } else if self.game.config().start_trigger == StartTrigger::Explicit {
                    self.game.start();
                }
            }
            KeyCode::Tab if !self.game.has_started() => {
                let session = SessionConfig {
                    difficulty: self.game.config().difficulty.next(),
                    ..self.game.config().clone()
                };
                self.reconfigure(session);
            }
            KeyCode::BackTab if !self.game.has_started() => {
                let session = SessionConfig {
                    timer: self.game.config().timer.next_preset(),
                    ..self.game.config().clone()
                };
                self.reconfigure(session);
            }
            KeyCode::Backspace => {
                self.game.backspace();
            }
            KeyCode::Char(c) => {
                self.game.write(c);
            }
            _ => {}
        }
        false
    }

    fn on_results_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('n') => self.reconfigure(self.game.config().clone()),
            KeyCode::Char('p') => self.publish(),
            KeyCode::Char('s') => {
                self.sign_in_input.clear();
                self.state = AppState::SignIn;
            }
            KeyCode::Char('h') => self.show_history(),
            _ => {}
        }
        false
    }

    fn on_sign_in_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state = AppState::Results,
            KeyCode::Backspace => {
                self.sign_in_input.pop();
            }
            KeyCode::Enter => match UserId::parse(&self.sign_in_input) {
                Some(user) => {
                    self.config.user = Some(user.to_string());
                    self.auth.sign_in(user);
                    self.save_config();
                    self.state = AppState::Results;
                    self.publish();
                }
                None => self.notice = Some("enter a user name".to_string()),
            },
            KeyCode::Char(c) if !c.is_control() => self.sign_in_input.push(c),
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('h') => {
                self.state = AppState::Results
            }
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('n') => self.reconfigure(self.game.config().clone()),
            _ => {}
        }
        false
    }

    /// The session produced its result: keep it, try to save it, show it
    fn complete(&mut self) {
        self.last_result = self.game.result().cloned();
        self.publish();
        self.state = AppState::Results;
    }

    fn publish(&mut self) {
        let Some(outcome) = self.game.publish(&self.auth, &mut self.db) else {
            return;
        };
        self.notice = Some(match outcome {
            PublishOutcome::Saved => match self.auth.current_user() {
                Some(user) => format!("saved for {user}"),
                None => "saved".to_string(),
            },
            PublishOutcome::AlreadySaved => "already saved".to_string(),
            PublishOutcome::SignInRequired => "sign in with (s) to save this result".to_string(),
            PublishOutcome::Failed(reason) => format!("could not save: {reason}, (p) to retry"),
        });
    }

    fn show_history(&mut self) {
        self.history = match self.auth.current_user() {
            Some(user) => GameHistory::load(&self.db, &user).unwrap_or_else(|e| {
                log::warn!("could not load history for {user}: {e}");
                GameHistory::default()
            }),
            None => GameHistory::default(),
        };
        self.state = AppState::History;
    }

    /// Same sentences, fresh session
    fn restart(&mut self) {
        self.game.reset();
        self.notice = None;
        self.state = AppState::Typing;
    }

    /// New settings or new sentences: fetch again and start over
    fn reconfigure(&mut self, session: SessionConfig) {
        let sentences = fetch_sentences(&mut self.pool, &self.auth, &session);
        self.config.difficulty = session.difficulty;
        self.config.timer = session.timer;
        self.game.reconfigure(session, sentences);
        self.save_config();
        self.notice = None;
        self.state = AppState::Typing;
    }

    fn save_config(&self) {
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&self.config) {
                log::warn!("could not save preferences: {e}");
            }
        }
    }

    /// Run the one-second ticker exactly while a session is active
    fn sync_clock(&mut self) {
        if !self.game.state().is_active() {
            // dropping cancels
            self.ticks = None;
            return;
        }
        if self.ticks.is_none() {
            if let Some(tx) = &self.clock_tx {
                self.ticks = Some(ScheduledTick::start(tx.clone(), Duration::from_secs(1)));
            }
        }
    }
}

fn fetch_sentences(
    pool: &mut SentencePool,
    auth: &LocalAuth,
    session: &SessionConfig,
) -> Vec<SentenceItem> {
    let request = FetchRequest::new(session.difficulty)
        .with_count(session.sentence_count)
        .for_consumer(auth.current_user());
    fetch_or_empty(pool, &request)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init();

    let mut db = match &cli.db {
        Some(path) => GameDb::open(path)?,
        None => GameDb::open_default()?,
    };
    let seeded = db.seed_if_empty(&Corpus::bundled()?)?;
    if seeded > 0 {
        log::info!("seeded {seeded} sentences");
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());

    if let Some(text) = &cli.add_sentence {
        let item = db.insert_sentence(text, config.difficulty)?;
        println!("added {} sentence {}", item.difficulty, item.id);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = App::new(config, db)
        .with_clock(runner.sender())
        .with_config_store(config_store);
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    if cli.json {
        if let Some(result) = &app.last_result {
            println!("{}", result.to_json()?);
        }
    }

    Ok(())
}

fn start_tui<B: Backend, E: TypingEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        let quit = match runner.step() {
            TypingEvent::Key(key) => app.handle_key(key),
            TypingEvent::Second => {
                app.on_second();
                false
            }
            TypingEvent::Resize | TypingEvent::Tick => false,
        };
        if quit {
            break;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}
