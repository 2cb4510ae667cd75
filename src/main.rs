mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use layertype::{
    api::{HttpKeymapClient, KeymapApi},
    auth::{authorize, Identity},
    config::{Config, ConfigStore, FileConfigStore},
    editor::KeymapEditorSession,
    finger::FingerGuide,
    layout::{KeyCursor, KeyboardLayout},
    logging,
    runtime::{
        AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, SaveDispatcher, Ticker,
    },
    store::{KeymapStore, LocalKeymapApi},
    typing::{TypingEvent, TypingSession},
    words::WordList,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

const TICK_RATE_MS: u64 = 100;

/// typing practice with finger guidance and a layered keymap editor
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Practice typing word by word with per-finger key highlighting, and edit a six-layer custom keymap stored locally or on a keymap server."
)]
pub struct Cli {
    /// bundled word list to practice
    #[clap(short = 'l', long)]
    word_list: Option<String>,

    /// custom word list file ({"name": ..., "words": [...]})
    #[clap(short = 'f', long)]
    words_file: Option<PathBuf>,

    /// keep accepting characters after a mistake instead of locking input
    #[clap(long)]
    no_lock: bool,

    /// keymap server base URL; the local database is used when omitted
    #[clap(long)]
    server: Option<String>,

    /// session cookie sent to the keymap server
    #[clap(long)]
    session_cookie: Option<String>,

    /// email of the acting user
    #[clap(long)]
    email: Option<String>,

    /// display name of the acting user
    #[clap(long)]
    name: Option<String>,

    /// path of the local keymap database
    #[clap(long)]
    db: Option<PathBuf>,

    /// start in the keymap editor
    #[clap(short = 'e', long)]
    editor: bool,

    /// persist the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layers command line overrides on top of the stored config.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(list) = &self.word_list {
            config.word_list = list.clone();
            config.words_file = None;
        }
        if let Some(path) = &self.words_file {
            config.words_file = Some(path.clone());
        }
        if self.no_lock {
            config.lock_on_error = false;
        }
        if let Some(url) = &self.server {
            config.server_url = Some(url.clone());
        }
        if let Some(cookie) = &self.session_cookie {
            config.session_cookie = Some(cookie.clone());
        }
        if let Some(email) = &self.email {
            config.email = email.clone();
        }
        if let Some(name) = &self.name {
            config.name = Some(name.clone());
        }
        if let Some(db) = &self.db {
            config.db_path = Some(db.clone());
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Practice,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub state: AppState,
    pub typing: TypingSession,
    pub editor: KeymapEditorSession,
    pub layout: KeyboardLayout,
    pub cursor: KeyCursor,
    /// Shown after a full pass over the word list until the next key.
    pub banner: Option<String>,
    /// Set by a first Esc while edits are unsaved.
    pub confirm_quit: bool,
    saver: SaveDispatcher,
}

impl App {
    pub fn new(typing: TypingSession, editor: KeymapEditorSession, saver: SaveDispatcher) -> Self {
        Self {
            state: AppState::Practice,
            typing,
            editor,
            layout: KeyboardLayout::standard(),
            cursor: KeyCursor::default(),
            banner: None,
            confirm_quit: false,
            saver,
        }
    }

    pub fn handle_event(&mut self, ev: AppEvent, now: Instant) -> Flow {
        match ev {
            AppEvent::Tick => {
                self.on_tick(now);
                Flow::Continue
            }
            AppEvent::Resize => Flow::Continue,
            AppEvent::Key(key) => self.on_key(key, now),
            AppEvent::SaveFinished { revision, result } => {
                self.editor.finish_save(revision, result, now);
                Flow::Continue
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if let Some(TypingEvent::PracticeComplete { rounds }) = self.typing.tick(now) {
            self.banner = Some(format!(
                "Practice complete! Round {rounds} done, starting over."
            ));
        }
        self.editor.tick(now);
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Practice => self.on_practice_key(key, now),
            AppState::Editor => self.on_editor_key(key),
        }
    }

    fn on_practice_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        self.banner = None;
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Tab => {
                self.state = AppState::Editor;
                self.confirm_quit = false;
            }
            KeyCode::Backspace => {
                self.typing.backspace(now);
            }
            KeyCode::Char(c) => {
                let outcome = self.typing.type_char(c, now);
                debug!(?outcome, %c, "typed");
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_editor_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            self.save();
            return Flow::Continue;
        }
        let quit_armed = std::mem::take(&mut self.confirm_quit);

        if self.editor.selected_position().is_some() {
            match key.code {
                KeyCode::Char(c) => self.editor.push_draft(c),
                KeyCode::Backspace => self.editor.pop_draft(),
                KeyCode::Enter => {
                    if let Err(e) = self.editor.commit_typed_character() {
                        debug!(error = %e, "draft rejected");
                    }
                }
                KeyCode::Esc => self.editor.cancel_edit(),
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                    self.move_cursor(key.code);
                    self.select_under_cursor();
                }
                _ => {}
            }
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.move_cursor(key.code)
            }
            KeyCode::Enter => self.select_under_cursor(),
            KeyCode::Char(c @ '0'..='5') => {
                let index = i64::from(c as u8 - b'0');
                if let Err(e) = self.editor.switch_layer_index(index) {
                    warn!(error = %e, "layer switch rejected");
                }
            }
            KeyCode::Char('s') => self.save(),
            KeyCode::Tab => self.state = AppState::Practice,
            KeyCode::Esc => {
                if self.editor.is_dirty() && !quit_armed {
                    self.confirm_quit = true;
                } else {
                    return Flow::Quit;
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn move_cursor(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.cursor.up(&self.layout),
            KeyCode::Down => self.cursor.down(&self.layout),
            KeyCode::Left => self.cursor.left(&self.layout),
            KeyCode::Right => self.cursor.right(&self.layout),
            _ => {}
        }
    }

    fn select_under_cursor(&mut self) {
        if let Some(key) = self.cursor.key(&self.layout) {
            let position = key.position.clone();
            self.editor.select_key(position);
        }
    }

    fn save(&mut self) {
        let ticket = self.editor.begin_save();
        self.saver.dispatch(ticket);
    }
}

fn load_words(config: &Config) -> layertype::Result<WordList> {
    match &config.words_file {
        Some(path) => WordList::from_file(path),
        None => WordList::bundled(&config.word_list),
    }
}

/// Picks the keymap backend: the remote server when configured, otherwise the
/// local database scoped to `identity`.
fn connect(config: &Config, identity: &Identity) -> layertype::Result<Arc<dyn KeymapApi>> {
    match &config.server_url {
        Some(url) => {
            info!(%url, "using keymap server");
            let mut client = HttpKeymapClient::new(url.clone());
            if let Some(cookie) = &config.session_cookie {
                client = client.with_session_cookie(cookie.clone());
            }
            Ok(Arc::new(client))
        }
        None => {
            let path = config.resolved_db_path();
            info!(path = %path.display(), "using local keymap store");
            let store = Arc::new(KeymapStore::open(&path)?);
            let user_id = store.find_or_create_user(identity)?;
            Ok(Arc::new(LocalKeymapApi::new(store, user_id)))
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_dir = logging::init();
    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
    }
    info!(?log_dir, config = %config_store.path().display(), "starting layertype");

    let identity = config.identity();
    authorize(&identity, &config.allow_list())?;

    let words = load_words(&config)?;
    let typing = TypingSession::new(words.words, FingerGuide::qwerty(), config.input_policy())?;
    let api = connect(&config, &identity)?;
    let editor = KeymapEditorSession::new(api.load()?);

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = App::new(typing, editor, SaveDispatcher::new(api, runner.sender()));
    if cli.editor {
        app.state = AppState::Editor;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.handle_event(runner.step(), Instant::now()) == Flow::Quit {
            break;
        }
    }

    if app.editor.saves_in_flight() > 0 {
        warn!(
            pending = app.editor.saves_in_flight(),
            "quitting with saves in flight"
        );
    }
    info!("bye");
    Ok(())
}
