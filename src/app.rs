use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::{debug, error, info, warn};

use crate::command::{Command, GenerationRequest, TickSignal};
use crate::config::Config;
use crate::event::AppEvent;
use crate::generator::GenerationError;
use crate::generator::models::{self, MODELS, ModelOption};
use crate::session::history::EditHistory;
use crate::ui::components::file_browser::{BrowseOutcome, FileBrowser};
use crate::ui::components::select_list::{ListItem, SelectList};
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::text_area::TextArea;
use crate::vocab::{MAX_SENTENCES, QuestionType, build_prompts, parse_sentence_count, parse_vocab};

pub const DEFAULT_STATUS: &str = "F12: Toggle Mouse | Ctrl+O: Load | Ctrl+S: Save | Ctrl+G: Generate | Tab: Switch Panes | Ctrl+Z/Ctrl+Y: Undo/Redo | Ctrl+C: Quit";

const GENERATION_TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Editing,
    FilePicking,
    SavePathEntry,
    ModelSelection,
    QuestionTypeSelection,
    SentenceCountEntry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Input,
    Output,
}

impl Pane {
    pub fn index(self) -> usize {
        match self {
            Pane::Input => 0,
            Pane::Output => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            Pane::Input => Pane::Output,
            Pane::Output => Pane::Input,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flash {
    Success,
    Error,
}

/// Knobs the controller takes from configuration at boot.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub history_limit: usize,
    pub success_status_delay: Duration,
    pub error_status_delay: Duration,
    pub default_sentence_count: String,
    pub file_extension: String,
    pub start_dir: PathBuf,
}

impl SessionSettings {
    pub fn from_config(config: &Config, start_dir: PathBuf) -> Self {
        Self {
            history_limit: config.history_limit,
            success_status_delay: config.success_status_delay(),
            error_status_delay: config.error_status_delay(),
            default_sentence_count: config.default_sentence_count.clone(),
            file_extension: config.file_extension.clone(),
            start_dir,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default(), PathBuf::from("."))
    }
}

/// The session controller. Owns every piece of mutable UI state; each event
/// is applied synchronously and may yield commands for the runner.
pub struct App {
    pub mode: Mode,
    pub buffers: [TextArea; 2],
    pub focused: Pane,
    history: [EditHistory; 2],
    pub loaded_file: Option<PathBuf>,
    credential: String,
    pub selected_model: Option<&'static ModelOption>,
    pub selected_question_type: Option<QuestionType>,
    /// Last confirmed sentence count, pre-filled on the next prompt.
    pub sentence_count: String,
    pub is_generating: bool,
    pub elapsed_seconds: u64,
    pub status: String,
    /// Whether the current status came from an error flash.
    pub status_is_error: bool,
    pub default_status: String,
    pub last_error: Option<String>,
    pub should_quit: bool,
    pub mouse_enabled: bool,
    pub picker: SelectList,
    pub file_browser: FileBrowser,
    /// File whose read is in flight; completions for any other path are
    /// stale.
    pub pending_load: Option<PathBuf>,
    pub path_input: LineInput,
    pub count_input: LineInput,
    settings: SessionSettings,
    status_seq: u64,
    next_request_id: u64,
    active_request: Option<u64>,
    rng: SmallRng,
}

impl App {
    pub fn new(credential: String, settings: SessionSettings) -> Self {
        Self::with_rng(credential, settings, SmallRng::from_entropy())
    }

    /// Same as [`App::new`] with a fixed shuffle seed.
    pub fn with_seed(credential: String, settings: SessionSettings, seed: u64) -> Self {
        Self::with_rng(credential, settings, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(credential: String, settings: SessionSettings, rng: SmallRng) -> Self {
        let history_limit = settings.history_limit;
        Self {
            mode: Mode::Editing,
            buffers: [
                TextArea::new("Load a vocabulary file or type 'word = meaning' here."),
                TextArea::new("Generated questions will appear here."),
            ],
            focused: Pane::Input,
            history: [EditHistory::new(history_limit), EditHistory::new(history_limit)],
            loaded_file: None,
            credential,
            selected_model: None,
            selected_question_type: None,
            sentence_count: settings.default_sentence_count.clone(),
            is_generating: false,
            elapsed_seconds: 0,
            status: DEFAULT_STATUS.to_string(),
            status_is_error: false,
            default_status: DEFAULT_STATUS.to_string(),
            last_error: None,
            should_quit: false,
            mouse_enabled: true,
            picker: SelectList::default(),
            file_browser: FileBrowser::new(settings.start_dir.clone(), &settings.file_extension),
            pending_load: None,
            path_input: LineInput::new(""),
            count_input: LineInput::short_field("", 2),
            settings,
            status_seq: 0,
            next_request_id: 0,
            active_request: None,
            rng,
        }
    }

    /// Commands to run once before the first event.
    pub fn startup(&mut self) -> Vec<Command> {
        if self.credential.is_empty() {
            warn!("no API key configured; generation disabled");
            return vec![self.flash(
                "No API key found in api.json. Generation is disabled.",
                Flash::Error,
            )];
        }
        Vec::new()
    }

    pub fn buffer(&self, pane: Pane) -> &TextArea {
        &self.buffers[pane.index()]
    }

    pub fn text(&self, pane: Pane) -> String {
        self.buffer(pane).value()
    }

    pub fn can_undo(&self, pane: Pane) -> bool {
        self.history[pane.index()].can_undo()
    }

    pub fn can_redo(&self, pane: Pane) -> bool {
        self.history[pane.index()].can_redo()
    }

    /// Unrecoverable failure: only the error screen and quit remain.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(%message, "fatal error");
        self.last_error = Some(message);
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Command> {
        if self.last_error.is_some() {
            if let AppEvent::Key(key) = event {
                if is_quit(&key) {
                    self.should_quit = true;
                }
            }
            return Vec::new();
        }

        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => {
                match self.mode {
                    Mode::Editing => self.edit_focused(|area| area.insert_str(&text)),
                    Mode::SavePathEntry => self.path_input.insert_str(&text),
                    Mode::SentenceCountEntry => self.count_input.insert_str(&text),
                    Mode::FilePicking | Mode::ModelSelection | Mode::QuestionTypeSelection => {}
                }
                Vec::new()
            }
            AppEvent::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Vec::new()
            }
            AppEvent::Resize(_, _) => Vec::new(),
            AppEvent::FileLoaded { path, result } => self.on_file_loaded(path, result),
            AppEvent::FileSaved { path, result } => self.on_file_saved(&path, result),
            AppEvent::Generated { request_id, result } => self.on_generated(request_id, result),
            AppEvent::GenerationTick { request_id } => self.on_generation_tick(request_id),
            AppEvent::ResetStatus { seq } => {
                if seq == self.status_seq {
                    self.status = self.default_status.clone();
                    self.status_is_error = false;
                }
                Vec::new()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if is_quit(&key) {
            info!("quit requested");
            self.should_quit = true;
            return Vec::new();
        }
        if key.code == KeyCode::F(12) {
            return self.toggle_mouse();
        }

        match self.mode {
            Mode::Editing => self.handle_editing_key(key),
            Mode::FilePicking => self.handle_file_picker_key(key),
            Mode::SavePathEntry => self.handle_save_path_key(key),
            Mode::ModelSelection | Mode::QuestionTypeSelection => self.handle_list_key(key),
            Mode::SentenceCountEntry => self.handle_count_key(key),
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('z') => {
                    self.undo();
                    return Vec::new();
                }
                KeyCode::Char('y') => {
                    self.redo();
                    return Vec::new();
                }
                KeyCode::Char('o') => return self.open_file_picker(),
                KeyCode::Char('s') => return self.open_save_prompt(),
                KeyCode::Char('g') => return self.request_generation(),
                _ => {}
            }
        }
        if key.code == KeyCode::Tab {
            self.focused = self.focused.other();
            return Vec::new();
        }

        self.edit_focused(|area| area.handle(key));
        Vec::new()
    }

    /// Apply an edit to the focused buffer, recording the pre-edit value only
    /// when the content actually changed.
    fn edit_focused(&mut self, edit: impl FnOnce(&mut TextArea)) {
        let idx = self.focused.index();
        let before = self.buffers[idx].value();
        edit(&mut self.buffers[idx]);
        if self.buffers[idx].value() != before {
            self.history[idx].record(before);
        }
    }

    fn replace_buffer(&mut self, pane: Pane, text: &str) {
        let idx = pane.index();
        let before = self.buffers[idx].value();
        if before != text {
            self.history[idx].record(before);
            self.buffers[idx].set_value(text);
        }
    }

    fn undo(&mut self) {
        let idx = self.focused.index();
        let current = self.buffers[idx].value();
        if let Some(previous) = self.history[idx].undo(current) {
            self.buffers[idx].set_value(&previous);
        }
    }

    fn redo(&mut self) {
        let idx = self.focused.index();
        let current = self.buffers[idx].value();
        if let Some(next) = self.history[idx].redo(current) {
            self.buffers[idx].set_value(&next);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.mouse_enabled || self.mode != Mode::Editing {
            return;
        }
        let area = &mut self.buffers[self.focused.index()];
        match mouse.kind {
            MouseEventKind::ScrollUp => area.cursor_up(),
            MouseEventKind::ScrollDown => area.cursor_down(),
            _ => {}
        }
    }

    fn toggle_mouse(&mut self) -> Vec<Command> {
        self.mouse_enabled = !self.mouse_enabled;
        let text = if self.mouse_enabled {
            "Mouse support enabled."
        } else {
            "Mouse support disabled (text selection enabled)."
        };
        vec![self.flash(text, Flash::Success)]
    }

    // --- File loading ---

    fn open_file_picker(&mut self) -> Vec<Command> {
        if let Some(dir) = self.loaded_file.as_deref().and_then(Path::parent) {
            if !dir.as_os_str().is_empty() {
                self.file_browser.dir = dir.to_path_buf();
            }
        }
        self.file_browser.refresh();
        self.set_mode(Mode::FilePicking);
        self.set_status("Select a vocabulary file.");
        Vec::new()
    }

    fn handle_file_picker_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => {
                if let Some(path) = self.pending_load.take() {
                    info!(path = %path.display(), "abandoning file load");
                }
                self.set_mode(Mode::Editing);
                vec![self.flash("File selection cancelled.", Flash::Success)]
            }
            _ if self.pending_load.is_some() => Vec::new(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') | KeyCode::Char('ㅈ') => {
                self.file_browser.prev();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') | KeyCode::Char('ㄴ') => {
                self.file_browser.next();
                Vec::new()
            }
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                self.file_browser.parent();
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                match self.file_browser.activate() {
                    BrowseOutcome::Selected(path) => {
                        self.set_status(format!("Loading '{}'...", display_name(&path)));
                        self.pending_load = Some(path.clone());
                        vec![Command::ReadFile(path)]
                    }
                    BrowseOutcome::Stayed => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn on_file_loaded(&mut self, path: PathBuf, result: Result<String, String>) -> Vec<Command> {
        if self.pending_load.as_deref() != Some(path.as_path()) {
            warn!(path = %path.display(), "discarding result of an abandoned file load");
            return Vec::new();
        }
        self.pending_load = None;
        if self.mode == Mode::FilePicking {
            self.set_mode(Mode::Editing);
        }
        match result {
            Ok(content) => {
                info!(path = %path.display(), bytes = content.len(), "vocabulary loaded");
                self.replace_buffer(Pane::Input, &content);
                let message = format!("Loaded '{}'", display_name(&path));
                self.loaded_file = Some(path);
                vec![self.flash(message, Flash::Success)]
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read file");
                let message = format!("Error loading '{}': {err}", display_name(&path));
                vec![self.flash(message, Flash::Error)]
            }
        }
    }

    // --- Saving ---

    fn open_save_prompt(&mut self) -> Vec<Command> {
        self.path_input = LineInput::new(&self.default_save_name());
        self.set_mode(Mode::SavePathEntry);
        self.set_status("Enter file path to save.");
        Vec::new()
    }

    /// `<loaded file name without extension, or "result">_problem.txt`.
    pub fn default_save_name(&self) -> String {
        let base = self
            .loaded_file
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| {
                let name = name.to_string_lossy();
                let suffix = format!(".{}", self.settings.file_extension);
                name.strip_suffix(&suffix).unwrap_or(&name).to_string()
            })
            .unwrap_or_else(|| "result".to_string());
        format!("{base}_problem.txt")
    }

    fn handle_save_path_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match self.path_input.handle(key) {
            InputResult::Continue => Vec::new(),
            InputResult::Cancel => {
                self.set_mode(Mode::Editing);
                vec![self.flash("Cancelled save.", Flash::Success)]
            }
            InputResult::Submit => {
                let path = self.path_input.value().trim().to_string();
                if path.is_empty() {
                    return Vec::new();
                }
                self.set_mode(Mode::Editing);
                self.set_status("Saving...");
                vec![Command::WriteFile {
                    path: PathBuf::from(path),
                    content: self.text(Pane::Output),
                }]
            }
        }
    }

    fn on_file_saved(&mut self, path: &Path, result: Result<(), String>) -> Vec<Command> {
        if self.mode == Mode::SavePathEntry {
            self.set_mode(Mode::Editing);
        }
        match result {
            Ok(()) => {
                info!(path = %path.display(), "output saved");
                vec![self.flash(format!("Saved to '{}'", display_name(path)), Flash::Success)]
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to write file");
                let message = format!("Error saving '{}': {err}", display_name(path));
                vec![self.flash(message, Flash::Error)]
            }
        }
    }

    // --- Generation ---

    fn request_generation(&mut self) -> Vec<Command> {
        if self.is_generating {
            return vec![self.flash("A generation is already running.", Flash::Error)];
        }
        let input = self.text(Pane::Input);
        if input.trim().is_empty() {
            return vec![self.flash("Cannot generate: Input vocabulary is empty.", Flash::Error)];
        }
        if parse_vocab(&input).is_empty() {
            return vec![self.flash(
                "Cannot generate: no 'word = meaning' lines found.",
                Flash::Error,
            )];
        }
        if self.credential.is_empty() {
            return vec![self.flash(
                "Cannot generate: API Key is not configured in api.json.",
                Flash::Error,
            )];
        }

        self.selected_model = None;
        self.selected_question_type = None;
        self.picker = SelectList::new("Select a Model", MODELS.iter().map(ListItem::from).collect());
        self.set_mode(Mode::ModelSelection);
        self.set_status("Choose a model.");
        Vec::new()
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => self.cancel_generation_setup(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') | KeyCode::Char('ㅈ') => {
                self.picker.prev();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') | KeyCode::Char('ㄴ') => {
                self.picker.next();
                Vec::new()
            }
            KeyCode::Enter => {
                let Some(id) = self.picker.selected_item().map(|item| item.id.clone()) else {
                    return Vec::new();
                };
                if self.mode == Mode::ModelSelection {
                    self.choose_model(&id)
                } else {
                    self.choose_question_type(&id)
                }
            }
            _ => Vec::new(),
        }
    }

    fn choose_model(&mut self, id: &str) -> Vec<Command> {
        let Some(model) = models::find(id) else {
            return vec![self.flash(format!("Unknown model '{id}'."), Flash::Error)];
        };
        self.selected_model = Some(model);
        self.picker = SelectList::new(
            "Select Question Type",
            QuestionType::ALL.into_iter().map(ListItem::from).collect(),
        );
        self.set_mode(Mode::QuestionTypeSelection);
        if model.high_cost {
            vec![self.flash("Warning: High cost model selected!", Flash::Error)]
        } else {
            self.set_status("Choose a question type.");
            Vec::new()
        }
    }

    fn choose_question_type(&mut self, id: &str) -> Vec<Command> {
        let Some(question_type) = QuestionType::from_id(id) else {
            return vec![self.flash(format!("Unknown question type '{id}'."), Flash::Error)];
        };
        self.selected_question_type = Some(question_type);

        if question_type.needs_sentence_count() {
            self.count_input = LineInput::short_field(&self.sentence_count, 2);
            self.set_mode(Mode::SentenceCountEntry);
            self.set_status("Enter number of sentences.");
            Vec::new()
        } else {
            self.start_generation(1)
        }
    }

    fn handle_count_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match self.count_input.handle(key) {
            InputResult::Continue => Vec::new(),
            InputResult::Cancel => self.cancel_generation_setup(),
            InputResult::Submit => {
                match parse_sentence_count(self.count_input.value()) {
                    Some(n) => {
                        self.sentence_count = n.to_string();
                        self.start_generation(n)
                    }
                    None => vec![self.flash(
                        format!("Enter a whole number between 1 and {MAX_SENTENCES}."),
                        Flash::Error,
                    )],
                }
            }
        }
    }

    fn cancel_generation_setup(&mut self) -> Vec<Command> {
        self.is_generating = false;
        self.set_mode(Mode::Editing);
        vec![self.flash("Cancelled generation.", Flash::Success)]
    }

    /// Shuffle the parsed vocabulary, build prompts, and issue the Generate
    /// command together with the first progress tick.
    fn start_generation(&mut self, sentences: u32) -> Vec<Command> {
        let (Some(model), Some(question_type)) = (self.selected_model, self.selected_question_type)
        else {
            self.set_mode(Mode::Editing);
            return vec![self.flash("Cannot generate: selection incomplete.", Flash::Error)];
        };

        let mut entries = parse_vocab(&self.text(Pane::Input));
        entries.shuffle(&mut self.rng);
        let prompts = build_prompts(&entries, question_type, sentences);
        debug!(instructions = %prompts.instructions, payload = %prompts.payload, "built prompts");

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.active_request = Some(request_id);
        self.is_generating = true;
        self.elapsed_seconds = 0;
        self.set_mode(Mode::Editing);
        self.set_status("Generating...");
        info!(
            request_id,
            model = model.id,
            question_type = question_type.id(),
            entries = entries.len(),
            "generation started"
        );

        vec![
            Command::Generate(GenerationRequest {
                request_id,
                credential: self.credential.clone(),
                model: model.id.to_string(),
                instructions: prompts.instructions,
                payload: prompts.payload,
            }),
            Command::Tick {
                delay: GENERATION_TICK,
                signal: TickSignal::Generation { request_id },
            },
        ]
    }

    fn on_generation_tick(&mut self, request_id: u64) -> Vec<Command> {
        if !self.is_generating || self.active_request != Some(request_id) {
            return Vec::new();
        }
        self.elapsed_seconds += 1;
        self.set_status(format!("Generating... ({}s)", self.elapsed_seconds));
        vec![Command::Tick {
            delay: GENERATION_TICK,
            signal: TickSignal::Generation { request_id },
        }]
    }

    fn on_generated(
        &mut self,
        request_id: u64,
        result: Result<String, GenerationError>,
    ) -> Vec<Command> {
        if self.active_request != Some(request_id) {
            warn!(request_id, "discarding result of a superseded generation");
            return Vec::new();
        }
        self.active_request = None;
        self.is_generating = false;
        self.set_mode(Mode::Editing);

        match result {
            Ok(text) => {
                info!(request_id, seconds = self.elapsed_seconds, chars = text.len(), "generation complete");
                self.replace_buffer(Pane::Output, &text);
                vec![self.flash("Generation complete!", Flash::Success)]
            }
            Err(err) => {
                error!(request_id, error = %err, "generation failed");
                vec![self.flash(format!("Generation Error: {err}"), Flash::Error)]
            }
        }
    }

    // --- Status ---

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!(from = ?self.mode, to = ?mode, "mode change");
            self.mode = mode;
        }
    }

    /// Show a status that stays until something replaces it. Any reset
    /// scheduled for an earlier status becomes stale.
    fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        self.status_is_error = false;
        self.status_seq += 1;
    }

    /// Show a transient status and schedule its reset.
    fn flash(&mut self, text: impl Into<String>, kind: Flash) -> Command {
        self.set_status(text);
        self.status_is_error = kind == Flash::Error;
        let delay = match kind {
            Flash::Success => self.settings.success_status_delay,
            Flash::Error => self.settings.error_status_delay,
        };
        Command::Tick {
            delay,
            signal: TickSignal::ResetStatus {
                seq: self.status_seq,
            },
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
