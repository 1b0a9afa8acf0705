use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vocabq::app::{App, Mode, Pane, SessionSettings};
use vocabq::command::CommandRunner;
use vocabq::config::{Config, load_credential};
use vocabq::event::EventHandler;
use vocabq::generator::openai::ChatClient;
use vocabq::ui::components::editor_pane::EditorPane;
use vocabq::ui::components::file_browser::FileBrowserView;
use vocabq::ui::components::prompt_box::PromptBox;
use vocabq::ui::components::select_list::SelectListView;
use vocabq::ui::layout::{EditorLayout, centered_rect, framed};
use vocabq::ui::line_input::LineInput;
use vocabq::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "vocabq",
    version,
    about = "Terminal editor that turns vocabulary lists into practice questions"
)]
struct Cli {
    #[arg(short, long, help = "Path to config.toml")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Path to the api.json credential file")]
    credentials: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let theme_name = cli.theme.as_deref().unwrap_or(&config.theme);
    let theme = Theme::load(theme_name).unwrap_or_default();

    let credential_path = cli
        .credentials
        .clone()
        .unwrap_or_else(|| config.credential_file.clone());
    let credential = load_credential(&credential_path);

    let start_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut app = App::new(credential, SessionSettings::from_config(&config, start_dir));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if app.mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let client = ChatClient::new(&config.endpoint, config.request_timeout());
    let runner = CommandRunner::new(events.sender(), Arc::new(client));

    let result = run_app(&mut terminal, &mut app, &events, &runner, &theme);

    let _ = execute!(io::stdout(), DisableMouseCapture);
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = ?err, "exited with error");
        eprintln!("Error: {err:?}");
    }
    info!("shutdown");

    Ok(())
}

/// Route logs to a file; stdout belongs to the terminal UI.
fn init_tracing(config: &Config) {
    if let Some(dir) = config.log_file.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
    {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    runner: &CommandRunner,
    theme: &Theme,
) -> Result<()> {
    let startup = app.startup();
    if let Err(err) = runner.dispatch_all(startup) {
        app.fail(format!("Could not start background task: {err}"));
    }

    let mut mouse_captured = app.mouse_enabled;
    loop {
        terminal.draw(|frame| render(frame, app, theme))?;

        let commands = app.handle_event(events.next()?);
        if let Err(err) = runner.dispatch_all(commands) {
            app.fail(format!("Could not start background task: {err}"));
        }

        if app.mouse_enabled != mouse_captured {
            if app.mouse_enabled {
                execute!(io::stdout(), EnableMouseCapture)?;
            } else {
                execute!(io::stdout(), DisableMouseCapture)?;
            }
            mouse_captured = app.mouse_enabled;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let area = frame.area();
    let colors = &theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()).fg(colors.fg()));
    frame.render_widget(bg, area);

    if let Some(ref message) = app.last_error {
        render_error(frame, message, theme);
        return;
    }

    match app.mode {
        Mode::Editing => render_editor(frame, app, theme),
        Mode::FilePicking => {
            let body = render_full_screen(frame, app, theme);
            frame.render_widget(FileBrowserView::new(&app.file_browser, theme), body);
        }
        Mode::ModelSelection | Mode::QuestionTypeSelection => {
            let body = render_full_screen(frame, app, theme);
            let list_area = centered_rect(60, 90, body);
            frame.render_widget(SelectListView::new(&app.picker, theme), list_area);
        }
        Mode::SavePathEntry => {
            render_editor(frame, app, theme);
            render_prompt(frame, "Save output to:", &app.path_input, theme, 70);
        }
        Mode::SentenceCountEntry => {
            render_editor(frame, app, theme);
            render_prompt(
                frame,
                "Number of example sentences (1-99):",
                &app.count_input,
                theme,
                50,
            );
        }
    }
}

fn render_editor(frame: &mut ratatui::Frame, app: &App, theme: &Theme) {
    let colors = &theme.colors;
    let layout = EditorLayout::new(frame.area(), app.loaded_file.is_some());

    if let (Some(banner), Some(path)) = (layout.banner, app.loaded_file.as_deref()) {
        let line = Line::from(vec![
            Span::styled("File: ", Style::default().fg(colors.muted())),
            Span::styled(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), banner);
    }

    let editing = app.mode == Mode::Editing;
    frame.render_widget(
        EditorPane::new(
            app.buffer(Pane::Input),
            "Vocabulary",
            editing && app.focused == Pane::Input,
            theme,
        ),
        layout.input,
    );
    frame.render_widget(
        EditorPane::new(
            app.buffer(Pane::Output),
            "Questions",
            editing && app.focused == Pane::Output,
            theme,
        ),
        layout.output,
    );

    render_status(frame, app, theme, layout.status);
}

/// Lay out a full-screen view with the status line below it. Returns the
/// body area.
fn render_full_screen(frame: &mut ratatui::Frame, app: &App, theme: &Theme) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(framed(frame.area()));
    render_status(frame, app, theme, rows[1]);
    rows[0]
}

fn render_prompt(
    frame: &mut ratatui::Frame,
    label: &str,
    input: &LineInput,
    theme: &Theme,
    percent_x: u16,
) {
    let area = centered_rect(percent_x, 30, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(PromptBox::new(label, input, theme), area);
}

fn render_status(frame: &mut ratatui::Frame, app: &App, theme: &Theme, area: Rect) {
    let colors = &theme.colors;
    let style = if app.is_generating {
        Style::default().fg(colors.accent())
    } else if app.status_is_error {
        Style::default().fg(colors.error())
    } else if app.status == app.default_status {
        Style::default().fg(colors.muted())
    } else {
        Style::default().fg(colors.success())
    };
    let status = Paragraph::new(Span::styled(app.status.as_str(), style)).wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn render_error(frame: &mut ratatui::Frame, message: &str, theme: &Theme) {
    let colors = &theme.colors;
    let area = centered_rect(70, 40, frame.area());
    let text = vec![
        Line::from(Span::styled(
            "Error",
            Style::default()
                .fg(colors.error())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press ctrl+c to exit.",
            Style::default().fg(colors.muted()),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().border_style(Style::default().fg(colors.error())));
    frame.render_widget(paragraph, area);
}
