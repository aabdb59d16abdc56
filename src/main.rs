mod app;
mod event;
mod ui;

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
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
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use factdrill::config::Config;
use factdrill::display::{compose, equals_line, layout, stimulus};
use factdrill::facts::Operation;
use factdrill::session::{EntryMode, InterventionMode, Phase, SessionEvent, SessionMachine};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::fact_frame::FactFrame;
use ui::components::keypad::{Keypad, KeypadKey};
use ui::components::progress_bar::{ProgressBar, format_remaining};
use ui::components::summary::Summary;
use ui::layout::{LayoutTier, PracticeLayout, centered_rect};

#[derive(Parser)]
#[command(name = "factdrill", version, about = "Math fact fluency practice in the terminal")]
struct Cli {
    #[arg(short, long, help = "Student id")]
    student: Option<String>,

    #[arg(short = 'o', long, help = "Operation to practice (addition, subtraction, multiplication, division)")]
    target: Option<Operation>,

    #[arg(short, long, help = "Intervention mode (ccc, explicit-timing, taped-problems, benchmark)")]
    mode: Option<InterventionMode>,

    #[arg(long, help = "Minutes for timed modes")]
    minutes: Option<u32>,

    #[arg(short, long, help = "Present facts in random order")]
    randomize: bool,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory for student records and history")]
    data_dir: Option<String>,
}

fn init_logging(data_dir: &str) -> Option<WorkerGuard> {
    let log_dir = Path::new(data_dir).join("logs");
    if fs::create_dir_all(&log_dir).is_err() {
        return None;
    }
    let file_appender = tracing_appender::rolling::never(&log_dir, "factdrill.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("factdrill=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load();
    let mut config = match loaded {
        Ok(ref config) => config.clone(),
        Err(_) => Config::default(),
    };
    if let Some(student) = cli.student {
        config.student_id = student;
    }
    if let Some(target) = cli.target {
        config.target = target;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(minutes) = cli.minutes {
        config.timing_minutes = minutes;
        config.benchmark_minutes = minutes;
    }
    if cli.randomize {
        config.randomize = true;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    config.validate();

    let _log_guard = init_logging(&config.data_dir);
    if let Err(err) = loaded {
        warn!(error = %err, "config file unreadable, using defaults");
    }
    info!(student = %config.student_id, target = %config.target, mode = %config.mode, "starting");

    let mut app = App::new(config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            if let Some(session) = app.session.take() {
                session.abandon();
            }
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::Summary => handle_summary_key(app, key),
        AppScreen::NoProblems => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.go_to_menu(),
            _ => {}
        },
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(ch @ '1'..='4') => {
            let index = ch as usize - '1' as usize;
            let mode = InterventionMode::ALL[index];
            app.menu.select(mode);
            app.start_session(mode);
        }
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            let mode = app.menu.selected_mode();
            app.start_session(mode);
        }
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.abandon(),
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm(),
        KeyCode::Backspace => app.handle_session_event(SessionEvent::Backspace),
        KeyCode::Delete => app.handle_session_event(SessionEvent::Clear),
        KeyCode::Tab => app.handle_session_event(SessionEvent::Skip),
        KeyCode::Char(ch) => app.handle_session_event(SessionEvent::Input(ch)),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('s') => app.retry_persist(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != AppScreen::Practice || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let Some(entry_mode) = app.session.as_ref().map(|s| s.policy().entry) else {
        return;
    };
    let Ok((width, height)) = crossterm::terminal::size() else {
        return;
    };
    let regions = PracticeLayout::new(Rect::new(0, 0, width, height));
    match Keypad::hit(entry_mode, regions.keypad, mouse.column, mouse.row) {
        Some(KeypadKey::Check) => app.confirm(),
        Some(key) => {
            if let Some(event) = key.event() {
                app.handle_session_event(event);
            }
        }
        None => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Summary => render_summary(frame, app),
        AppScreen::NoProblems => render_no_problems(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let menu_area = centered_rect(60, 80, layout[0]);
    frame.render_widget(&app.menu, menu_area);

    let footer_text = match app.notice {
        Some(ref notice) => format!(" {notice}"),
        None => " [1-4] Start  [Enter] Start selected  [q] Quit ".to_string(),
    };
    let footer_color = if app.notice.is_some() {
        colors.warning()
    } else {
        colors.border()
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(footer_color),
    )));
    frame.render_widget(footer, layout[1]);
}

fn render_timer(frame: &mut ratatui::Frame, app: &App, session: &SessionMachine, area: Rect) {
    let now = Instant::now();
    let bar = match (session.time_remaining(now), session.policy().deadline) {
        (Some(remaining), Some(total)) => {
            let ratio = remaining.as_secs_f64() / total.as_secs_f64().max(1.0);
            ProgressBar::new("Time", ratio, app.theme)
                .caption(format_remaining(remaining.as_secs()))
                .urgent(remaining < Duration::from_secs(10))
        }
        _ => {
            let done = session.records().len();
            let total = session.total_problems().max(1);
            ProgressBar::new("Progress", done as f64 / total as f64, app.theme)
                .caption(format!("{done} / {total}"))
        }
    };
    frame.render_widget(bar, area);
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let Some(ref session) = app.session else {
        return;
    };
    let regions = PracticeLayout::new(area);
    let state = session.state();
    let entry_mode = session.policy().entry;
    let problem = &state.current_problem;

    let position = format!("Problem {} of {}", session.records().len() + 1, session.total_problems());
    let header_text = match regions.tier {
        LayoutTier::Wide => format!(
            " {} | {} | {} | {position}",
            app.mode.label(),
            app.config.student_id,
            app.config.target,
        ),
        LayoutTier::Narrow => format!(" {} | {position}", app.mode.label()),
    };
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(header, regions.header);

    render_timer(frame, app, session, regions.timer);

    let stimulus_title = match entry_mode {
        EntryMode::ProblemEntry => "Look",
        EntryMode::AnswerEntry => "Problem",
    };
    let mut stimulus_panel = FactFrame::new(
        stimulus_title,
        stimulus(problem, entry_mode),
        equals_line(&problem.prompt(), false),
        app.theme,
    )
    .covered(state.is_covered);

    let (response_frame, response_tone, response_title) = match app.feedback {
        Some(ref feedback) => {
            let shown = match entry_mode {
                EntryMode::ProblemEntry => feedback.entered.clone(),
                EntryMode::AnswerEntry => format!("{}{}", problem.prompt(), feedback.entered),
            };
            (layout(&shown), equals_line(&shown, false), "Your try")
        }
        None => {
            let entered = state.entry.as_str();
            let shown = match entry_mode {
                EntryMode::ProblemEntry => entered.to_string(),
                EntryMode::AnswerEntry => format!("{}{entered}", problem.prompt()),
            };
            (
                compose(problem, entered, entry_mode),
                equals_line(&shown, state.is_covered),
                "Copy",
            )
        }
    };
    let mut response_panel = FactFrame::new(response_title, response_frame, response_tone, app.theme);

    if state.phase == Phase::Correcting {
        stimulus_panel = stimulus_panel.accent(colors.correct());
        response_panel = response_panel.accent(colors.incorrect());
    }

    frame.render_widget(stimulus_panel, regions.stimulus);
    frame.render_widget(response_panel, regions.response);
    frame.render_widget(Keypad::new(entry_mode, app.theme), regions.keypad);

    let (footer_text, footer_color) = match (state.phase, app.feedback.as_ref(), app.notice.as_ref()) {
        (Phase::Correcting, Some(feedback), _) => (
            format!(
                " Not quite, the answer is {}. Compare, then press Space to try again (attempt {} of {}) ",
                feedback.expected.answer,
                feedback.attempt + 1,
                session.policy().max_attempts,
            ),
            colors.incorrect(),
        ),
        (_, _, Some(notice)) => (format!(" {notice} "), colors.warning()),
        (Phase::Presenting, _, _) if entry_mode == EntryMode::ProblemEntry => (
            " Study the fact, then start typing or press Space  [Tab] Skip  [Esc] Quit ".to_string(),
            colors.border(),
        ),
        _ => (
            " [Space] Check  [Backspace] Delete  [Del] Clear  [Tab] Skip  [Esc] Quit ".to_string(),
            colors.border(),
        ),
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(footer_color),
    )))
    .wrap(Wrap { trim: true })
    .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(footer, regions.footer);
}

fn render_summary(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref result) = app.last_result {
        let centered = centered_rect(60, 70, area);
        let summary = Summary::new(result, app.persist_error.as_deref(), app.theme);
        frame.render_widget(summary, centered);
    }
}

fn render_no_problems(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(50, 30, area);
    let message = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No math problems have been added",
            Style::default()
                .fg(colors.warning())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} has no {} facts to practice. Facts need to be added before practice can start.",
                app.config.student_id, app.config.target
            ),
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Back to menu",
            Style::default().fg(colors.accent()),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::bordered()
            .border_style(Style::default().fg(colors.warning()))
            .style(Style::default().bg(colors.bg())),
    );
    frame.render_widget(message, centered);
}
