// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! tempctl: terminal UI for the temperature control simulator.
//!
//! Sliders, a text entry and action keys feed the controller; the chart and
//! readouts are redrawn from the events it emits.

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Tabs, Wrap,
    },
};
use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;
use temperature_control::config::{self, Config, UiConfig};
use temperature_control::controller::{ControlEvent, Controller};
use temperature_control::state::{
    DESIRED_MAX_C, DESIRED_MIN_C, STEP_MAX_C, STEP_MIN_C,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "tempctl", about = "Interactive temperature control simulator")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    DesiredSlider,
    DesiredEntry,
    StepSlider,
}

impl Focus {
    const ALL: [Focus; 3] = [Focus::DesiredSlider, Focus::DesiredEntry, Focus::StepSlider];

    fn index(self) -> usize {
        match self {
            Focus::DesiredSlider => 0,
            Focus::DesiredEntry => 1,
            Focus::StepSlider => 2,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Focus::DesiredSlider => "Desired Temperature",
            Focus::DesiredEntry => "Set Desired Temperature",
            Focus::StepSlider => "Adjustment Step Size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct Dialog {
    kind: DialogKind,
    title: String,
    message: String,
}

struct App {
    running: bool,
    focus: Focus,
    status_message: String,
    ui: UiConfig,

    controller: Controller,
    events: Receiver<ControlEvent>,

    /// Text typed into the desired-temperature entry.
    entry: String,
    /// Pending modal dialogs, front is shown.
    dialogs: VecDeque<Dialog>,
    /// The two plotted points: (1, current) and (2, desired).
    chart: [(f64, f64); 2],
}

impl App {
    fn new(cfg: &Config) -> Self {
        let mut controller = Controller::new(cfg.simulation.tick_interval());
        let (tx, events) = mpsc::channel();
        controller.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });

        let state = controller.state();
        Self {
            running: true,
            focus: Focus::DesiredSlider,
            status_message: String::new(),
            ui: cfg.ui.clone(),
            controller,
            events,
            entry: format!("{:.1}", state.desired_c),
            dialogs: VecDeque::new(),
            chart: [(1.0, state.current_c), (2.0, state.desired_c)],
        }
    }

    /// Apply every event the controller emitted since the last call.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match &event {
                ControlEvent::Redraw {
                    current_c,
                    desired_c,
                } => {
                    self.chart = [(1.0, *current_c), (2.0, *desired_c)];
                    if self.focus != Focus::DesiredEntry {
                        self.entry = format!("{desired_c:.1}");
                    }
                }
                ControlEvent::Stabilized { .. }
                | ControlEvent::Cancelled { .. }
                | ControlEvent::Notice(_) => {
                    if let Some(message) = event.message() {
                        self.status_message = message.clone();
                        self.show_dialog(DialogKind::Info, "Temperature Control", message);
                    }
                }
            }
        }
    }

    fn show_dialog(&mut self, kind: DialogKind, title: &str, message: String) {
        self.dialogs.push_back(Dialog {
            kind,
            title: title.to_string(),
            message,
        });
    }

    fn nudge_focused_slider(&mut self, direction: f64) {
        let state = self.controller.state();
        match self.focus {
            Focus::DesiredSlider => {
                self.controller
                    .on_desired_changed_by_slider(state.desired_c + direction * self.ui.slider_step);
            }
            Focus::StepSlider => {
                self.controller
                    .on_step_changed_by_slider(state.step_c + direction * self.ui.step_slider_step);
                self.status_message =
                    format!("Step size {:.1}", self.controller.state().step_c);
            }
            Focus::DesiredEntry => {}
        }
    }

    fn submit_entry(&mut self) {
        match self.controller.on_desired_changed_by_text(&self.entry) {
            Ok(value) => {
                self.entry = format!("{value:.1}");
            }
            Err(e) => {
                self.status_message = "Invalid input".to_string();
                self.show_dialog(DialogKind::Error, "Error", e.to_string());
            }
        }
    }

    fn adjust(&mut self) {
        if self.controller.on_adjust_pressed().is_some() {
            self.status_message = "Adjusting...".to_string();
        } else {
            self.status_message = "Already adjusting".to_string();
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        if self.focus == Focus::DesiredEntry && focus != Focus::DesiredEntry {
            // Leaving the entry without submitting discards the edit.
            self.entry = format!("{:.1}", self.controller.state().desired_c);
        }
        self.focus = focus;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_path = config::resolve_config_path(Some(&cli.config));
    let cfg = config::load_config(&config_path).unwrap_or_else(|e| {
        log::warn!("Could not load config: {e}, using defaults");
        Config::default()
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cfg);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let poll_interval = app.ui.poll_interval();

    while app.running {
        terminal.draw(|f| ui(f, app))?;

        // Wake up for the pending tick even if no key arrives.
        let timeout = app
            .controller
            .time_until_tick(Instant::now())
            .map_or(poll_interval, |d| d.min(poll_interval));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_input(app, key.code, key.modifiers);
                }
            }
        }

        app.controller.poll_timer(Instant::now());
        app.drain_events();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

fn handle_input(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
    if let KeyCode::Char('c') = key {
        if modifiers.contains(KeyModifiers::CONTROL) {
            app.running = false;
            return;
        }
    }

    // Dialogs are modal
    if !app.dialogs.is_empty() {
        if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dialogs.pop_front();
        }
        return;
    }

    match key {
        KeyCode::Tab => {
            let idx = (app.focus.index() + 1) % Focus::ALL.len();
            app.set_focus(Focus::ALL[idx]);
            return;
        }
        KeyCode::BackTab => {
            let idx = (app.focus.index() + Focus::ALL.len() - 1) % Focus::ALL.len();
            app.set_focus(Focus::ALL[idx]);
            return;
        }
        _ => {}
    }

    if app.focus == Focus::DesiredEntry {
        handle_entry_input(app, key);
        return;
    }

    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Left | KeyCode::Char('h') => app.nudge_focused_slider(-1.0),
        KeyCode::Right | KeyCode::Char('l') => app.nudge_focused_slider(1.0),
        KeyCode::Char('e') => app.set_focus(Focus::DesiredEntry),
        KeyCode::Char('a') => app.adjust(),
        KeyCode::Char('d') => app.controller.on_reset_pressed(),
        KeyCode::Char('s') => app.controller.on_stop_pressed(),
        _ => {}
    }
}

fn handle_entry_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.set_focus(Focus::DesiredSlider),
        KeyCode::Enter => app.submit_entry(),
        KeyCode::Backspace => {
            app.entry.pop();
        }
        KeyCode::Char(ch) if !ch.is_control() && app.entry.len() < 16 => {
            app.entry.push(ch);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// UI rendering
// ---------------------------------------------------------------------------

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // focus bar
            Constraint::Min(0),    // content
            Constraint::Length(4), // status bar
        ])
        .split(f.area());

    draw_focus_bar(f, app, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    draw_controls(f, app, content[0]);
    draw_chart(f, app, content[1]);
    draw_status_bar(f, app, chunks[2]);

    if let Some(dialog) = app.dialogs.front() {
        draw_dialog(f, dialog);
    }
}

fn draw_focus_bar(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Focus::ALL.iter().map(|t| Line::from(t.title())).collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Interactive Temperature Control System "),
        )
        .select(app.focus.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn focused_block(app: &App, focus: Focus, title: String) -> Block<'static> {
    let style = if app.focus == focus {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_controls(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // desired slider
            Constraint::Length(3), // current readout
            Constraint::Length(3), // desired entry
            Constraint::Length(3), // step slider
            Constraint::Min(0),    // run info
        ])
        .split(area);

    let state = app.controller.state();

    // Desired temperature slider
    let desired_ratio =
        ((state.desired_c - DESIRED_MIN_C) / (DESIRED_MAX_C - DESIRED_MIN_C)).clamp(0.0, 1.0);
    let desired_gauge = Gauge::default()
        .block(focused_block(
            app,
            Focus::DesiredSlider,
            format!(" Desired Temperature [{DESIRED_MIN_C:.0}-{DESIRED_MAX_C:.0}] "),
        ))
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio(desired_ratio)
        .label(format!("{:.1}°C", state.desired_c));
    f.render_widget(desired_gauge, chunks[0]);

    // Current temperature
    let current = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{:.1}°C", state.current_c),
            Style::default().fg(Color::Green).bold(),
        ),
        Span::raw(format!("   (target {:.1}°C)", state.desired_c)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Current Temperature "),
    );
    f.render_widget(current, chunks[1]);

    // Desired temperature entry
    let cursor = if app.focus == Focus::DesiredEntry { "▏" } else { "" };
    let entry = Paragraph::new(format!("{}{cursor}", app.entry)).block(focused_block(
        app,
        Focus::DesiredEntry,
        " Desired Temperature [Enter to set] ".to_string(),
    ));
    f.render_widget(entry, chunks[2]);

    // Step size slider
    let step_ratio = ((state.step_c - STEP_MIN_C) / (STEP_MAX_C - STEP_MIN_C)).clamp(0.0, 1.0);
    let step_gauge = Gauge::default()
        .block(focused_block(
            app,
            Focus::StepSlider,
            format!(" Adjustment Step Size [{STEP_MIN_C:.1}-{STEP_MAX_C:.1}] "),
        ))
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(step_ratio)
        .label(format!("{:.1}", state.step_c));
    f.render_widget(step_gauge, chunks[3]);

    // Run info
    let (run_label, run_style) = if state.running {
        ("ADJUSTING", Style::default().fg(Color::Yellow).bold())
    } else if state.is_stable() {
        ("STABLE", Style::default().fg(Color::Green).bold())
    } else {
        ("IDLE", Style::default().fg(Color::Gray).bold())
    };
    let info = vec![
        Line::from(vec![Span::raw("State:      "), Span::styled(run_label, run_style)]),
        Line::from(format!("Iterations: {}", state.iterations)),
        Line::from(format!(
            "Interval:   {} ms",
            app.controller.tick_interval().as_millis()
        )),
    ];
    let info_widget = Paragraph::new(info).block(Block::default().borders(Borders::ALL).title(" Run "));
    f.render_widget(info_widget, chunks[4]);
}

fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let [(_, current_c), (_, desired_c)] = app.chart;
    let y_min = current_c.min(desired_c).min(DESIRED_MIN_C).floor() - 1.0;
    let y_max = current_c.max(desired_c).max(DESIRED_MAX_C).ceil() + 1.0;
    let y_mid = (y_min + y_max) / 2.0;

    let datasets = vec![
        Dataset::default()
            .name("current → desired")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&app.chart),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow).bold())
            .data(&app.chart),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Temperature Control Simulation "),
        )
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(Color::Gray))
                .bounds([1.0, 2.0])
                .labels(vec!["1".to_string(), "2".to_string()]),
        )
        .y_axis(
            Axis::default()
                .title("Temperature (°C)")
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    format!("{y_min:.0}"),
                    format!("{y_mid:.1}"),
                    format!("{y_max:.0}"),
                ]),
        );

    f.render_widget(chart, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let running = if app.controller.is_running() {
        Span::styled(" ADJUSTING ", Style::default().fg(Color::Yellow).bold())
    } else {
        Span::styled(" IDLE ", Style::default().fg(Color::Green).bold())
    };

    let msg = Span::raw(format!("  {}", app.status_message));

    let help = match app.focus {
        Focus::DesiredEntry => " type a value  [Enter]set  [Esc]back  [Tab]next ",
        _ => {
            " [h/l]slide  [e]ntry  [a]djust  [s]top  [d]efault settings  [Tab]next  [q]uit "
        }
    };

    let status_line = Line::from(vec![running, msg]);
    let help_line = Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)));

    let paragraph = Paragraph::new(vec![status_line, help_line])
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}

fn draw_dialog(f: &mut Frame, dialog: &Dialog) {
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);

    let border = match dialog.kind {
        DialogKind::Info => Style::default().fg(Color::Cyan),
        DialogKind::Error => Style::default().fg(Color::Red).bold(),
    };

    let body = vec![
        Line::from(""),
        Line::from(dialog.message.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] OK",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(body).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", dialog.title)),
    );
    f.render_widget(widget, area);
}

/// Utility: create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
