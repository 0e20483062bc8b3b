use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Tabs,
    Wrap,
};

use nba_terminal::aggregate::format_count;
use nba_terminal::config::Config;
use nba_terminal::provider::spawn_provider;
use nba_terminal::roster::load_roster;
use nba_terminal::session::Session;
use nba_terminal::state::{
    self, AppState, CareerRow, CareerView, NoShotReason, ProviderCommand, SearchStatus,
    ShotStatus, Tab, apply_delta, tab_label,
};
use nba_terminal::stats_api::HttpStatsSource;

// Half-court bounds of the shot chart feed, in tenths of a foot from the rim.
const COURT_X: [f64; 2] = [-250.0, 250.0];
const COURT_Y: [f64; 2] = [-50.0, 420.0];

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('r') => self.send(ProviderCommand::ClearCache),
                KeyCode::Char('u') => self.state.input.clear(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::F(1) => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Enter => self.request_search(),
            KeyCode::Tab => self.state.next_tab(),
            KeyCode::BackTab => self.state.prev_tab(),
            KeyCode::Down => self.state.scroll_table_down(),
            KeyCode::Up => self.state.scroll_table_up(),
            KeyCode::Backspace => {
                self.state.input.pop();
            }
            KeyCode::Char(c) => self.state.input.push(c),
            _ => {}
        }
    }

    fn request_search(&mut self) {
        let name = self.state.begin_search();
        self.send(ProviderCommand::Search { name });
    }

    fn maybe_request_shots(&mut self) {
        let Some(player) = self.state.pending_shot_request() else {
            return;
        };
        self.state.mark_shots_loading();
        self.send(ProviderCommand::FetchShots { player });
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Stats provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Stats provider stopped");
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let (roster, roster_warning) = load_roster(config.roster_file.as_deref())?;
    let roster_size = roster.len();
    let source = HttpStatsSource::new(config.stats_base_url.clone(), config.request_timeout);
    let session = Session::new(roster, source, &config);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(session, tx, cmd_rx);

    let mut app = App::new(
        AppState::new(config.default_player.clone(), config.shot_season.clone()),
        Some(cmd_tx),
    );
    app.state
        .push_log(format!("[INFO] Roster ready with {roster_size} players"));
    if let Some(warning) = roster_warning {
        app.state.push_log(warning);
    }

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_request_shots();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(30)])
        .split(chunks[1]);

    render_sidebar(frame, body[0], &app.state);
    render_main(frame, body[1], &app.state);

    let footer = Paragraph::new(
        "Enter Search | Tab/Shift-Tab View | ↑/↓ Scroll | Ctrl-U Clear input | Ctrl-R Clear cache | F1 Help | Esc Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let view = tab_label(state.tab);
    let line1 = format!("  (o)  NBA PLAYER TERMINAL | {view} | Shots: {}", state.shot_season);
    let line2 = "  \\|/".to_string();
    format!("{line1}\n{line2}")
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(area);

    let input = Paragraph::new(format!("{}_", state.input))
        .style(Style::default().fg(Color::White))
        .block(Block::default().title("Player Name").borders(Borders::ALL));
    frame.render_widget(input, rows[0]);

    let hint = Paragraph::new("Type a full English name\n(Ex: LeBron James), Enter.")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::LEFT));
    frame.render_widget(hint, rows[1]);

    let console = Paragraph::new(console_text(state, rows[2].height.saturating_sub(2) as usize))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn console_text(state: &AppState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(lines.max(1));
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_main(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(5),
        ])
        .split(area);

    let (status, status_style) = status_line(state);
    let status = Paragraph::new(status)
        .style(status_style)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Status").borders(Borders::ALL));
    frame.render_widget(status, rows[0]);

    let Some(view) = state.found() else {
        return;
    };

    render_metrics(frame, rows[1], view);

    let titles = Tab::ALL
        .iter()
        .map(|tab| tab_label(*tab))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, rows[2]);

    match state.tab {
        Tab::Trend => render_trend(frame, rows[3], view),
        Tab::Shots => render_shots(frame, rows[3], view, state),
        Tab::Table => render_table(frame, rows[3], view, state.table_scroll),
    }
}

fn status_line(state: &AppState) -> (String, Style) {
    match &state.status {
        SearchStatus::Idle => (
            "Enter a player's full name on the left (Ex: Luka Doncic) and press Enter.".to_string(),
            Style::default().fg(Color::Cyan),
        ),
        SearchStatus::Searching { name } => (
            format!("Searching the NBA stats service for {name} ..."),
            Style::default().fg(Color::Yellow),
        ),
        SearchStatus::Found(view) => (
            format!("Loaded stats for {} (id {})", view.player.name, view.player.id),
            Style::default().fg(Color::Green),
        ),
        SearchStatus::NotFound { name } => (
            format!("Player not found: {name}. Check the spelling (Ex: LeBron James)."),
            Style::default().fg(Color::Red),
        ),
        SearchStatus::FetchFailed { name, error } => (
            format!("Data fetch failed for {name}: {error}"),
            Style::default().fg(Color::Red),
        ),
    }
}

fn render_metrics(frame: &mut Frame, area: Rect, view: &CareerView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    let summary = &view.summary;
    let metrics = [
        ("Career Points", format_count(summary.total_points)),
        ("Points / Game", format!("{:.1}", summary.points_per_game)),
        ("Games Played", format_count(summary.total_games)),
        ("Career Assists", format_count(summary.total_assists)),
    ];
    for (idx, (label, value)) in metrics.into_iter().enumerate() {
        let metric = Paragraph::new(value)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().title(label).borders(Borders::ALL));
        frame.render_widget(metric, cols[idx]);
    }
}

fn render_trend(frame: &mut Frame, area: Rect, view: &CareerView) {
    let block = Block::default()
        .title(format!("{} Career Points Trend", view.player.name))
        .borders(Borders::ALL);
    if view.trend.is_empty() {
        let empty = Paragraph::new("No seasons recorded")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let points = view
        .trend
        .iter()
        .enumerate()
        .map(|(idx, (_, pts))| (idx as f64, *pts))
        .collect::<Vec<_>>();
    let max_pts = points.iter().map(|(_, pts)| *pts).fold(0.0_f64, f64::max);
    let y_max = (max_pts * 1.1).max(10.0);
    let x_max = (points.len().saturating_sub(1) as f64).max(1.0);

    let datasets = vec![Dataset::default()
        .name("Total Points")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Red))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Season")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(season_labels(&view.trend)),
        )
        .y_axis(
            Axis::default()
                .title("Total Points")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{y_max:.0}")),
                ]),
        );
    frame.render_widget(chart, area);
}

fn season_labels(trend: &[(String, f64)]) -> Vec<Span<'static>> {
    let first = trend.first().map(|(season, _)| season.clone());
    let mid = trend.get(trend.len() / 2).map(|(season, _)| season.clone());
    let last = trend.last().map(|(season, _)| season.clone());
    if trend.len() < 3 {
        return [first, last]
            .into_iter()
            .flatten()
            .map(Span::raw)
            .collect();
    }
    [first, mid, last]
        .into_iter()
        .flatten()
        .map(Span::raw)
        .collect()
}

fn render_shots(frame: &mut Frame, area: Rect, view: &CareerView, state: &AppState) {
    let season = &state.shot_season;
    let title = format!("{} ({season}) Shot Chart", view.player.name);
    let message = |text: String, color: Color| {
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title.clone()).borders(Borders::ALL))
    };

    let partition = match &state.shots {
        ShotStatus::NotRequested | ShotStatus::Loading => {
            frame.render_widget(
                message(format!("Loading {season} shot chart ..."), Color::Yellow),
                area,
            );
            return;
        }
        ShotStatus::NoData(NoShotReason::Empty) => {
            frame.render_widget(message(format!("No shot data for {season}."), Color::Yellow), area);
            return;
        }
        ShotStatus::NoData(NoShotReason::Failed(err)) => {
            frame.render_widget(
                message(format!("No shot data for {season}. ({err})"), Color::Yellow),
                area,
            );
            return;
        }
        ShotStatus::Ready(partition) if partition.is_empty() => {
            frame.render_widget(message(format!("No shot data for {season}."), Color::Yellow), area);
            return;
        }
        ShotStatus::Ready(partition) => partition,
    };

    let made = partition
        .made
        .iter()
        .map(|shot| (shot.loc_x, shot.loc_y))
        .collect::<Vec<_>>();
    let missed = partition
        .missed
        .iter()
        .map(|shot| (shot.loc_x, shot.loc_y))
        .collect::<Vec<_>>();
    let fg = partition
        .field_goal_pct()
        .map(|pct| format!("FG {pct:.1}%"))
        .unwrap_or_else(|| "FG -".to_string());

    let datasets = vec![
        Dataset::default()
            .name(format!("Miss ({})", missed.len()))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::LightRed))
            .data(&missed),
        Dataset::default()
            .name(format!("Made ({})", made.len()))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Cyan))
            .data(&made),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!("{title} | {fg} on {} attempts", partition.attempts()))
                .borders(Borders::ALL),
        )
        .x_axis(Axis::default().bounds(COURT_X))
        .y_axis(Axis::default().bounds(COURT_Y));
    frame.render_widget(chart, area);
}

fn render_table(frame: &mut Frame, area: Rect, view: &CareerView, scroll: usize) {
    let header = Row::new(
        [
            "SEASON", "TEAM", "AGE", "GP", "GS", "MIN", "PTS", "REB", "AST", "STL", "BLK", "TOV",
            "FG%", "3P%", "FT%",
        ]
        .map(Cell::from),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = view.rows.iter().skip(scroll).map(career_table_row);
    let widths = [
        Constraint::Length(8),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(
                "Career Totals ({} of {} seasons)",
                view.rows.len().saturating_sub(scroll),
                view.rows.len()
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn career_table_row(row: &CareerRow) -> Row<'static> {
    let pct = |value: Option<f64>| {
        value
            .map(|v| format!("{:.1}", v * 100.0))
            .unwrap_or_else(|| "-".to_string())
    };
    let age = row
        .player_age
        .map(|age| format!("{age:.0}"))
        .unwrap_or_else(|| "-".to_string());
    Row::new(vec![
        row.season_id.clone(),
        row.team_abbreviation.clone(),
        age,
        row.gp.to_string(),
        row.gs.to_string(),
        format!("{:.0}", row.min),
        row.pts.to_string(),
        row.reb.to_string(),
        row.ast.to_string(),
        row.stl.to_string(),
        row.blk.to_string(),
        row.tov.to_string(),
        pct(row.fg_pct),
        pct(row.fg3_pct),
        pct(row.ft_pct),
    ])
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NBA Player Terminal - Help",
        "",
        "Search:",
        "  type         Edit the player name",
        "  Enter        Look up the player",
        "  Ctrl-U       Clear the name",
        "",
        "Views:",
        "  Tab          Next view",
        "  Shift-Tab    Previous view",
        "  ↑/↓          Scroll the career table",
        "",
        "Other:",
        "  Ctrl-R       Forget cached responses",
        "  F1           Toggle help",
        "  Esc/Ctrl-C   Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
