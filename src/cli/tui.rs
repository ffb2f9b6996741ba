use std::collections::VecDeque;
use std::io::{self, Stdout, stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use crate::coords::{self, BOARD_SIZE, Point};
use crate::game::{Game, GameEvent, RoundPhase};
use crate::types::{Bank, CableColor, TimeBand};

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Terminal cells are coarse, so the pointer gets a wider catch radius than a
/// drawn connector.
const HIT_RADIUS: f64 = 36.0;
const CONNECTOR_DRAW_RADIUS: f64 = 13.0;
const CURVE_SEGMENTS: usize = 24;
const EVENT_LOG_LEN: usize = 8;

pub struct TuiApp {
    game: Game,
    board_area: Rect,
    event_log: VecDeque<String>,
    show_help: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            board_area: Rect::default(),
            event_log: VecDeque::with_capacity(EVENT_LOG_LEN),
            show_help: false,
            should_quit: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        // Always cleanup terminal state
        let _ = terminal.clear();
        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), DisableMouseCapture);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal) -> io::Result<()> {
        let mut last_frame = Instant::now();
        while !self.should_quit {
            self.collect_events();
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            let now = Instant::now();
            self.game.advance(now - last_frame);
            last_frame = now;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') => self.show_help = !self.show_help,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = self.board_point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(point) = point {
                    if let Some(index) = self.game.connector_at(Bank::Left, point, HIT_RADIUS) {
                        self.game.on_gesture_start(index, point);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => match point {
                Some(point) => {
                    self.game.on_gesture_move(point);
                    self.update_hover(point);
                }
                // Leaving the board ends the gesture like a release.
                None if self.game.drag_state().active => {
                    self.game.on_gesture_end();
                }
                None => {}
            },
            MouseEventKind::Up(MouseButton::Left) => {
                self.game.on_gesture_end();
            }
            _ => {}
        }
    }

    fn update_hover(&mut self, point: Point) {
        let hovered = self.game.connector_at(Bank::Right, point, HIT_RADIUS);
        if hovered == self.game.drag_over_target() {
            return;
        }
        match hovered {
            Some(index) => self.game.on_hover_enter(index),
            None => self.game.on_hover_leave(),
        }
    }

    /// Maps a terminal cell to board coordinates (y grows downwards).
    fn board_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.board_area;
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let x = (f64::from(column - area.x) + 0.5) / f64::from(area.width) * BOARD_SIZE;
        let y = (f64::from(row - area.y) + 0.5) / f64::from(area.height) * BOARD_SIZE;
        Some(Point::new(x, y))
    }

    fn collect_events(&mut self) {
        for event in self.game.drain_events() {
            let Some(line) = describe_event(&event) else {
                continue;
            };
            if self.event_log.len() == EVENT_LOG_LEN {
                self.event_log.pop_front();
            }
            self.event_log.push_back(line);
        }
    }

    fn render(&mut self, f: &mut Frame<'_>) {
        let area = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Timer
                Constraint::Min(20),   // Board and status
                Constraint::Length(3), // Help bar
            ])
            .split(area);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);

        self.render_timer(f, chunks[0]);
        self.render_board(f, main_chunks[0]);
        self.render_status(f, main_chunks[1]);
        self.render_help_bar(f, chunks[2]);
    }

    fn render_timer(&self, f: &mut Frame<'_>, area: Rect) {
        let state = self.game.state();
        let total = self.game.config().time_per_round.max(1);
        let ratio = (f64::from(state.time_left) / f64::from(total)).clamp(0.0, 1.0);
        let color = match self.game.time_band() {
            TimeBand::Green => Color::Green,
            TimeBand::Yellow => Color::Yellow,
            TimeBand::Red => Color::Red,
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Time"))
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(format!("{}s", state.time_left));
        f.render_widget(gauge, area);
    }

    fn render_board(&mut self, f: &mut Frame<'_>, area: Rect) {
        let border_color = match self.game.phase() {
            RoundPhase::Succeeded => Color::Green,
            RoundPhase::PermanentFailure => Color::Red,
            RoundPhase::TimedOut | RoundPhase::Failed => Color::Yellow,
            RoundPhase::Active => Color::White,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title("Board")
            .title_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        self.board_area = block.inner(area);

        let game = &self.game;
        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .background_color(Color::Rgb(0x1f, 0x29, 0x37))
            .x_bounds([0.0, BOARD_SIZE])
            .y_bounds([0.0, BOARD_SIZE])
            .paint(move |ctx| paint_board(ctx, game));
        f.render_widget(canvas, area);
    }

    fn render_status(&self, f: &mut Frame<'_>, area: Rect) {
        let config = self.game.config();
        let state = self.game.state();
        let mut lines: Vec<Line<'_>> = vec![
            Line::from(vec![
                Span::raw("Round "),
                Span::styled(
                    format!("{}", self.game.round()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!(
                "Connected: {}/{}",
                self.game.connections().len(),
                config.number_of_cables
            )),
            Line::from(format!(
                "Failed attempts: {}/{}",
                state.failed_attempts, config.max_failed_attempts
            )),
            Line::from(format!(
                "Lost rounds: {}/{}",
                self.game.lost_rounds(),
                config.max_lost_rounds
            )),
            Line::from(""),
        ];

        let (message, color) = match self.game.phase() {
            RoundPhase::Active => ("Drag each cable to its socket", Color::White),
            RoundPhase::Succeeded => ("All cables connected!", Color::Green),
            RoundPhase::TimedOut => ("Time is up. Retrying...", Color::Yellow),
            RoundPhase::Failed => ("Too many mistakes. Retrying...", Color::Yellow),
            RoundPhase::PermanentFailure => ("Locked out. Press q to quit.", Color::Red),
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for entry in &self.event_log {
            lines.push(Line::from(Span::styled(
                entry.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_help_bar(&self, f: &mut Frame<'_>, area: Rect) {
        let help_text = if self.show_help {
            "Press on a top/left cable, drag onto the bottom/right socket of the same color, release | h: Toggle Help | q/Esc: Quit"
        } else {
            "Press 'h' for help | q/Esc: Quit"
        };

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);

        f.render_widget(paragraph, area);
    }
}

fn describe_event(event: &GameEvent) -> Option<String> {
    let line = match event {
        GameEvent::RoundStarted { round } => format!("round {round} started"),
        GameEvent::Connected { from, to, .. } => format!("connected {from} -> {to}"),
        GameEvent::Mismatch { from, to, .. } => format!("wrong socket {from} -> {to}"),
        GameEvent::RoundWon { time_left, .. } => format!("won with {time_left}s left"),
        GameEvent::RoundLost { round, reason } => format!("round {round} lost ({reason})"),
        GameEvent::PermanentFailure { lost_rounds } => {
            format!("locked out after {lost_rounds} lost rounds")
        }
        GameEvent::Tick { .. } | GameEvent::FailFlashCleared | GameEvent::RetryScheduled { .. } => {
            return None;
        }
    };
    Some(line)
}

fn tui_color(color: &CableColor) -> Color {
    color
        .rgb()
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::White)
}

fn dimmed(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (f64::from(r) * 0.8) as u8,
            (f64::from(g) * 0.8) as u8,
            (f64::from(b) * 0.8) as u8,
        ),
        other => other,
    }
}

/// The canvas y axis grows upwards; board coordinates grow downwards.
fn flip(point: Point) -> (f64, f64) {
    (point.x, BOARD_SIZE - point.y)
}

fn draw_curve(ctx: &mut Context<'_>, start: Point, end: Point, color: Color, dashed: bool) {
    let points = coords::cable_curve(start, end, CURVE_SEGMENTS);
    for (step, pair) in points.windows(2).enumerate() {
        if dashed && step % 2 == 1 {
            continue;
        }
        let (x1, y1) = flip(pair[0]);
        let (x2, y2) = flip(pair[1]);
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

fn draw_connector(ctx: &mut Context<'_>, center: Point, radius: f64, color: Color) {
    let (x, y) = flip(center);
    ctx.draw(&Circle {
        x,
        y,
        radius,
        color,
    });
}

fn paint_board(ctx: &mut Context<'_>, game: &Game) {
    let left = game.left_cables();
    let right = game.right_cables();

    for connection in game.connections() {
        let (Some(start), Some(end), Some(cable)) = (
            game.connector_position(Bank::Left, connection.from),
            game.connector_position(Bank::Right, connection.to),
            left.get(connection.from),
        ) else {
            continue;
        };
        draw_curve(ctx, start, end, tui_color(&cable.color), false);
    }

    let drag = game.drag_state();
    if let (true, Some(from), Some(position)) =
        (drag.active, drag.start_index, drag.current_position)
    {
        if let (Some(start), Some(cable)) =
            (game.connector_position(Bank::Left, from), left.get(from))
        {
            draw_curve(ctx, start, position, tui_color(&cable.color), true);
        }
    }

    ctx.layer();
    let flash = game.fail_flash();
    for (index, cable) in left.iter().enumerate() {
        let Some(center) = game.connector_position(Bank::Left, index) else {
            continue;
        };
        let mut color = tui_color(&cable.color);
        if game.is_left_connected(index) {
            color = dimmed(color);
        }
        draw_connector(ctx, center, CONNECTOR_DRAW_RADIUS, color);
        draw_connector(ctx, center, CONNECTOR_DRAW_RADIUS / 2.0, color);
        if flash.from == Some(index) {
            draw_connector(ctx, center, CONNECTOR_DRAW_RADIUS + 8.0, Color::LightRed);
        }
    }
    for (index, cable) in right.iter().enumerate() {
        let Some(center) = game.connector_position(Bank::Right, index) else {
            continue;
        };
        draw_connector(ctx, center, CONNECTOR_DRAW_RADIUS, tui_color(&cable.color));
        if game.drag_over_target() == Some(index) {
            draw_connector(ctx, center, CONNECTOR_DRAW_RADIUS + 6.0, Color::White);
        }
        if flash.to == Some(index) {
            draw_connector(ctx, center, CONNECTOR_DRAW_RADIUS + 8.0, Color::LightRed);
        }
    }

    let banner = match game.phase() {
        RoundPhase::Succeeded => Some(("CONNECTED", Color::Green)),
        RoundPhase::PermanentFailure => Some(("LOCKED", Color::Red)),
        _ => None,
    };
    if let Some((text, color)) = banner {
        let (x, y) = flip(coords::BOARD_CENTER);
        ctx.print(
            x - 40.0,
            y,
            Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
    }
}
