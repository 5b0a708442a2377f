use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::stdout,
    thread,
    time::{Duration, Instant},
};

use blockfall::config::{DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TICK_MS};
use blockfall::piece::Cell;
use blockfall::{Config, Game, GameEvent, GameState, RandomPieceProvider};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "blockfall", about = "Falling-block puzzle in the terminal")]
struct Args {
    /// Field width in cells
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: usize,

    /// Field height in cells
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Gravity interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    delay_ms: u64,

    /// Upper bound on redraws per second
    #[arg(long, default_value_t = 30)]
    max_fps: u32,

    /// Seed for a repeatable piece sequence
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Input
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    TogglePause,
    Restart,
    Quit,
}

fn command_for(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Left => Some(Command::MoveLeft),
        KeyCode::Right => Some(Command::MoveRight),
        KeyCode::Down => Some(Command::SoftDrop),
        KeyCode::Up => Some(Command::Rotate),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::TogglePause),
        KeyCode::Char(' ') => Some(Command::Restart),
        _ => None,
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "··";
const INFO_WIDTH: u16 = 14;

fn cell_color(cell: Cell) -> Color {
    match cell {
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Blue,
        4 => Color::Rgb(255, 120, 0),
        5 => Color::Yellow,
        6 => Color::Magenta,
        7 => Color::Cyan,
        _ => Color::Black,
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, last_event: Option<&GameEvent>) {
    let area = frame.size();
    match game.state() {
        GameState::Running => render_game(frame, game, last_event, area),
        GameState::Paused => center_message(frame, area, &["Paused"]),
        GameState::GameOver => {
            center_message(frame, area, &["Game Over!", "Press space to continue"])
        }
    }
}

fn render_game(frame: &mut Frame, game: &Game, last_event: Option<&GameEvent>, area: Rect) {
    let columns = game.config().columns as u16;
    let rows = game.config().rows as u16;
    let grid_display_width = columns * CELL_WIDTH + 2;
    let grid_display_height = rows + 2;

    let main_area = centered_rect(grid_display_width + INFO_WIDTH, grid_display_height, area);
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(main_area);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, last_event, horizontal[1]);
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let title = format!(" Tetris {} * {} ", game.config().rows, game.config().columns);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .visible_grid()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    0 => Span::styled(EMPTY_CHAR, Style::default().fg(Color::DarkGray)),
                    id => Span::styled(BLOCK_CHAR, Style::default().fg(cell_color(id))),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, last_event: Option<&GameEvent>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(game.score().to_string()),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(game.lines_cleared().to_string()),
    ];
    if let Some(GameEvent::LinesCleared(n)) = last_event {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("+{n} rows"),
            Style::default().fg(Color::Green),
        )));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn center_message(frame: &mut Frame, area: Rect, message: &[&str]) {
    let lines: Vec<Line> = message
        .iter()
        .map(|line| Line::from(Span::styled(*line, Style::default().fg(Color::White))))
        .collect();
    let height = lines.len() as u16;
    let width = message.iter().map(|line| line.len()).max().unwrap_or(0) as u16;

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, centered_rect(width, height, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::new(args.columns, args.rows)?
        .with_tick_interval(Duration::from_millis(args.delay_ms))?;
    let provider = match args.seed {
        Some(seed) => RandomPieceProvider::seeded(seed),
        None => RandomPieceProvider::new(),
    };
    let game = Game::with_provider(config, Box::new(provider))?;
    let frame_time = Duration::from_secs(1) / args.max_fps.max(1);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, game, frame_time);

    // Always try to restore terminal state.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);

    let score = result?;
    println!("Final score: {score}");
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut game: Game,
    frame_time: Duration,
) -> Result<u32> {
    let mut last_tick = Instant::now();
    let mut last_event = None;

    loop {
        let frame_start = Instant::now();
        terminal.draw(|frame| render(frame, &game, last_event.as_ref()))?;

        // Wait for input until the next gravity tick
        let timeout = game
            .tick_interval()
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match command_for(key.code) {
                        Some(Command::Quit) => {
                            terminal.draw(|frame| {
                                let area = frame.size();
                                center_message(frame, area, &["Exiting..."]);
                            })?;
                            return Ok(game.quit());
                        }
                        Some(Command::MoveLeft) => {
                            game.move_horizontal(-1);
                        }
                        Some(Command::MoveRight) => {
                            game.move_horizontal(1);
                        }
                        Some(Command::SoftDrop) => game.soft_drop(),
                        Some(Command::Rotate) => {
                            game.rotate();
                        }
                        Some(Command::TogglePause) => game.toggle_pause(),
                        Some(Command::Restart) => game.restart(),
                        None => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= game.tick_interval() {
            game.tick();
            last_tick = Instant::now();
        }

        if let Some(event) = game
            .take_events()
            .into_iter()
            .rev()
            .find(|e| !matches!(e, GameEvent::PieceMoved))
        {
            last_event = Some(event);
        }

        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}
