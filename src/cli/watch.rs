//! Watch command implementation - Interactive TUI viewer.

// Grid sizes are capped well below u16::MAX
#![allow(clippy::cast_possible_truncation)]

use super::{CliError, SetupArgs};
use cellchain::config::{SimulationConfig, limits};
use cellchain::{Entity, Grid, Position, SimulationEngine};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::cell::Cell;
use std::io::stdout;
use std::rc::Rc;
use std::time::{Duration, Instant};

const SPEED_STEP_MS: u64 = 50;
const SLOWEST_MS: u64 = 2000;

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the settings are invalid or the TUI fails.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn execute(setup: SetupArgs, delay: Option<u64>) -> Result<(), CliError> {
    let mut config = setup.resolve()?;
    if let Some(delay_ms) = delay {
        config.delay_ms = delay_ms.max(limits::MIN_DELAY_MS);
    }
    let app = App::new(config, setup.seed())?;
    run_tui(app)
}

/// App state for the TUI.
struct App {
    engine: SimulationEngine,
    config: SimulationConfig,
    seed: u64,
    delay_ms: u64,
    /// Tick at which the last run died out, set by the engine callback.
    extinct_at: Rc<Cell<Option<u64>>>,
}

impl App {
    fn new(config: SimulationConfig, seed: u64) -> Result<Self, CliError> {
        let extinct_at = Rc::new(Cell::new(None));
        let engine = build_engine(&config, seed, &extinct_at)?;
        Ok(Self {
            engine,
            config,
            seed,
            delay_ms: config.delay_ms,
            extinct_at,
        })
    }

    fn toggle_pause(&mut self) {
        if self.engine.is_running() {
            self.engine.stop();
        } else if self.engine.grid().cell_count() > 0 {
            self.extinct_at.set(None);
            self.engine.start(Duration::from_millis(self.delay_ms));
        }
    }

    fn step_once(&mut self) {
        if !self.engine.is_running() && self.engine.grid().cell_count() > 0 {
            self.engine.step();
        }
    }

    fn set_speed(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms.clamp(limits::MIN_DELAY_MS, SLOWEST_MS);
        if self.engine.is_running() {
            self.engine.stop();
            self.engine.start(Duration::from_millis(self.delay_ms));
        }
    }

    fn increase_speed(&mut self) {
        self.set_speed(self.delay_ms.saturating_sub(SPEED_STEP_MS));
    }

    fn decrease_speed(&mut self) {
        self.set_speed(self.delay_ms + SPEED_STEP_MS);
    }

    /// Rebuild the grid. `reseed` moves on to the next seed.
    fn restart(&mut self, reseed: bool) -> Result<(), CliError> {
        if reseed {
            self.seed = self.seed.wrapping_add(1);
        }
        self.engine.stop();
        self.extinct_at.set(None);
        self.engine = build_engine(&self.config, self.seed, &self.extinct_at)?;
        Ok(())
    }

    fn status(&self) -> &'static str {
        if self.extinct_at.get().is_some() {
            "EXTINCT"
        } else if self.engine.is_running() {
            "RUNNING"
        } else {
            "PAUSED"
        }
    }
}

fn build_engine(
    config: &SimulationConfig,
    seed: u64,
    extinct_at: &Rc<Cell<Option<u64>>>,
) -> Result<SimulationEngine, CliError> {
    use rand::SeedableRng;
    let grid = config.build_grid(&mut rand::rngs::StdRng::seed_from_u64(seed))?;
    let flag = Rc::clone(extinct_at);
    Ok(SimulationEngine::seeded(grid, config.rules, seed)?
        .with_no_moves(move |tick| flag.set(Some(tick))))
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        app.engine.run_pending(Instant::now());

        if event::poll(Duration::from_millis(20))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => app.step_once(),
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => app.restart(false)?,
                KeyCode::Char('n') => app.restart(true)?,
                _ => {}
            }
        }
    }
    app.engine.stop();
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(chunks[1]);

    render_grid(f, main_chunks[0], app.engine.grid());
    render_stats(f, main_chunks[1], app);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " Cellchain | Tick {} | {} | Delay: {}ms | Seed: {} ",
        app.engine.tick_count(),
        app.status(),
        app.delay_ms,
        app.seed
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_grid(f: &mut Frame, area: Rect, grid: &Grid) {
    let digits = grid
        .tiles()
        .iter()
        .filter_map(|entity| match entity {
            Entity::Empty => None,
            Entity::Food(food) => Some(food.max_value()),
            Entity::Cell(cell) => Some(cell.max_value()),
        })
        .max()
        .unwrap_or(0)
        .to_string()
        .len();
    let tile_width = digits + 2;

    // Show the portion of the grid that fits
    let visible_width = (usize::from(area.width).saturating_sub(2) / tile_width)
        .min(usize::from(grid.width()));
    let visible_height =
        usize::from(area.height).saturating_sub(2).min(usize::from(grid.height()));

    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);
    for y in 0..visible_height {
        let spans: Vec<Span> = (0..visible_width)
            .map(|x| tile_span(grid.get(Position::new(x as u16, y as u16)), digits))
            .collect();
        lines.push(Line::from(spans));
    }

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Grid "));
    f.render_widget(widget, area);
}

fn tile_span(entity: Entity, digits: usize) -> Span<'static> {
    match entity {
        Entity::Empty => Span::styled(
            format!(" {:>digits$} ", "."),
            Style::default().fg(Color::DarkGray),
        ),
        Entity::Food(food) => Span::styled(
            format!(" {:>digits$} ", food.value()),
            Style::default().fg(Color::Gray),
        ),
        Entity::Cell(cell) => Span::styled(
            format!("[{:>digits$}]", cell.value()),
            Style::default()
                .fg(value_color(cell.value()))
                .add_modifier(Modifier::BOLD),
        ),
    }
}

fn value_color(value: u8) -> Color {
    match value % 6 {
        0 => Color::Red,
        1 => Color::Yellow,
        2 => Color::Green,
        3 => Color::Cyan,
        4 => Color::Blue,
        _ => Color::Magenta,
    }
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let census = app.engine.grid().census();
    let rules = app.engine.config();
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    let mut lines = vec![
        Line::from(""),
        Line::from(format!("Cells: {}", census.cells)),
        Line::from(format!("Food: {}", census.food)),
        Line::from(format!("Empty: {}", census.empty)),
        Line::from(format!("Energy: {}", census.total_energy)),
        Line::from(""),
        Line::from(format!("Starvation: {}", on_off(rules.cells_die))),
        Line::from(format!("Wandering: {}", on_off(rules.allow_random_move))),
        Line::from(format!("Cannibals: {}", on_off(rules.cannibal_mode))),
        Line::from(format!("Max value: {}", app.config.max_value)),
    ];

    if let Some(report) = app.engine.last_report() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Last tick ate {}", report.food_eaten + report.cells_eaten)));
        lines.push(Line::from(format!("  moved {}", report.random_moves)));
        lines.push(Line::from(format!("  starved {}", report.starved)));
    }

    if let Some(tick) = app.extinct_at.get() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("No cells left after tick {tick}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Census "))
        .wrap(Wrap { trim: false });

    f.render_widget(widget, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let controls = " [q] Quit  [Space] Run/Pause  [→] Step  [+/-] Speed  [r] Restart  [n] New seed ";

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
