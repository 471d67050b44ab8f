use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Clear, Paragraph},
};
use serde_json::{Value, json};

use term_dock::LayoutManager;
use term_dock::components::{Component, ComponentRegistry, NoteComponent};
use term_dock::config::{LayoutConfig, ResolvedItemConfig};
use term_dock::drag::{DragListener, drop_areas};
use term_dock::layout::Point;
use term_dock::layout::area::hit_test;
use term_dock::ui::UiFrame;

/// Ticks per scripted drag: press, sweep, release.
const DRAG_CYCLE: u64 = 40;
/// Every this many ticks the layout is saved and reloaded.
const ROUND_TRIP_EVERY: u64 = 120;

#[derive(Parser, Debug)]
#[command(
    name = "dock-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Layout-heavy benchmark for the docking engine"
)]
struct BenchCli {
    /// How long to run the benchmark.
    #[arg(
        short = 'd',
        long = "duration",
        value_name = "SECONDS",
        default_value_t = 10.0
    )]
    duration_seconds: f64,

    /// Target frames per second. Ignored when running headless.
    #[arg(short = 'f', long = "fps", value_name = "FPS", default_value_t = 60.0)]
    target_fps: f64,

    /// Number of stacks in the generated layout.
    #[arg(short = 's', long = "stacks", default_value_t = 6)]
    stacks: usize,

    /// Tabs per stack.
    #[arg(short = 't', long = "tabs", default_value_t = 3)]
    tabs: usize,

    /// Render into an in-memory buffer instead of the terminal.
    #[arg(long)]
    headless: bool,

    /// Headless area as WIDTHxHEIGHT.
    #[arg(long, value_name = "WxH", default_value = "160x48")]
    size: String,
}

struct BenchConfig {
    duration: Duration,
    target_fps: f64,
    frame_budget: Duration,
    stacks: usize,
    tabs: usize,
    headless_area: Rect,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(0.5..=600.0).contains(&cli.duration_seconds) {
            return Err("duration must be between 0.5 and 600 seconds".to_string());
        }
        if !(1.0..=240.0).contains(&cli.target_fps) {
            return Err("fps must be between 1 and 240".to_string());
        }
        if !(1..=256).contains(&cli.stacks) {
            return Err("stacks must be between 1 and 256".to_string());
        }
        if !(1..=64).contains(&cli.tabs) {
            return Err("tabs must be between 1 and 64".to_string());
        }
        let (width, height) = cli
            .size
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<u16>().ok()?, h.parse::<u16>().ok()?)))
            .ok_or_else(|| format!("size must look like 160x48, got {:?}", cli.size))?;
        if width < 20 || height < 8 {
            return Err("size must be at least 20x8".to_string());
        }
        Ok(Self {
            duration: Duration::from_secs_f64(cli.duration_seconds),
            target_fps: cli.target_fps,
            frame_budget: Duration::from_secs_f64(1.0 / cli.target_fps),
            stacks: cli.stacks,
            tabs: cli.tabs,
            headless_area: Rect::new(0, 0, width, height),
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let mut manager = build_manager(&config)?;

    let stats = if args.headless {
        manager
            .init(config.headless_area)
            .map_err(io::Error::other)?;
        run_headless(&mut manager, &config)?
    } else {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        let bench_result = run_terminal(&mut terminal, &mut manager, &config);

        terminal.show_cursor()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;
        bench_result?
    };

    manager.destroy().map_err(io::Error::other)?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

fn build_manager(config: &BenchConfig) -> io::Result<LayoutManager> {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            "note",
            Box::new(|item: &ResolvedItemConfig| -> Box<dyn Component> {
                Box::new(NoteComponent::from_state(item.component_state.as_ref()))
            }),
        )
        .map_err(io::Error::other)?;
    let layout = LayoutConfig::from_json(&generated_layout(config.stacks, config.tabs).to_string())
        .map_err(io::Error::other)?;
    let mut manager = LayoutManager::new(registry).with_drag_listener(DragListener::new(1.0, None));
    manager.load_layout(&layout).map_err(io::Error::other)?;
    Ok(manager)
}

/// A row of columns, two stacks per column, `tabs` notes per stack.
fn generated_layout(stacks: usize, tabs: usize) -> Value {
    let stack = |index: usize| {
        let content: Vec<Value> = (0..tabs)
            .map(|tab| {
                json!({
                    "type": "component",
                    "componentType": "note",
                    "title": format!("s{index}.{tab}"),
                    "componentState": { "text": format!("stack {index}, tab {tab}") }
                })
            })
            .collect();
        json!({ "type": "stack", "content": content })
    };
    let columns: Vec<Value> = (0..stacks)
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|pair| {
            json!({
                "type": "column",
                "content": pair.iter().map(|&i| stack(i)).collect::<Vec<_>>()
            })
        })
        .collect();
    json!({
        "dimensions": {
            "borderWidth": 1,
            "borderGrabWidth": 1,
            "minItemHeight": 3,
            "minItemWidth": 8,
            "headerHeight": 1,
            "dragProxyWidth": 24,
            "dragProxyHeight": 6,
            "dockEdgeSize": 2,
            "controlButtonWidth": 2
        },
        "settings": { "tabControlOffset": 2 },
        "root": { "type": "row", "content": columns }
    })
}

type BenchTerminal = Terminal<CrosstermBackend<Stdout>>;

fn run_terminal(
    terminal: &mut BenchTerminal,
    manager: &mut LayoutManager,
    config: &BenchConfig,
) -> io::Result<BenchStats> {
    let size = terminal.size()?;
    manager
        .init(Rect::new(0, 0, size.width, size.height))
        .map_err(io::Error::other)?;

    let mut stats = BenchStats::new();
    let mut script = DragScript::default();
    let mut tick: u64 = 0;

    loop {
        let frame_start = Instant::now();
        step_layout(manager, &mut script, tick, &mut stats)?;

        let draw_start = Instant::now();
        let overlay = build_overlay_lines(&stats, config, manager);
        terminal.draw(|frame| {
            let area = frame.area();
            let mut ui = UiFrame::new(frame);
            manager.render(&mut ui);
            draw_overlay(&mut ui, area, &overlay);
        })?;
        stats.draw_time += draw_start.elapsed();
        stats.record_frame(frame_start.elapsed());

        if stats.elapsed() >= config.duration {
            break;
        }
        let spent = frame_start.elapsed();
        if poll_for_exit(config.frame_budget.saturating_sub(spent))? {
            stats.exit_reason = ExitReason::UserAbort;
            break;
        }
        tick = tick.wrapping_add(1);
    }

    stats.mark_completed();
    Ok(stats)
}

fn run_headless(manager: &mut LayoutManager, config: &BenchConfig) -> io::Result<BenchStats> {
    let area = config.headless_area;
    let mut buffer = Buffer::empty(area);
    let mut stats = BenchStats::new();
    let mut script = DragScript::default();
    let mut tick: u64 = 0;

    while stats.elapsed() < config.duration {
        let frame_start = Instant::now();
        step_layout(manager, &mut script, tick, &mut stats)?;

        let draw_start = Instant::now();
        buffer.reset();
        let mut ui = UiFrame::from_parts(area, &mut buffer);
        manager.render(&mut ui);
        stats.draw_time += draw_start.elapsed();
        stats.record_frame(frame_start.elapsed());
        tick = tick.wrapping_add(1);
    }

    stats.mark_completed();
    Ok(stats)
}

/// Scripted tab drag that re-docks one tab per cycle.
#[derive(Default)]
struct DragScript {
    pressed: bool,
}

fn step_layout(
    manager: &mut LayoutManager,
    script: &mut DragScript,
    tick: u64,
    stats: &mut BenchStats,
) -> io::Result<()> {
    let area = manager.area();
    let phase = tick % DRAG_CYCLE;
    let sweep = sweep_point(area, phase);

    let layout_start = Instant::now();
    if phase == 0 {
        if let Some((column, row)) = first_visible_tab(manager) {
            script.pressed = manager.pointer_down(column, row).map_err(io::Error::other)?;
        }
    } else if script.pressed && phase == DRAG_CYCLE - 1 {
        manager
            .pointer_up(sweep.0, sweep.1)
            .map_err(io::Error::other)?;
        script.pressed = false;
        stats.drops += 1;
    } else if script.pressed {
        manager
            .pointer_move(sweep.0, sweep.1)
            .map_err(io::Error::other)?;
    }
    stats.layout_time += layout_start.elapsed();

    let hit_start = Instant::now();
    let areas = drop_areas(manager.tree());
    if hit_test(&areas, Point::cell(sweep.0, sweep.1)).is_some() {
        stats.hits += 1;
    }
    stats.hit_tests += 1;
    stats.hit_time += hit_start.elapsed();

    if tick > 0 && tick % ROUND_TRIP_EVERY == 0 && !manager.is_dragging() {
        let trip_start = Instant::now();
        let saved = manager.save_layout().map_err(io::Error::other)?;
        manager.load_resolved(saved).map_err(io::Error::other)?;
        stats.round_trip_time += trip_start.elapsed();
        stats.round_trips += 1;
    }
    Ok(())
}

/// Diagonal sweep across the area, one step per tick.
fn sweep_point(area: Rect, phase: u64) -> (u16, u16) {
    let span = (DRAG_CYCLE - 1) as f64;
    let t = phase as f64 / span;
    let column = area.x as f64 + t * area.width.saturating_sub(1) as f64;
    let row = area.y as f64 + t * area.height.saturating_sub(1) as f64;
    (column.round() as u16, row.round() as u16)
}

fn first_visible_tab(manager: &LayoutManager) -> Option<(u16, u16)> {
    let tree = manager.tree();
    tree.stacks().into_iter().find_map(|stack| {
        let tab = tree
            .get(stack)?
            .stack()?
            .header()
            .tabs()
            .iter()
            .find(|tab| !tab.in_dropdown && tab.rect.width > 0)?;
        Some((tab.rect.x, tab.rect.y))
    })
}

fn draw_overlay(ui: &mut UiFrame<'_>, area: Rect, lines: &[String]) {
    let width = lines
        .iter()
        .map(|line| line.len() as u16)
        .max()
        .unwrap_or(0)
        .saturating_add(2);
    let height = (lines.len() as u16).saturating_add(2);
    if area.width < width.saturating_add(2) || area.height < height.saturating_add(2) {
        return;
    }
    let rect = Rect {
        x: area.right() - width - 1,
        y: area.bottom() - height - 1,
        width,
        height,
    };
    ui.render_widget(Clear, rect);
    ui.render_widget(
        Paragraph::new(lines.join("\n")).style(Style::default().fg(Color::White).bg(Color::Black)),
        rect,
    );
}

fn build_overlay_lines(stats: &BenchStats, config: &BenchConfig, manager: &LayoutManager) -> Vec<String> {
    let elapsed = stats.elapsed().as_secs_f64();
    let duration_target = config.duration.as_secs_f64();
    let progress = if duration_target > 0.0 {
        (elapsed / duration_target).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let fps_avg = if elapsed > 0.0 {
        stats.frame_count as f64 / elapsed
    } else {
        0.0
    };

    vec![
        "== Dock Bench ==".to_string(),
        format!(
            "elapsed {:>5.1}/{:>5.1}s ({:>3.0}%)",
            elapsed,
            duration_target,
            progress * 100.0
        ),
        format!(
            "frames {:>8} | avg fps {:>5.1} / target {:>5.1}",
            stats.frame_count, fps_avg, config.target_fps
        ),
        format!(
            "items {:>5} | drops {:>6} | reloads {:>4}",
            manager.tree().len(),
            stats.drops,
            stats.round_trips
        ),
        format!(
            "layout ms {:>6.3} | hit ms {:>6.3} | draw ms {:>6.3}",
            stats.per_frame_ms(stats.layout_time),
            stats.per_frame_ms(stats.hit_time),
            stats.per_frame_ms(stats.draw_time)
        ),
        "press q / esc / ctrl+c to stop".to_string(),
    ]
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    frame_count: u64,
    total_frame_time: Duration,
    fastest_frame: Duration,
    slowest_frame: Duration,
    layout_time: Duration,
    hit_time: Duration,
    draw_time: Duration,
    round_trip_time: Duration,
    hit_tests: u64,
    hits: u64,
    drops: u64,
    round_trips: u64,
    exit_reason: ExitReason,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            frame_count: 0,
            total_frame_time: Duration::ZERO,
            fastest_frame: Duration::MAX,
            slowest_frame: Duration::ZERO,
            layout_time: Duration::ZERO,
            hit_time: Duration::ZERO,
            draw_time: Duration::ZERO,
            round_trip_time: Duration::ZERO,
            hit_tests: 0,
            hits: 0,
            drops: 0,
            round_trips: 0,
            exit_reason: ExitReason::Completed,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_frame(&mut self, frame_time: Duration) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.total_frame_time += frame_time;
        self.fastest_frame = self.fastest_frame.min(frame_time);
        self.slowest_frame = self.slowest_frame.max(frame_time);
    }

    fn per_frame_ms(&self, total: Duration) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        (total.as_secs_f64() / self.frame_count as f64) * 1_000.0
    }

    fn fastest_frame_ms(&self) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        self.fastest_frame.as_secs_f64() * 1_000.0
    }

    fn slowest_frame_ms(&self) -> f64 {
        self.slowest_frame.as_secs_f64() * 1_000.0
    }

    fn round_trip_ms(&self) -> f64 {
        if self.round_trips == 0 {
            return 0.0;
        }
        (self.round_trip_time.as_secs_f64() / self.round_trips as f64) * 1_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let fps_avg = if elapsed > 0.0 {
            self.frame_count as f64 / elapsed
        } else {
            0.0
        };

        indoc::formatdoc!(
            r#"
            Dock bench {status}.
            Layout: {stacks} stacks x {tabs} tabs
            Duration: {elapsed:.2}s (target {target:.2}s)
            Frames: {frames} | Avg FPS: {fps:.1}
            Avg frame: {avg:.3} ms | Best: {best:.3} ms | Worst: {worst:.3} ms
            Per frame: layout {layout:.3} ms | hit-test {hit:.3} ms | draw {draw:.3} ms
            Drops: {drops} | Hit tests: {hit_tests} ({hits} over a target)
            Save/load round trips: {trips} (avg {trip:.3} ms)
            "#,
            status = self.exit_reason.describe(),
            stacks = config.stacks,
            tabs = config.tabs,
            elapsed = elapsed,
            target = config.duration.as_secs_f64(),
            frames = self.frame_count,
            fps = fps_avg,
            avg = self.per_frame_ms(self.total_frame_time),
            best = self.fastest_frame_ms(),
            worst = self.slowest_frame_ms(),
            layout = self.per_frame_ms(self.layout_time),
            hit = self.per_frame_ms(self.hit_time),
            draw = self.per_frame_ms(self.draw_time),
            drops = self.drops,
            hit_tests = self.hit_tests,
            hits = self.hits,
            trips = self.round_trips,
            trip = self.round_trip_ms(),
        )
    }
}

#[derive(Copy, Clone)]
enum ExitReason {
    Completed,
    UserAbort,
}

impl ExitReason {
    fn describe(self) -> &'static str {
        match self {
            ExitReason::Completed => "completed full duration",
            ExitReason::UserAbort => "stopped by user",
        }
    }
}

fn poll_for_exit(wait: Duration) -> io::Result<bool> {
    if !event::poll(wait)? {
        return Ok(false);
    }
    loop {
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if matches!(
                key.code,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
            ) {
                return Ok(true);
            }
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(true);
            }
        }
        if !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(false)
}
