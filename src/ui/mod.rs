use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tracing::info;

use crate::{
    config,
    core::Bacterium,
    render::{self, Layer},
    types::{Facing, InputFlags, Rgb},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub fn flags_from(directions: &[Direction]) -> InputFlags {
    let mut flags = InputFlags::NONE;
    for direction in directions {
        match direction {
            Direction::Up => flags.up = true,
            Direction::Down => flags.down = true,
            Direction::Left => flags.left = true,
            Direction::Right => flags.right = true,
        }
    }
    flags
}

/// Terminals report presses and auto-repeats but usually no releases, so a
/// direction counts as held until `hold` passes without another event.
#[derive(Debug)]
pub struct KeyLatch {
    hold: Duration,
    last_seen: [Option<Instant>; 4],
}

impl KeyLatch {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            last_seen: [None; 4],
        }
    }

    pub fn press(&mut self, direction: Direction, now: Instant) {
        self.last_seen[direction as usize] = Some(now);
    }

    pub fn release(&mut self, direction: Direction) {
        self.last_seen[direction as usize] = None;
    }

    pub fn flags(&self, now: Instant) -> InputFlags {
        let held = |direction: Direction| {
            self.last_seen[direction as usize]
                .is_some_and(|seen| now.saturating_duration_since(seen) <= self.hold)
        };
        InputFlags {
            up: held(Direction::Up),
            down: held(Direction::Down),
            left: held(Direction::Left),
            right: held(Direction::Right),
        }
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

pub fn run(bacterium: Bacterium) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = session(&mut terminal, bacterium);
    shutdown_terminal(&mut terminal)?;
    result
}

fn session(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut bacterium: Bacterium,
) -> io::Result<()> {
    let arena = bacterium.kinematics.arena();
    let mut framebuf = render::FrameBuffer::new(0, 0);
    let mut latch = KeyLatch::new(Duration::from_millis(config::KEY_HOLD_MS));

    let mut accumulator = 0.0_f32;
    let mut last_tick = Instant::now();
    let mut last_render = Instant::now();
    let render_interval = Duration::from_secs_f32(1.0 / config::RENDER_HZ);
    let mut sim_counter = 0_u32;
    let mut last_fps_sample = Instant::now();
    let mut sim_fps = 0.0_f32;

    loop {
        while event::poll(Duration::from_millis(0))? {
            if let CrosstermEvent::Key(KeyEvent { code, kind, .. }) = event::read()? {
                if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                    info!(ticks = bacterium.ticks(), "session ended");
                    return Ok(());
                }
                if let Some(direction) = direction_for(code) {
                    match kind {
                        KeyEventKind::Release => latch.release(direction),
                        KeyEventKind::Press | KeyEventKind::Repeat => {
                            latch.press(direction, Instant::now())
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        accumulator += (now - last_tick).as_secs_f32();
        last_tick = now;
        let input = latch.flags(now);
        while accumulator >= config::DT {
            bacterium.tick(input);
            accumulator -= config::DT;
            sim_counter += 1;
        }

        if last_render.elapsed() >= render_interval {
            if last_fps_sample.elapsed() >= Duration::from_secs(1) {
                sim_fps = sim_counter as f32 / last_fps_sample.elapsed().as_secs_f32();
                sim_counter = 0;
                last_fps_sample = Instant::now();
            }
            let snapshot = bacterium.snapshot();
            let stats = bacterium.phenotype;
            terminal.draw(|frame| {
                let size = frame.size();
                let chunks = Layout::default()
                    .direction(LayoutDirection::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(3),
                        Constraint::Length(3),
                    ])
                    .split(size);

                let header = Paragraph::new(format!(
                    "body: {}x{} | speed: {:.3} | defense: {:.3} | hp: {:.0} | attack: {:.1}",
                    stats.width, stats.height, stats.speed, stats.defense, stats.max_hp, stats.attack
                ))
                .block(Block::default().borders(Borders::ALL).title("bacteria"));
                frame.render_widget(header, chunks[0]);

                let inner = Block::default().borders(Borders::ALL).title("Arena");
                let area = inner.inner(chunks[1]);
                render::draw(
                    &snapshot,
                    arena,
                    render::Viewport {
                        width: area.width,
                        height: area.height,
                    },
                    &mut framebuf,
                );
                let lines: Vec<Line> = (0..framebuf.height())
                    .map(|y| {
                        let spans: Vec<Span> = (0..framebuf.width())
                            .map(|x| {
                                let cell = framebuf.get(x, y);
                                if cell.layer == Layer::Empty {
                                    Span::raw(" ")
                                } else {
                                    Span::styled(
                                        cell.ch.to_string(),
                                        Style::default().fg(color_for(cell.color)),
                                    )
                                }
                            })
                            .collect();
                        Line::from(spans)
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines).block(inner), chunks[1]);

                let facing = match snapshot.facing {
                    Facing::Left => "left",
                    Facing::Right => "right",
                };
                let footer = Paragraph::new(format!(
                    "pos: ({:.1}, {:.1}) | vel: ({:.2}, {:.2}) |v|: {:.2} | facing: {} | sim fps: {:.1} | WASD/arrows: swim | q: quit",
                    snapshot.pos.x,
                    snapshot.pos.y,
                    snapshot.vel.x,
                    snapshot.vel.y,
                    snapshot.vel.length(),
                    facing,
                    sim_fps
                ))
                .block(Block::default().borders(Borders::ALL).title("Controls"));
                frame.render_widget(footer, chunks[2]);
            })?;

            last_render = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn shutdown_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn color_for(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
