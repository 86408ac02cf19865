//! Drawing.
//!
//! [`Renderer`] turns a [`Snapshot`] into pixels on any `Rgb565`
//! [`DrawTarget`]. It remembers what is on the panel so that a full-screen
//! clear only happens when the screen actually changes (new state group or
//! new map); during play it repaints just the cells under the previous ball
//! position.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        MonoTextStyleBuilder,
        ascii::FONT_6X10,
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        Circle,
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Alignment,
        Text,
    },
};
use heapless::String;

use crate::{
    clock::ClockTime,
    config::{
        Geometry,
        SCREEN_H,
        SCREEN_W,
    },
    error::StartupError,
    maze::{
        self,
        Cell,
        MAZE_HEIGHT,
        MAZE_WIDTH,
        Maze,
    },
    shared::Snapshot,
    state::GameState,
};

const WALL: Rgb565 = Rgb565::new(16, 32, 16);
const FLOOR: Rgb565 = Rgb565::WHITE;
const HOLE: Rgb565 = Rgb565::BLACK;
const GOAL: Rgb565 = Rgb565::GREEN;
const BALL: Rgb565 = Rgb565::RED;
const BG: Rgb565 = Rgb565::BLACK;

const CENTER_X: i32 = SCREEN_W / 2;
const CENTER_Y: i32 = SCREEN_H / 2;

/// Baseline of the clock overlay in the side panel.
const CLOCK_Y: i32 = 16;
const LIVES_Y: i32 = 40;
const TIME_Y: i32 = 56;
const BEST_Y: i32 = 72;
const MAP_Y: i32 = 96;
const STATUS_Y: i32 = 120;

/// What currently fills the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu(usize),
    Board(usize),
    Paused,
    Won,
    GameOver,
}

impl Screen {
    fn of(snap: &Snapshot) -> Option<Self> {
        match snap.state {
            state if state.shows_maze() => Some(Screen::Board(snap.map)),
            GameState::SelectMap => Some(Screen::Menu(snap.map)),
            GameState::Paused => Some(Screen::Paused),
            GameState::Won => Some(Screen::Won),
            GameState::GameOver => Some(Screen::GameOver),
            _ => None,
        }
    }
}

pub struct Renderer {
    geo: Geometry,
    maze: Maze,
    drawn: Option<Screen>,
    last_ball: Option<(f32, f32)>,
}

impl Renderer {
    pub fn new(geo: Geometry) -> Self {
        Self {
            geo,
            maze: Maze::load(0),
            drawn: None,
            last_ball: None,
        }
    }

    /// Forgets what is on the panel; the next frame starts with a full redraw.
    pub fn invalidate(&mut self) {
        self.drawn = None;
        self.last_ball = None;
    }

    /// Draws one frame for `snap`.
    pub fn render<D>(&mut self, d: &mut D, snap: &Snapshot, clock: &ClockTime) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        // Init lasts a single logic tick; keep whatever is on screen.
        let Some(screen) = Screen::of(snap) else {
            return Ok(());
        };

        if self.drawn != Some(screen) {
            debug!("full redraw for {}", snap.state);
            d.clear(BG)?;
            self.last_ball = None;
            match screen {
                Screen::Menu(map) => draw_menu(d, map)?,
                Screen::Board(map) => {
                    self.maze = Maze::load(map);
                    self.draw_maze(d)?;
                }
                Screen::Paused => draw_banner(d, "PAUSED", Rgb565::YELLOW)?,
                Screen::Won => draw_won(d, snap)?,
                Screen::GameOver => draw_game_over(d, snap)?,
            }
            draw_clock(d, &self.geo, clock)?;
            self.drawn = Some(screen);
        }

        if let Screen::Board(_) = screen {
            if let Some((x, y)) = self.last_ball {
                self.repaint_under(d, x, y)?;
            }
            self.draw_ball(d, snap.ball_x, snap.ball_y)?;
            self.last_ball = Some((snap.ball_x, snap.ball_y));
            self.draw_hud(d, snap)?;
        }
        Ok(())
    }

    fn cell_rect(&self, col: i32, row: i32) -> Rectangle {
        let size = self.geo.cell_size as i32;
        Rectangle::new(
            Point::new(
                self.geo.offset_x as i32 + col * size,
                self.geo.offset_y as i32 + row * size,
            ),
            Size::new(size as u32, size as u32),
        )
    }

    fn draw_cell<D>(&self, d: &mut D, col: i32, row: i32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let color = match self.maze.cell(col, row) {
            Cell::Empty => FLOOR,
            Cell::Wall => WALL,
            Cell::Hole => HOLE,
            Cell::Goal => GOAL,
        };
        d.fill_solid(&self.cell_rect(col, row), color)
    }

    fn draw_maze<D>(&self, d: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        for row in 0..MAZE_HEIGHT as i32 {
            for col in 0..MAZE_WIDTH as i32 {
                self.draw_cell(d, col, row)?;
            }
        }
        Ok(())
    }

    /// Restores the cells a ball drawn at `(x, y)` may have covered.
    fn repaint_under<D>(&self, d: &mut D, x: f32, y: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let r = self.geo.ball_radius + 1.0;
        let last = MAZE_WIDTH as i32 - 1;
        let col0 = self.geo.cell_index(x - r, self.geo.offset_x).clamp(0, last);
        let col1 = self.geo.cell_index(x + r, self.geo.offset_x).clamp(0, last);
        let last = MAZE_HEIGHT as i32 - 1;
        let row0 = self.geo.cell_index(y - r, self.geo.offset_y).clamp(0, last);
        let row1 = self.geo.cell_index(y + r, self.geo.offset_y).clamp(0, last);
        for row in row0..=row1 {
            for col in col0..=col1 {
                self.draw_cell(d, col, row)?;
            }
        }
        Ok(())
    }

    fn draw_ball<D>(&self, d: &mut D, x: f32, y: f32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let r = self.geo.ball_radius as i32;
        Circle::with_center(Point::new(x as i32, y as i32), (2 * r + 1) as u32)
            .into_styled(PrimitiveStyle::with_fill(BALL))
            .draw(d)
    }

    fn draw_hud<D>(&self, d: &mut D, snap: &Snapshot) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let x = self.geo.panel_x;
        let mut line: String<24> = String::new();

        let _ = write!(line, "LIVES:{:<2}", snap.lives);
        panel_text(d, &line, Point::new(x, LIVES_Y), Rgb565::WHITE)?;

        line.clear();
        let _ = write!(line, "T:{:02}.{:03}  ", snap.game_time_ms / 1000, snap.game_time_ms % 1000);
        panel_text(d, &line, Point::new(x, TIME_Y), Rgb565::CYAN)?;

        if let Some(best) = snap.best_time_ms {
            line.clear();
            let _ = write!(line, "B:{:02}.{:03}  ", best / 1000, best % 1000);
            panel_text(d, &line, Point::new(x, BEST_Y), Rgb565::YELLOW)?;
        }

        panel_text(d, maze::map(snap.map).name, Point::new(x, MAP_Y), Rgb565::WHITE)?;

        let status = match snap.state {
            GameState::Ready => "READY  ",
            GameState::LostLife => "OUCH!  ",
            _ => "       ",
        };
        panel_text(d, status, Point::new(x, STATUS_Y), Rgb565::RED)
    }
}

/// Text that paints its own background, so it overwrites the previous value.
fn panel_text<D>(d: &mut D, text: &str, at: Point, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(color)
        .background_color(BG)
        .build();
    Text::new(text, at, style).draw(d)?;
    Ok(())
}

fn centered<D>(d: &mut D, text: &str, y: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = MonoTextStyle::new(&FONT_6X10, color);
    Text::with_alignment(text, Point::new(CENTER_X, y), style, Alignment::Center).draw(d)?;
    Ok(())
}

fn seconds_line(label: &str, ms: u32) -> String<24> {
    let mut line = String::new();
    let _ = write!(line, "{label}: {}.{:03} s", ms / 1000, ms % 1000);
    line
}

/// The wall clock overlay, `HH:MM:SS` in the side panel.
pub fn draw_clock<D>(d: &mut D, geo: &Geometry, time: &ClockTime) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut line: String<8> = String::new();
    let _ = write!(line, "{time}");
    panel_text(d, &line, Point::new(geo.panel_x, CLOCK_Y), Rgb565::YELLOW)
}

fn draw_menu<D>(d: &mut D, map: usize) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut name: String<24> = String::new();
    let _ = write!(name, "< {} >", maze::map(map).name);
    centered(d, "SELECT MAP", CENTER_Y - 40, Rgb565::WHITE)?;
    centered(d, &name, CENTER_Y, Rgb565::YELLOW)?;
    centered(d, "Tilt left/right to choose", CENTER_Y + 40, Rgb565::CYAN)?;
    centered(d, "Tilt down to confirm", CENTER_Y + 52, Rgb565::CYAN)
}

fn draw_banner<D>(d: &mut D, text: &str, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    centered(d, text, CENTER_Y, color)
}

fn draw_won<D>(d: &mut D, snap: &Snapshot) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    centered(d, "YOU WIN!", CENTER_Y - 30, Rgb565::GREEN)?;
    centered(d, &seconds_line("TIME", snap.game_time_ms), CENTER_Y, Rgb565::WHITE)?;
    if let Some(best) = snap.best_time_ms {
        centered(d, &seconds_line("BEST", best), CENTER_Y + 14, Rgb565::YELLOW)?;
    }
    centered(d, "Press A to restart", CENTER_Y + 44, Rgb565::CYAN)
}

fn draw_game_over<D>(d: &mut D, snap: &Snapshot) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    centered(d, "GAME OVER", CENTER_Y - 30, Rgb565::RED)?;
    centered(d, &seconds_line("TIME", snap.game_time_ms), CENTER_Y, Rgb565::WHITE)?;
    centered(d, "Press A to restart", CENTER_Y + 44, Rgb565::YELLOW)
}

pub fn draw_splash<D>(d: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    d.clear(BG)?;
    centered(d, "TILT MAZE", CENTER_Y - 10, Rgb565::CYAN)?;
    centered(d, "Starting...", CENTER_Y + 10, Rgb565::WHITE)
}

pub fn draw_calibrating<D>(d: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    d.clear(BG)?;
    centered(d, "CALIBRATING", CENTER_Y - 10, Rgb565::YELLOW)?;
    centered(d, "Hold still", CENTER_Y + 10, Rgb565::WHITE)
}

pub fn draw_calibrated<D>(d: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    d.clear(Rgb565::GREEN)?;
    centered(d, "OK!", CENTER_Y, Rgb565::BLACK)
}

pub fn draw_startup_failure<D>(d: &mut D, err: StartupError) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    d.clear(Rgb565::RED)?;
    centered(d, "STARTUP FAILED", CENTER_Y - 10, Rgb565::WHITE)?;
    centered(d, err.banner(), CENTER_Y + 10, Rgb565::WHITE)
}
