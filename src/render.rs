//! Differential terminal renderer for [`Game`].

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::game::{Game, Outcome};
use crate::geometry::Coord;
use crate::layout::Tile;

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Wall,
    Empty,
    Food,
    Capsule,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (width.max(0) * height.max(0)) as usize;
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                cells
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces the next frame to redraw every cell, e.g. after a new game.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render<W: Write>(&mut self, out: &mut W, game: &Game, round: u32) -> io::Result<()> {
        let (width, height) = (game.width() as usize, game.height() as usize);
        let needed_h = (height + 2) as u16;
        let needed_w = (width * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != width * height {
            *self = Renderer::new(game.width(), game.height());
            self.origin_x = origin_x;
            self.origin_y = origin_y;
        }

        let hud = format!(
            "Game: {}  Score: {}  Food: {}  Tick: {}  (q to quit)",
            round,
            game.score(),
            game.food_left(),
            game.ticks()
        );
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        // Screen rows run top-down; maze rows run south to north.
        for row in 0..height {
            for x in 0..width {
                let pos = Coord::new(x as i32, (height - 1 - row) as i32);
                let cell = cell_for(game, pos);
                let idx = row * width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, row, cell)?;
                }
            }
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, row: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "😃",
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Food => "· ",
            Glyph::Capsule => "● ",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + row as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                out.queue(Print(' '))?;
            }
        }
        out.queue(ResetColor)?;
        Ok(())
    }

    /// Writes the result line under the maze.
    pub fn render_outcome<W: Write>(&self, out: &mut W, game: &Game) -> io::Result<()> {
        let verdict = match game.outcome() {
            Some(Outcome::Won) => "WON",
            Some(Outcome::Lost) => "LOST",
            Some(Outcome::TimedOut) => "TIMED OUT",
            None => return Ok(()),
        };
        out.queue(MoveTo(self.origin_x, self.origin_y + game.height() as u16))?;
        out.queue(Clear(ClearType::CurrentLine))?;
        out.queue(Print(format!(
            "{} - Final Score: {} after {} ticks",
            verdict,
            game.score(),
            game.ticks()
        )))?;
        out.flush()
    }
}

fn cell_for(game: &Game, pos: Coord) -> Cell {
    if pos == game.player() {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    match game.ghost_at(pos) {
        Some(true) => {
            return Cell {
                glyph: Glyph::Frightened,
                color: Color::Blue,
            }
        }
        Some(false) => {
            return Cell {
                glyph: Glyph::Ghost,
                color: Color::Red,
            }
        }
        None => {}
    }
    match game.tile(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Tile::Empty => Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        },
        Tile::Food => Cell {
            glyph: Glyph::Food,
            color: Color::White,
        },
        Tile::Capsule => Cell {
            glyph: Glyph::Capsule,
            color: Color::Magenta,
        },
    }
}
