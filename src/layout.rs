//! Text maze layouts.
//!
//! `%` wall, `.` food, `o` capsule, `P` agent start, `G` ghost start, space
//! empty. The first line of the text is the northern edge of the maze.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::geometry::Coord;

pub const SMALL: &str = include_str!("../layouts/small.lay");
pub const MEDIUM: &str = include_str!("../layouts/medium.lay");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Empty,
    Food,
    Capsule,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,
    #[error("line {line} has {found} columns, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {ch:?} at line {line}, column {column}")]
    UnknownTile {
        ch: char,
        line: usize,
        column: usize,
    },
    #[error("layout has no agent start")]
    MissingAgent,
    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct Layout {
    width: i32,
    height: i32,
    /// Indexed `[y][x]`, `y = 0` is the southern edge.
    tiles: Vec<Vec<Tile>>,
    pub agent_start: Coord,
    pub ghost_starts: Vec<Coord>,
}

impl Layout {
    pub fn small() -> Result<Self, LayoutError> {
        SMALL.parse()
    }

    pub fn medium() -> Result<Self, LayoutError> {
        MEDIUM.parse()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile(&self, c: Coord) -> Tile {
        if c.x < 0 || c.y < 0 || c.x >= self.width || c.y >= self.height {
            return Tile::Wall;
        }
        self.tiles[c.y as usize][c.x as usize]
    }

    pub(crate) fn tiles(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    pub fn cells_with(&self, tile: Tile) -> Vec<Coord> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let c = Coord::new(x, y);
                if self.tile(c) == tile {
                    cells.push(c);
                }
            }
        }
        cells
    }
}

impl std::str::FromStr for Layout {
    type Err = LayoutError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .collect();
        let expected = lines.first().ok_or(LayoutError::Empty)?.chars().count();
        let height = lines.len() as i32;

        let mut rows = Vec::with_capacity(lines.len());
        let mut agent_start = None;
        let mut ghost_starts = Vec::new();
        for (line, text) in lines.iter().enumerate() {
            let found = text.chars().count();
            if found != expected {
                return Err(LayoutError::Ragged {
                    line: line + 1,
                    expected,
                    found,
                });
            }
            let y = height - 1 - line as i32;
            let mut row = Vec::with_capacity(expected);
            for (column, ch) in text.chars().enumerate() {
                let here = Coord::new(column as i32, y);
                let tile = match ch {
                    '%' => Tile::Wall,
                    '.' => Tile::Food,
                    'o' => Tile::Capsule,
                    ' ' => Tile::Empty,
                    'P' => {
                        agent_start = Some(here);
                        Tile::Empty
                    }
                    'G' => {
                        ghost_starts.push(here);
                        Tile::Empty
                    }
                    _ => {
                        return Err(LayoutError::UnknownTile {
                            ch,
                            line: line + 1,
                            column: column + 1,
                        })
                    }
                };
                row.push(tile);
            }
            rows.push(row);
        }
        rows.reverse();

        Ok(Layout {
            width: expected as i32,
            height,
            tiles: rows,
            agent_start: agent_start.ok_or(LayoutError::MissingAgent)?,
            ghost_starts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_layouts_parse() {
        let small = Layout::small().unwrap();
        assert_eq!((small.width(), small.height()), (7, 7));
        assert_eq!(small.agent_start, Coord::new(2, 1));
        assert_eq!(small.ghost_starts, vec![Coord::new(4, 5)]);
        assert_eq!(small.cells_with(Tile::Capsule), vec![Coord::new(3, 3)]);
        assert_eq!(small.cells_with(Tile::Food).len(), 11);

        let medium = Layout::medium().unwrap();
        assert_eq!((medium.width(), medium.height()), (20, 11));
        assert_eq!(medium.ghost_starts.len(), 2);
        assert_eq!(medium.cells_with(Tile::Capsule).len(), 2);
    }

    #[test]
    fn first_line_is_north() {
        let layout: Layout = "%%%\n%P%\n%.%\n%%%".parse().unwrap();
        assert_eq!(layout.agent_start, Coord::new(1, 2));
        assert_eq!(layout.tile(Coord::new(1, 1)), Tile::Food);
        assert_eq!(layout.tile(Coord::new(1, 3)), Tile::Wall);
        assert_eq!(layout.tile(Coord::new(-1, 0)), Tile::Wall);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!("".parse::<Layout>(), Err(LayoutError::Empty)));
        assert!(matches!(
            "%%%\n%P\n%%%".parse::<Layout>(),
            Err(LayoutError::Ragged {
                line: 2,
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            "%%%\n%P#\n%%%".parse::<Layout>(),
            Err(LayoutError::UnknownTile {
                ch: '#',
                line: 2,
                column: 3
            })
        ));
        assert!(matches!(
            "%%%\n%.%\n%%%".parse::<Layout>(),
            Err(LayoutError::MissingAgent)
        ));
    }
}
