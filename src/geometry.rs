//! Maze coordinates and compass directions.
//!
//! `y` grows northwards: `North` is `(0, +1)`.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.delta();
        Coord {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Enumeration order used wherever ties are broken.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }

    /// The two drift directions for a move, in the order the transition
    /// model stores them.
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::North | Direction::South => [Direction::East, Direction::West],
            Direction::East | Direction::West => [Direction::North, Direction::South],
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_round_trips_through_from_delta() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(1, 1), None);
        assert_eq!(Direction::from_delta(0, 0), None);
    }

    #[test]
    fn perpendicular_pairs() {
        assert_eq!(
            Direction::North.perpendicular(),
            [Direction::East, Direction::West]
        );
        assert_eq!(
            Direction::South.perpendicular(),
            [Direction::East, Direction::West]
        );
        assert_eq!(
            Direction::East.perpendicular(),
            [Direction::North, Direction::South]
        );
        assert_eq!(
            Direction::West.perpendicular(),
            [Direction::North, Direction::South]
        );
    }

    #[test]
    fn north_increases_y() {
        let c = Coord::new(2, 2);
        assert_eq!(c.step(Direction::North), Coord::new(2, 3));
        assert_eq!(c.step(Direction::West), Coord::new(1, 2));
        assert_eq!(c.step(Direction::East).manhattan(c), 1);
    }
}
