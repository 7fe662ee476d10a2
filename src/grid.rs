//! Static maze geometry: the bounded rectangle, its walls, and adjacency with
//! wall bounce-back.

use std::collections::HashSet;

use crate::geometry::{Coord, Direction};

#[derive(Clone, Debug)]
pub struct Grid {
    max_w: i32,
    max_h: i32,
    walls: HashSet<Coord>,
}

/// One adjacent coordinate per direction. A direction blocked by a wall maps
/// back onto the cell itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbours {
    cells: [Coord; 4],
}

impl Neighbours {
    pub fn get(&self, dir: Direction) -> Coord {
        self.cells[dir.index()]
    }

    /// Pairs in `Direction::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Coord)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

impl Grid {
    /// Builds the grid from the maze's corner coordinates. The bound is the
    /// largest x and y seen among the corners, exclusive.
    pub fn from_corners<C, W>(corners: C, walls: W) -> Self
    where
        C: IntoIterator<Item = Coord>,
        W: IntoIterator<Item = Coord>,
    {
        let mut max_w = -1;
        let mut max_h = -1;
        for c in corners {
            max_w = max_w.max(c.x);
            max_h = max_h.max(c.y);
        }
        Self {
            max_w,
            max_h,
            walls: walls.into_iter().collect(),
        }
    }

    pub fn max_w(&self) -> i32 {
        self.max_w
    }

    pub fn max_h(&self) -> i32 {
        self.max_h
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.max_w, self.max_h)
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.max_w && c.y < self.max_h
    }

    pub fn is_wall(&self, c: Coord) -> bool {
        self.walls.contains(&c)
    }

    pub fn is_open(&self, c: Coord) -> bool {
        self.contains(c) && !self.is_wall(c)
    }

    /// Every traversable coordinate, x-major then y. Value iteration sweeps
    /// in this order.
    pub fn open_cells(&self) -> Vec<Coord> {
        let mut cells = Vec::new();
        for x in 0..self.max_w.max(0) {
            for y in 0..self.max_h.max(0) {
                let c = Coord::new(x, y);
                if !self.is_wall(c) {
                    cells.push(c);
                }
            }
        }
        cells
    }

    pub fn neighbours(&self, c: Coord) -> Neighbours {
        let mut cells = [c; 4];
        for dir in Direction::ALL {
            let next = c.step(dir);
            if !self.is_wall(next) {
                cells[dir.index()] = next;
            }
        }
        Neighbours { cells }
    }

    /// Inner corners that are traversable and still hold food.
    pub fn reachable_corners(&self, food: &HashSet<Coord>) -> Vec<Coord> {
        let (w, h) = (self.max_w, self.max_h);
        [
            Coord::new(1, 1),
            Coord::new(w - 1, 1),
            Coord::new(1, h - 1),
            Coord::new(w - 1, h - 1),
        ]
        .into_iter()
        .filter(|c| !self.is_wall(*c) && food.contains(c))
        .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A `size` x `size` maze whose outermost ring is wall, with `extra`
    /// interior walls. Corners are reported the way the host does:
    /// `(0,0)`..`(size-1,size-1)`.
    pub(crate) fn boxed_grid(size: i32, extra: &[(i32, i32)]) -> Grid {
        let mut walls = Vec::new();
        for i in 0..size {
            walls.push(Coord::new(i, 0));
            walls.push(Coord::new(i, size - 1));
            walls.push(Coord::new(0, i));
            walls.push(Coord::new(size - 1, i));
        }
        walls.extend(extra.iter().map(|&p| Coord::from(p)));
        let corners = [
            Coord::new(0, 0),
            Coord::new(size - 1, 0),
            Coord::new(0, size - 1),
            Coord::new(size - 1, size - 1),
        ];
        Grid::from_corners(corners, walls)
    }

    #[test]
    fn dimensions_come_from_corners() {
        let grid = boxed_grid(7, &[]);
        assert_eq!(grid.dimensions(), (6, 6));
        assert!(grid.contains(Coord::new(5, 5)));
        assert!(!grid.contains(Coord::new(6, 0)));
    }

    #[test]
    fn open_cells_exclude_walls() {
        let grid = boxed_grid(7, &[(2, 2)]);
        let open = grid.open_cells();
        assert_eq!(open.len(), 5 * 5 - 1);
        assert!(open.iter().all(|c| !grid.is_wall(*c)));
        assert!(!open.contains(&Coord::new(2, 2)));
        assert_eq!(open.first(), Some(&Coord::new(1, 1)));
    }

    #[test]
    fn wall_bounces_back_to_self() {
        let grid = boxed_grid(7, &[(2, 2)]);
        let at = Coord::new(1, 2);
        let n = grid.neighbours(at);
        assert_eq!(n.get(Direction::East), at);
        assert_eq!(n.get(Direction::West), at);
        assert_eq!(n.get(Direction::North), Coord::new(1, 3));
        assert_eq!(n.get(Direction::South), Coord::new(1, 1));

        for c in grid.open_cells() {
            for (dir, next) in grid.neighbours(c).iter() {
                if grid.is_wall(c.step(dir)) {
                    assert_eq!(next, c);
                } else {
                    assert_eq!(next, c.step(dir));
                }
            }
        }
    }

    #[test]
    fn corners_need_food() {
        let grid = boxed_grid(7, &[(5, 5)]);
        let food: HashSet<Coord> = [Coord::new(1, 1), Coord::new(5, 5), Coord::new(5, 1)]
            .into_iter()
            .collect();
        let corners = grid.reachable_corners(&food);
        assert_eq!(corners, vec![Coord::new(1, 1), Coord::new(5, 1)]);
    }
}
