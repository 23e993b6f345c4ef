//! The rectangular board a search runs on.

use serde::{Deserialize, Serialize};

/// An axis-aligned blocked rectangle, `width x height` cells from `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WallRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the cell lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Grid dimensions plus blocked cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    walls: Vec<WallRect>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walls: Vec::new(),
        }
    }

    pub fn with_walls(mut self, walls: Vec<WallRect>) -> Self {
        self.walls = walls;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn walls(&self) -> &[WallRect] {
        &self.walls
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.walls.iter().any(|wall| wall.contains(x, y))
    }

    /// In bounds and not blocked.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && !self.is_wall(x, y)
    }

    /// Returns true if `y` is the goal row.
    pub fn is_last_row(&self, y: i32) -> bool {
        y == self.height - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_contains_half_open() {
        let wall = WallRect::new(2, 3, 4, 1);
        assert!(wall.contains(2, 3));
        assert!(wall.contains(5, 3));
        assert!(!wall.contains(6, 3));
        assert!(!wall.contains(2, 4));
    }

    #[test]
    fn test_grid_open_cells() {
        let grid = Grid::new(10, 10).with_walls(vec![WallRect::new(0, 5, 10, 1)]);
        assert!(grid.is_open(0, 0));
        assert!(!grid.is_open(-1, 0));
        assert!(!grid.is_open(0, 10));
        assert!(!grid.is_open(3, 5));
        assert!(grid.is_last_row(9));
    }
}
