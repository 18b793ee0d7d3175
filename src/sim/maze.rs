//! Procedural maze generation
//!
//! Randomized Prim over the cell grid, then a sprinkle of extra openings so the
//! arena has loops instead of long dead ends. Walls are the complement of the
//! passage set: every grid-adjacent pair is either open or solid.

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::RENDERED_WALL_FACTOR;
use crate::error::ArenaError;

/// Grid coordinate of a maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four grid neighbors (may lie outside the maze)
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
        ]
    }

    /// Pixel center of this cell
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * cell_size,
            (self.y as f32 + 0.5) * cell_size,
        )
    }

    /// Cell containing a pixel position
    pub fn containing(pos: Vec2, cell_size: f32) -> Self {
        Cell::new(
            (pos.x / cell_size).floor() as i32,
            (pos.y / cell_size).floor() as i32,
        )
    }
}

/// A solid wall in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub start: Vec2,
    pub end: Vec2,
}

/// Generated maze: dimensions plus the symmetric passage set
#[derive(Debug, Clone)]
pub struct Maze {
    width: i32,
    height: i32,
    passages: HashSet<(Cell, Cell)>,
}

impl Maze {
    /// Generate a maze from a random seed
    pub fn generate(width: i32, height: i32, extra_opening_chance: f64) -> Result<Self, ArenaError> {
        let mut rng = Pcg32::seed_from_u64(rand::random());
        Self::generate_with(width, height, extra_opening_chance, &mut rng)
    }

    /// Generate a reproducible maze from a seed
    pub fn generate_seeded(
        width: i32,
        height: i32,
        extra_opening_chance: f64,
        seed: u64,
    ) -> Result<Self, ArenaError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self::generate_with(width, height, extra_opening_chance, &mut rng)
    }

    /// Generate a maze using the caller's RNG
    pub fn generate_with<R: Rng>(
        width: i32,
        height: i32,
        extra_opening_chance: f64,
        rng: &mut R,
    ) -> Result<Self, ArenaError> {
        if width < 1 || height < 1 {
            return Err(ArenaError::InvalidDimensions { width, height });
        }

        let mut maze = Self {
            width,
            height,
            passages: HashSet::new(),
        };
        maze.carve_spanning_tree(rng);
        let tree_edges = maze.passage_count();
        maze.open_extra_walls(extra_opening_chance, rng);

        log::info!(
            "Generated {}x{} maze: {} tree passages, {} extra openings",
            width,
            height,
            tree_edges,
            maze.passage_count() - tree_edges
        );
        Ok(maze)
    }

    fn carve_spanning_tree<R: Rng>(&mut self, rng: &mut R) {
        let mut visited = vec![false; (self.width * self.height) as usize];
        let mut candidates: Vec<(Cell, Cell)> = Vec::new();

        let start = Cell::new(0, 0);
        visited[self.index(start)] = true;
        self.push_candidates(start, &visited, &mut candidates);

        while !candidates.is_empty() {
            let pick = rng.random_range(0..candidates.len());
            let (from, to) = candidates.swap_remove(pick);

            let idx = self.index(to);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            self.open(from, to);
            self.push_candidates(to, &visited, &mut candidates);
        }
    }

    fn push_candidates(&self, cell: Cell, visited: &[bool], candidates: &mut Vec<(Cell, Cell)>) {
        for next in cell.neighbors() {
            if self.contains(next) && !visited[self.index(next)] {
                candidates.push((cell, next));
            }
        }
    }

    fn open_extra_walls<R: Rng>(&mut self, chance: f64, rng: &mut R) {
        for x in 0..self.width {
            for y in 0..self.height {
                let cell = Cell::new(x, y);
                for next in [Cell::new(x + 1, y), Cell::new(x, y + 1)] {
                    if self.contains(next) && !self.is_passage(cell, next) && rng.random::<f64>() < chance {
                        self.open(cell, next);
                    }
                }
            }
        }
    }

    fn open(&mut self, a: Cell, b: Cell) {
        self.passages.insert((a, b));
        self.passages.insert((b, a));
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.y * self.width + cell.x) as usize
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Whether a cell lies inside the grid
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Whether there is no wall between `a` and `b`.
    ///
    /// Pairs involving out-of-bounds cells are never passages.
    pub fn is_passage(&self, a: Cell, b: Cell) -> bool {
        self.passages.contains(&(a, b))
    }

    /// Number of open passages, counting each unordered pair once
    pub fn passage_count(&self) -> usize {
        self.passages.len() / 2
    }

    /// Each open passage once, with the smaller cell first
    pub fn passages(&self) -> impl Iterator<Item = (Cell, Cell)> + '_ {
        self.passages.iter().copied().filter(|(a, b)| a < b)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    /// Open neighbors of a cell
    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        cell.neighbors()
            .into_iter()
            .filter(move |&next| self.is_passage(cell, next))
    }

    /// Whether every cell can reach every other through open passages
    pub fn is_fully_connected(&self) -> bool {
        let start = Cell::new(0, 0);
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(cell) = queue.pop_front() {
            for next in self.open_neighbors(cell) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() == self.cell_count()
    }

    /// Solid edges around a cell in pixel space.
    ///
    /// Works for cells outside the grid too, which are walled on every side.
    pub fn solid_edges(&self, cell: Cell, cell_size: f32) -> impl Iterator<Item = WallSegment> + '_ {
        let x0 = cell.x as f32 * cell_size;
        let y0 = cell.y as f32 * cell_size;
        let x1 = x0 + cell_size;
        let y1 = y0 + cell_size;

        [
            (Cell::new(cell.x + 1, cell.y), Vec2::new(x1, y0), Vec2::new(x1, y1)),
            (Cell::new(cell.x - 1, cell.y), Vec2::new(x0, y0), Vec2::new(x0, y1)),
            (Cell::new(cell.x, cell.y + 1), Vec2::new(x0, y1), Vec2::new(x1, y1)),
            (Cell::new(cell.x, cell.y - 1), Vec2::new(x0, y0), Vec2::new(x1, y0)),
        ]
        .into_iter()
        .filter(move |(next, _, _)| !self.is_passage(cell, *next))
        .map(|(_, start, end)| WallSegment { start, end })
    }

    /// Every solid wall once, outer boundary included, for rendering
    pub fn wall_segments(&self, cell_size: f32) -> Vec<WallSegment> {
        let mut walls = Vec::new();

        // Vertical lines between column x-1 and x
        for x in 0..=self.width {
            for y in 0..self.height {
                let interior = x > 0 && x < self.width;
                if !(interior && self.is_passage(Cell::new(x - 1, y), Cell::new(x, y))) {
                    walls.push(WallSegment {
                        start: Vec2::new(x as f32 * cell_size, y as f32 * cell_size),
                        end: Vec2::new(x as f32 * cell_size, (y + 1) as f32 * cell_size),
                    });
                }
            }
        }

        // Horizontal lines between row y-1 and y
        for x in 0..self.width {
            for y in 0..=self.height {
                let interior = y > 0 && y < self.height;
                if !(interior && self.is_passage(Cell::new(x, y - 1), Cell::new(x, y))) {
                    walls.push(WallSegment {
                        start: Vec2::new(x as f32 * cell_size, y as f32 * cell_size),
                        end: Vec2::new((x + 1) as f32 * cell_size, y as f32 * cell_size),
                    });
                }
            }
        }

        walls
    }

    /// Pixel size of the whole maze
    pub fn pixel_size(&self, cell_size: f32) -> Vec2 {
        Vec2::new(self.width as f32 * cell_size, self.height as f32 * cell_size)
    }
}

/// Rendered wall stroke width for a cell size
#[inline]
pub fn wall_thickness(cell_size: f32) -> f32 {
    cell_size * RENDERED_WALL_FACTOR
}

/// Largest square cell that fits `width` x `height` cells into the filled
/// fraction of the viewport
pub fn cell_size_for_viewport(
    width: i32,
    height: i32,
    viewport: Vec2,
    fill: f32,
) -> Result<f32, ArenaError> {
    if width < 1 || height < 1 {
        return Err(ArenaError::InvalidDimensions { width, height });
    }
    if !(viewport.x > 0.0 && viewport.y > 0.0) {
        return Err(ArenaError::InvalidViewport {
            width: viewport.x,
            height: viewport.y,
        });
    }
    let by_width = viewport.x * fill / width as f32;
    let by_height = viewport.y * fill / height as f32;
    Ok(by_width.min(by_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tree_only_has_exact_edge_count() {
        let maze = Maze::generate_seeded(8, 5, 0.0, 7).unwrap();
        assert_eq!(maze.passage_count(), 8 * 5 - 1);
        assert!(maze.is_fully_connected());
    }

    #[test]
    fn test_full_opening_chance_opens_everything() {
        let maze = Maze::generate_seeded(4, 3, 1.0, 7).unwrap();
        // Horizontal pairs + vertical pairs
        assert_eq!(maze.passage_count(), 3 * 3 + 4 * 2);
    }

    #[test]
    fn test_rejects_empty_grid() {
        assert!(matches!(
            Maze::generate_seeded(0, 3, 0.05, 1),
            Err(ArenaError::InvalidDimensions { width: 0, height: 3 })
        ));
        assert!(Maze::generate_seeded(3, -1, 0.05, 1).is_err());
    }

    #[test]
    fn test_single_cell_maze() {
        let maze = Maze::generate_seeded(1, 1, 0.05, 1).unwrap();
        assert_eq!(maze.passage_count(), 0);
        assert!(maze.is_fully_connected());
        assert_eq!(maze.solid_edges(Cell::new(0, 0), 10.0).count(), 4);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = Maze::generate_seeded(6, 3, 0.05, 42).unwrap();
        let b = Maze::generate_seeded(6, 3, 0.05, 42).unwrap();
        let mut pa: Vec<_> = a.passages().collect();
        let mut pb: Vec<_> = b.passages().collect();
        pa.sort();
        pb.sort();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_two_by_one_is_open_between_cells() {
        let maze = Maze::generate_seeded(2, 1, 0.0, 3).unwrap();
        assert!(maze.is_passage(Cell::new(0, 0), Cell::new(1, 0)));
        assert_eq!(maze.solid_edges(Cell::new(0, 0), 10.0).count(), 3);
    }

    #[test]
    fn test_out_of_bounds_cells_are_walled() {
        let maze = Maze::generate_seeded(3, 3, 1.0, 3).unwrap();
        assert!(!maze.is_passage(Cell::new(0, 0), Cell::new(-1, 0)));
        assert_eq!(maze.solid_edges(Cell::new(-1, 0), 10.0).count(), 4);
    }

    #[test]
    fn test_wall_segments_include_boundary() {
        let maze = Maze::generate_seeded(3, 2, 1.0, 3).unwrap();
        // Fully open maze: only the perimeter remains
        assert_eq!(maze.wall_segments(10.0).len(), 2 * (3 + 2));
    }

    #[test]
    fn test_cell_size_for_viewport() {
        let size = cell_size_for_viewport(6, 3, Vec2::new(1000.0, 1000.0), 0.85).unwrap();
        assert!((size - 850.0 / 6.0).abs() < 1e-3);
        assert!(cell_size_for_viewport(6, 3, Vec2::new(0.0, 100.0), 0.85).is_err());
    }

    #[test]
    fn test_cell_lookup() {
        assert_eq!(Cell::containing(Vec2::new(25.0, 5.0), 10.0), Cell::new(2, 0));
        assert_eq!(Cell::containing(Vec2::new(-1.0, 5.0), 10.0), Cell::new(-1, 0));
        assert_eq!(Cell::new(1, 2).center(10.0), Vec2::new(15.0, 25.0));
    }

    proptest! {
        #[test]
        fn prop_maze_connected_and_symmetric(w in 1i32..12, h in 1i32..12, seed in any::<u64>()) {
            let maze = Maze::generate_seeded(w, h, 0.05, seed).unwrap();
            prop_assert!(maze.is_fully_connected());
            prop_assert!(maze.passage_count() >= (w * h - 1) as usize);

            for cell in maze.cells() {
                for next in cell.neighbors() {
                    prop_assert_eq!(maze.is_passage(cell, next), maze.is_passage(next, cell));
                    if maze.is_passage(cell, next) {
                        prop_assert!(maze.contains(next));
                    }
                }
            }
        }
    }
}
