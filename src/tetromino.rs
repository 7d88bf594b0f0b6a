//! Tetromino definitions and the active falling piece
//!
//! All 7 standard tetrominoes, each a square pattern of numbered tiles

use crate::board::{Board, Cell};
use crate::point::Point;
use crate::tile::Tile;
use rand::Rng;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T, // T-shape
    S, // S-shape
    Z, // Z-shape
    J, // J-shape
    L, // L-shape
}

impl TetrominoType {
    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Spawn pattern, top row first. `#` marks a tile
    pub fn shape(&self) -> &'static [&'static str] {
        match self {
            TetrominoType::I => &["....", "####", "....", "...."],
            TetrominoType::O => &["##", "##"],
            TetrominoType::T => &[".#.", "###", "..."],
            TetrominoType::S => &[".##", "##.", "..."],
            TetrominoType::Z => &["##.", ".##", "..."],
            TetrominoType::J => &["#..", "###", "..."],
            TetrominoType::L => &["..#", "###", "..."],
        }
    }

    /// Side length of the square pattern
    pub fn size(&self) -> usize {
        self.shape().len()
    }

    /// Number of tiles in the pattern
    pub fn tile_count(&self) -> usize {
        self.shape()
            .iter()
            .map(|row| row.bytes().filter(|&b| b == b'#').count())
            .sum()
    }
}

/// A falling piece: a square tile matrix plus the board position of its
/// bottom-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetromino {
    kind: TetrominoType,
    /// Stored as [row][col], row 0 is the top of the piece
    tile_matrix: Vec<Vec<Cell>>,
    bottom_left_cell: Point,
}

impl Tetromino {
    /// Create a piece with random 2/4 tiles, centred at the top of a board
    /// of the given size. Its bottom row starts on the topmost grid row.
    pub fn spawn<R: Rng + ?Sized>(
        kind: TetrominoType,
        grid_height: usize,
        grid_width: usize,
        rng: &mut R,
        four_chance: f64,
    ) -> Self {
        let values: Vec<u32> = (0..kind.tile_count())
            .map(|_| Tile::random(rng, four_chance).value())
            .collect();
        let x = grid_width.saturating_sub(kind.size()) / 2;
        let y = grid_height as i32 - 1;
        Self::from_values(kind, &values, Point::new(x as i32, y))
    }

    /// Create a piece whose tiles take `values` in reading order
    /// (top row first, left to right). Missing values default to 2.
    pub fn from_values(kind: TetrominoType, values: &[u32], bottom_left_cell: Point) -> Self {
        let mut values = values.iter().copied();
        let tile_matrix = kind
            .shape()
            .iter()
            .map(|row| {
                row.bytes()
                    .map(|b| {
                        if b == b'#' {
                            Cell::Filled(Tile::new(values.next().unwrap_or(2)))
                        } else {
                            Cell::Empty
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            kind,
            tile_matrix,
            bottom_left_cell,
        }
    }

    pub fn kind(&self) -> TetrominoType {
        self.kind
    }

    pub fn tile_matrix(&self) -> &[Vec<Cell>] {
        &self.tile_matrix
    }

    pub fn bottom_left_cell(&self) -> Point {
        self.bottom_left_cell
    }

    /// Hand the tiles and the anchor over for locking
    pub fn into_parts(self) -> (Vec<Vec<Cell>>, Point) {
        (self.tile_matrix, self.bottom_left_cell)
    }

    /// Board positions of every tile in the piece
    pub fn occupied_positions(&self) -> Vec<Point> {
        positions(&self.tile_matrix, self.bottom_left_cell)
            .flatten()
            .collect()
    }

    /// Check that the piece could sit at `anchor` with `matrix`
    fn fits(board: &Board, matrix: &[Vec<Cell>], anchor: Point) -> bool {
        positions(matrix, anchor).all(|p| {
            // Above the board is valid (for spawning)
            p.is_some_and(|p| {
                p.x >= 0
                    && (p.x as usize) < board.width()
                    && p.y >= 0
                    && !board.is_occupied(p.y, p.x)
            })
        })
    }

    /// Check if the piece is legal where it currently stands
    pub fn is_valid(&self, board: &Board) -> bool {
        Self::fits(board, &self.tile_matrix, self.bottom_left_cell)
    }

    fn try_shift(&mut self, board: &Board, dx: i32, dy: i32) -> bool {
        let Some(target) = self.bottom_left_cell.checked_offset(dx, dy) else {
            return false;
        };
        if Self::fits(board, &self.tile_matrix, target) {
            self.bottom_left_cell = target;
            true
        } else {
            false
        }
    }

    /// Try to move left, returns true if successful
    pub fn move_left(&mut self, board: &Board) -> bool {
        self.try_shift(board, -1, 0)
    }

    /// Try to move right, returns true if successful
    pub fn move_right(&mut self, board: &Board) -> bool {
        self.try_shift(board, 1, 0)
    }

    /// Try to move down, returns true if successful
    pub fn move_down(&mut self, board: &Board) -> bool {
        self.try_shift(board, 0, -1)
    }

    /// Try to rotate clockwise in place, returns true if successful
    pub fn rotate(&mut self, board: &Board) -> bool {
        let rotated = rotate_clockwise(&self.tile_matrix);
        if Self::fits(board, &rotated, self.bottom_left_cell) {
            self.tile_matrix = rotated;
            true
        } else {
            false
        }
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let mut distance = 0;
        while self.move_down(board) {
            distance += 1;
        }
        distance
    }
}

/// Board positions of the filled cells, None where a position overflows
fn positions(matrix: &[Vec<Cell>], anchor: Point) -> impl Iterator<Item = Option<Point>> {
    let n_rows = matrix.len();
    matrix.iter().enumerate().flat_map(move |(row, cells)| {
        cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_filled())
            .map(move |(col, _)| anchor.locate(n_rows, row, col))
    })
}

/// Rotate a square matrix a quarter turn clockwise
fn rotate_clockwise(matrix: &[Vec<Cell>]) -> Vec<Vec<Cell>> {
    let n = matrix.len();
    (0..n)
        .map(|row| (0..n).map(|col| matrix[n - 1 - col][row].clone()).collect())
        .collect()
}
