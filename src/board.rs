//! Game board: locked tiles, piece commits, tile merging and line clears

use crate::error::BoardError;
use crate::point::Point;
use crate::tetromino::Tetromino;
use crate::tile::{self, Tile};
use tracing::{debug, warn};

/// Default board dimensions
pub const DEFAULT_GRID_HEIGHT: usize = 20;
pub const DEFAULT_GRID_WIDTH: usize = 12;

/// A cell on the board - either empty or holding a tile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Tile),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    pub fn tile(&self) -> Option<&Tile> {
        match self {
            Cell::Filled(tile) => Some(tile),
            Cell::Empty => None,
        }
    }
}

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    height: usize,
    width: usize,
    /// Grid stored as [row][col], row 0 is bottom, row increases upward
    cells: Vec<Vec<Cell>>,
    score: u64,
    game_over: bool,
    /// Piece currently falling, handed to the presentation layer until it locks
    current_piece: Option<Tetromino>,
}

impl Board {
    /// Create a new empty board
    pub fn new(height: usize, width: usize) -> Result<Self, BoardError> {
        if height == 0 || width == 0 {
            return Err(BoardError::EmptyGrid { height, width });
        }
        Ok(Self {
            height,
            width,
            cells: vec![vec![Cell::Empty; width]; height],
            score: 0,
            game_over: false,
            current_piece: None,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Check whether (row, col) lies on the grid
    pub fn is_inside(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// Check whether (row, col) holds a tile.
    /// Anything off the grid is unoccupied, including the rows above it
    /// where freshly spawned pieces start.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some_and(Cell::is_filled)
    }

    /// Get the cell at (row, col), None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<&Cell> {
        if !self.is_inside(row, col) {
            return None;
        }
        Some(&self.cells[row as usize][col as usize])
    }

    /// Lock a landed tile matrix onto the board.
    ///
    /// `tiles_to_lock` is stored top row first; `blc_position` is the board
    /// position of its bottom-left corner. Every tile that falls inside the
    /// grid is moved into place; a tile that would land off the grid is
    /// dropped and ends the game. Returns the game-over flag.
    pub fn update_grid(
        &mut self,
        tiles_to_lock: Vec<Vec<Cell>>,
        blc_position: Point,
    ) -> Result<bool, BoardError> {
        let n_rows = tiles_to_lock.len();
        let n_cols = tiles_to_lock.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(BoardError::EmptyShape);
        }
        if let Some((row, found)) = tiles_to_lock
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != n_cols)
        {
            return Err(BoardError::InvalidShape {
                row,
                expected: n_cols,
                found,
            });
        }

        // The piece is no longer in flight
        self.current_piece = None;

        for (local_row, row) in tiles_to_lock.into_iter().enumerate() {
            for (local_col, cell) in row.into_iter().enumerate() {
                let Cell::Filled(tile) = cell else {
                    continue;
                };
                match blc_position.locate(n_rows, local_row, local_col) {
                    Some(pos) if self.is_inside(pos.y, pos.x) => {
                        let target = &mut self.cells[pos.y as usize][pos.x as usize];
                        if target.is_filled() {
                            warn!(row = pos.y, col = pos.x, "locking over an occupied cell");
                        }
                        *target = Cell::Filled(tile);
                    }
                    // Unrepresentable positions are off the grid too
                    pos => {
                        debug!(?pos, local_row, local_col, "tile locked off the grid");
                        self.game_over = true;
                    }
                }
            }
        }

        Ok(self.game_over)
    }

    /// Lock the current falling piece, if any, through [`Board::update_grid`]
    pub fn lock_current_piece(&mut self) -> Result<bool, BoardError> {
        match self.current_piece.take() {
            Some(piece) => {
                let (tiles, blc_position) = piece.into_parts();
                self.update_grid(tiles, blc_position)
            }
            None => Ok(self.game_over),
        }
    }

    /// Run the merge pass over the locked tiles and return the new score
    pub fn merge_tiles(&mut self) -> u64 {
        self.score = tile::merge_tiles(&mut self.cells, self.score);
        self.score
    }

    /// Clear full rows and return the number cleared.
    ///
    /// Remaining rows keep their order and drop toward row 0; empty rows
    /// refill the top so the height never changes.
    pub fn remove_full_lines(&mut self) -> usize {
        let full: Vec<bool> = (0..self.height).map(|row| self.is_line_full(row)).collect();
        let lines_cleared = full.iter().filter(|&&is_full| is_full).count();
        if lines_cleared == 0 {
            return 0;
        }

        let mut write_row = 0;
        for (read_row, &is_full) in full.iter().enumerate() {
            if is_full {
                continue;
            }
            // Keep this line
            if write_row != read_row {
                self.cells.swap(write_row, read_row);
            }
            write_row += 1;
        }

        // Fill the top with empty rows
        let width = self.width;
        for row in &mut self.cells[write_row..] {
            *row = vec![Cell::Empty; width];
        }

        debug!(lines_cleared, "cleared full lines");
        lines_cleared
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(Cell::is_filled)
    }

    /// Check if the board holds no tiles
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(Cell::is_empty))
    }

    pub fn tile_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_filled()).count())
            .sum()
    }

    /// Get an iterator over rows (bottom to top)
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.cells.iter().map(Vec::as_slice).enumerate()
    }

    /// Get an iterator over every cell as (row, col, cell), bottom row first
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.rows()
            .flat_map(|(row, cells)| cells.iter().enumerate().map(move |(col, cell)| (row, col, cell)))
    }

    pub fn current_piece(&self) -> Option<&Tetromino> {
        self.current_piece.as_ref()
    }

    pub fn set_current_piece(&mut self, piece: Tetromino) {
        self.current_piece = Some(piece);
    }

    pub fn take_current_piece(&mut self) -> Option<Tetromino> {
        self.current_piece.take()
    }

    /// Mark the session as ended when the next piece has no room to spawn
    pub(crate) fn set_game_over(&mut self) {
        self.game_over = true;
    }
}
