//! Headless placement policy
//!
//! Tries every rotation and column for the falling piece, simulates the
//! lock sequence on a copy of the board and rates the result with classic
//! grid features.

use crate::board::Board;
use crate::session::Action;
use crate::tetromino::Tetromino;
use tracing::trace;

const HEIGHT_WEIGHT: f64 = -0.51;
const LINES_WEIGHT: f64 = 0.76;
const HOLES_WEIGHT: f64 = -0.36;
const BUMPINESS_WEIGHT: f64 = -0.18;
const MERGE_WEIGHT: f64 = 0.3;

/// Shape of the locked stack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridFeatures {
    pub max_height: u32,
    pub aggregate_height: u32,
    pub holes: u32,
    pub bumpiness: u32,
}

/// Where to put a piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Clockwise quarter turns from the spawn orientation
    pub rotations: usize,
    /// Column of the piece's bottom-left corner
    pub column: i32,
    pub evaluation: f64,
}

/// Compute grid features of a board
pub fn grid_features(board: &Board) -> GridFeatures {
    let heights = column_heights(board);

    let max_height = heights.iter().copied().max().unwrap_or(0);
    let aggregate_height = heights.iter().sum();
    let holes = heights
        .iter()
        .enumerate()
        .map(|(col, &height)| {
            (0..height as i32)
                .filter(|&row| !board.is_occupied(row, col as i32))
                .count() as u32
        })
        .sum();
    let bumpiness = heights.windows(2).map(|w| w[0].abs_diff(w[1])).sum();

    GridFeatures {
        max_height,
        aggregate_height,
        holes,
        bumpiness,
    }
}

/// Height of each column: one above its topmost tile, 0 when empty
fn column_heights(board: &Board) -> Vec<u32> {
    (0..board.width() as i32)
        .map(|col| {
            (0..board.height() as i32)
                .rev()
                .find(|&row| board.is_occupied(row, col))
                .map_or(0, |row| row as u32 + 1)
        })
        .collect()
}

/// Find the best reachable placement for `piece`
pub fn best_placement(board: &Board, piece: &Tetromino) -> Option<Placement> {
    let mut best: Option<Placement> = None;

    for rotations in 0..4 {
        let mut turned = piece.clone();
        if !(0..rotations).all(|_| turned.rotate(board)) {
            continue;
        }

        // Slide fully left, then sweep right one column at a time
        while turned.move_left(board) {}
        loop {
            let mut dropped = turned.clone();
            dropped.hard_drop(board);
            let evaluation = evaluate(board, dropped);
            let column = turned.bottom_left_cell().x;
            trace!(rotations, column, evaluation, "candidate placement");

            if best.is_none_or(|b| evaluation > b.evaluation) {
                best = Some(Placement {
                    rotations,
                    column,
                    evaluation,
                });
            }
            if !turned.move_right(board) {
                break;
            }
        }
    }

    best
}

/// Actions that bring `piece` to its best placement and drop it
pub fn plan(board: &Board, piece: &Tetromino) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(placement) = best_placement(board, piece) {
        actions.extend(std::iter::repeat_n(Action::Rotate, placement.rotations));
        let dx = placement.column - piece.bottom_left_cell().x;
        let step = if dx < 0 {
            Action::MoveLeft
        } else {
            Action::MoveRight
        };
        actions.extend(std::iter::repeat_n(step, dx.unsigned_abs() as usize));
    }
    actions.push(Action::HardDrop);
    actions
}

/// Rate the board left after locking a dropped piece
fn evaluate(board: &Board, dropped: Tetromino) -> f64 {
    let mut sim = board.clone();
    let incoming = dropped.occupied_positions().len();
    let (tiles, anchor) = dropped.into_parts();
    match sim.update_grid(tiles, anchor) {
        Ok(false) => {}
        // Topping out or a malformed piece is never chosen
        Ok(true) | Err(_) => return f64::NEG_INFINITY,
    }

    let tiles_before = sim.tile_count();
    sim.merge_tiles();
    let merges = tiles_before - sim.tile_count();
    let lines = sim.remove_full_lines();
    let features = grid_features(&sim);

    HEIGHT_WEIGHT * f64::from(features.aggregate_height)
        + LINES_WEIGHT * lines as f64
        + HOLES_WEIGHT * f64::from(features.holes)
        + BUMPINESS_WEIGHT * f64::from(features.bumpiness)
        + MERGE_WEIGHT * merges as f64 / incoming.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::point::Point;
    use crate::session::Session;
    use crate::tetromino::TetrominoType;
    use crate::tile::Tile;

    fn place(board: &mut Board, row: i32, col: i32, value: u32) {
        board
            .update_grid(vec![vec![Cell::Filled(Tile::new(value))]], Point::new(col, row))
            .unwrap();
    }

    /// Run planned actions on a bare piece, mirroring what the session does
    fn apply(board: &Board, piece: &mut Tetromino, actions: &[Action]) {
        for action in actions {
            match action {
                Action::MoveLeft => assert!(piece.move_left(board)),
                Action::MoveRight => assert!(piece.move_right(board)),
                Action::Rotate => assert!(piece.rotate(board)),
                Action::SoftDrop => {
                    piece.move_down(board);
                }
                Action::HardDrop => {
                    piece.hard_drop(board);
                }
            }
        }
    }

    #[test]
    fn test_features_of_empty_board() {
        let board = Board::new(6, 4).unwrap();
        assert_eq!(grid_features(&board), GridFeatures::default());
    }

    #[test]
    fn test_features_count_holes_and_bumps() {
        let mut board = Board::new(6, 3).unwrap();
        place(&mut board, 2, 0, 2); // column 0: height 3, two holes
        place(&mut board, 0, 1, 4); // column 1: height 1
        let features = grid_features(&board);
        assert_eq!(features.max_height, 3);
        assert_eq!(features.aggregate_height, 4);
        assert_eq!(features.holes, 2);
        assert_eq!(features.bumpiness, 2 + 1);
    }

    #[test]
    fn test_flat_i_clears_a_line() {
        let board = Board::new(8, 4).unwrap();
        let piece = Tetromino::from_values(TetrominoType::I, &[2, 4, 8, 16], Point::new(0, 7));
        let placement = best_placement(&board, &piece).unwrap();
        // Horizontal on a 4-wide board fills the bottom row
        assert_eq!(placement.rotations % 2, 0);

        let actions = plan(&board, &piece);
        assert_eq!(actions.last(), Some(&Action::HardDrop));
        let mut moved = piece.clone();
        apply(&board, &mut moved, &actions);
        assert!(moved.occupied_positions().iter().all(|p| p.y == 0));
    }

    #[test]
    fn test_prefers_filling_the_gap() {
        let mut board = Board::new(8, 4).unwrap();
        for col in 0..3 {
            place(&mut board, 0, col, 2);
            place(&mut board, 1, col, 4);
        }
        // A vertical I into the right-hand well clears both rows
        let piece = Tetromino::from_values(TetrominoType::I, &[8, 16, 32, 64], Point::new(0, 7));
        let actions = plan(&board, &piece);
        let mut moved = piece.clone();
        apply(&board, &mut moved, &actions);
        assert!(moved.occupied_positions().iter().all(|p| p.x == 3));
    }

    #[test]
    fn test_autoplay_drives_a_session() {
        let mut session = Session::with_seed(20, 10, 0.1, 5).unwrap();
        for expected in 1..=25 {
            if session.is_over() {
                break;
            }
            let piece = session.current_piece().unwrap().clone();
            for action in plan(session.board(), &piece) {
                session.process_action(action).unwrap();
            }
            assert_eq!(session.pieces_locked(), expected);
        }
    }
}
