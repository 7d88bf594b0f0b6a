//! Game session: drives the falling piece and the lock sequence
//!
//! On landing a piece is committed to the board, then stacked tiles merge,
//! then full lines clear, then the next piece spawns.

use crate::bag::Bag;
use crate::board::Board;
use crate::error::BoardError;
use crate::settings::Settings;
use crate::tetromino::Tetromino;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// Actions the session can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
}

/// What happened when a piece locked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOutcome {
    pub merge_points: u64,
    pub lines_cleared: usize,
    pub game_over: bool,
}

/// A single game session
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    bag: Bag,
    /// Source of tile values
    rng: ChaCha8Rng,
    four_chance: f64,
    next_piece: Tetromino,
    seed: u64,
    state: SessionState,
    lines_cleared: u32,
    pieces_locked: u32,
}

impl Session {
    /// Create a session from settings, seeded from them when a seed is set
    pub fn from_settings(settings: &Settings) -> Result<Self, BoardError> {
        let seed = settings.spawn.seed.unwrap_or_else(rand::random);
        Self::with_seed(
            settings.grid.height,
            settings.grid.width,
            settings.spawn.four_chance,
            u64::from(seed),
        )
    }

    /// Create a session whose pieces and tile values are fixed by `seed`
    pub fn with_seed(
        height: usize,
        width: usize,
        four_chance: f64,
        seed: u64,
    ) -> Result<Self, BoardError> {
        let board = Board::new(height, width)?;
        let mut bag = Bag::with_seed(seed);
        // Offset so tile values do not mirror the bag's shuffles
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        let first = Tetromino::spawn(bag.next(), height, width, &mut rng, four_chance);
        let next_piece = Tetromino::spawn(bag.next(), height, width, &mut rng, four_chance);

        let mut session = Self {
            board,
            bag,
            rng,
            four_chance,
            next_piece,
            seed,
            state: SessionState::Playing,
            lines_cleared: 0,
            pieces_locked: 0,
        };
        session.board.set_current_piece(first);
        info!(height, width, seed, "session started");
        Ok(session)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seed that replays this session
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    pub fn current_piece(&self) -> Option<&Tetromino> {
        self.board.current_piece()
    }

    pub fn next_piece(&self) -> &Tetromino {
        &self.next_piece
    }

    /// Process an action. Returns the lock outcome when the action landed the piece
    pub fn process_action(&mut self, action: Action) -> Result<Option<LockOutcome>, BoardError> {
        if self.is_over() {
            return Ok(None);
        }
        match action {
            Action::MoveLeft => {
                self.with_piece(|piece, board| piece.move_left(board));
            }
            Action::MoveRight => {
                self.with_piece(|piece, board| piece.move_right(board));
            }
            Action::Rotate => {
                self.with_piece(|piece, board| piece.rotate(board));
            }
            Action::SoftDrop => {
                self.with_piece(|piece, board| piece.move_down(board));
            }
            Action::HardDrop => {
                self.with_piece(|piece, board| {
                    piece.hard_drop(board);
                    true
                });
                return self.lock_piece().map(Some);
            }
        }
        Ok(None)
    }

    /// Apply one row of gravity, locking the piece if it cannot fall
    pub fn tick(&mut self) -> Result<Option<LockOutcome>, BoardError> {
        if self.is_over() {
            return Ok(None);
        }
        if self.with_piece(|piece, board| piece.move_down(board)) {
            Ok(None)
        } else {
            self.lock_piece().map(Some)
        }
    }

    /// Run `f` on the falling piece with the board alongside
    fn with_piece(&mut self, f: impl FnOnce(&mut Tetromino, &Board) -> bool) -> bool {
        let Some(mut piece) = self.board.take_current_piece() else {
            return false;
        };
        let moved = f(&mut piece, &self.board);
        self.board.set_current_piece(piece);
        moved
    }

    /// Lock the current piece, merge, clear, and spawn the next one
    fn lock_piece(&mut self) -> Result<LockOutcome, BoardError> {
        let game_over = self.board.lock_current_piece()?;
        self.pieces_locked += 1;
        if game_over {
            return Ok(self.end(LockOutcome {
                merge_points: 0,
                lines_cleared: 0,
                game_over: true,
            }));
        }

        let score_before = self.board.score();
        let merge_points = self.board.merge_tiles() - score_before;
        let lines_cleared = self.board.remove_full_lines();
        self.lines_cleared = add_lines(self.lines_cleared, lines_cleared);
        debug!(merge_points, lines_cleared, "piece locked");

        // Spawn next piece
        let upcoming = Tetromino::spawn(
            self.bag.next(),
            self.board.height(),
            self.board.width(),
            &mut self.rng,
            self.four_chance,
        );
        let piece = std::mem::replace(&mut self.next_piece, upcoming);

        // Check for top out
        let outcome = LockOutcome {
            merge_points,
            lines_cleared,
            game_over: !piece.is_valid(&self.board),
        };
        if outcome.game_over {
            return Ok(self.end(outcome));
        }
        self.board.set_current_piece(piece);
        Ok(outcome)
    }

    fn end(&mut self, outcome: LockOutcome) -> LockOutcome {
        self.state = SessionState::GameOver;
        self.board.set_game_over();
        info!(
            score = self.board.score(),
            lines = self.lines_cleared,
            pieces = self.pieces_locked,
            "game over"
        );
        outcome
    }
}

/// Add a clear to the running line total, saturating at `u32::MAX`
fn add_lines(total: u32, cleared: usize) -> u32 {
    total.saturating_add(u32::try_from(cleared).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::with_seed(12, 6, 0.1, 99).unwrap()
    }

    #[test]
    fn test_new_session_has_a_falling_piece() {
        let session = session();
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.current_piece().is_some());
        assert_eq!(session.score(), 0);
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_from_settings_uses_seed() {
        let mut settings = Settings::default();
        settings.spawn.seed = Some(99);
        let session = Session::from_settings(&settings).unwrap();
        assert_eq!(session.seed(), 99);
        assert_eq!(session.board().height(), settings.grid.height);
        assert_eq!(session.board().width(), settings.grid.width);
    }

    #[test]
    fn test_same_seed_same_pieces() {
        let a = session();
        let b = session();
        assert_eq!(a.current_piece(), b.current_piece());
        assert_eq!(a.next_piece(), b.next_piece());
    }

    #[test]
    fn test_hard_drop_locks_and_spawns_next() {
        let mut session = session();
        let next = session.next_piece().clone();
        let outcome = session.process_action(Action::HardDrop).unwrap().unwrap();
        assert!(!outcome.game_over);
        assert_eq!(session.pieces_locked(), 1);
        assert_eq!(session.current_piece(), Some(&next));
        // Four tiles landed, fewer if some merged
        let tiles = session.board().tile_count();
        assert!((1..=4).contains(&tiles));
    }

    #[test]
    fn test_tick_falls_then_locks() {
        let mut session = session();
        let start = session.current_piece().unwrap().bottom_left_cell();
        assert_eq!(session.tick().unwrap(), None);
        let after = session.current_piece().unwrap().bottom_left_cell();
        assert_eq!(after.y, start.y - 1);

        let mut locked = None;
        for _ in 0..32 {
            if let Some(outcome) = session.tick().unwrap() {
                locked = Some(outcome);
                break;
            }
        }
        assert!(locked.is_some());
        assert_eq!(session.pieces_locked(), 1);
    }

    #[test]
    fn test_stacking_ends_game_and_freezes() {
        let mut session = Session::with_seed(3, 4, 0.1, 7).unwrap();
        let mut last_score = 0;
        for _ in 0..200 {
            if session.is_over() {
                break;
            }
            session.process_action(Action::HardDrop).unwrap();
            assert!(session.score() >= last_score);
            last_score = session.score();
        }
        assert!(session.is_over());
        assert!(session.board().is_game_over());

        let pieces = session.pieces_locked();
        assert_eq!(session.process_action(Action::HardDrop).unwrap(), None);
        assert_eq!(session.tick().unwrap(), None);
        assert_eq!(session.pieces_locked(), pieces);
    }

    #[test]
    fn test_board_flag_follows_session_over() {
        // Small boards top out quickly, mostly through blocked spawns
        let mut ended = 0;
        for seed in 0..200 {
            let mut session = Session::with_seed(6, 4, 0.1, seed).unwrap();
            for _ in 0..1000 {
                if session.is_over() {
                    ended += 1;
                    break;
                }
                session.process_action(Action::HardDrop).unwrap();
                assert_eq!(session.board().is_game_over(), session.is_over(), "seed {seed}");
            }
        }
        assert!(ended > 0);
    }

    #[test]
    fn test_line_total_saturates() {
        assert_eq!(add_lines(3, 2), 5);
        assert_eq!(add_lines(u32::MAX - 1, 4), u32::MAX);
        assert_eq!(add_lines(0, usize::MAX), u32::MAX);
    }

    #[test]
    fn test_moves_stay_inside_walls() {
        let mut session = session();
        for _ in 0..20 {
            session.process_action(Action::MoveLeft).unwrap();
        }
        let piece = session.current_piece().unwrap();
        assert!(piece.occupied_positions().iter().any(|p| p.x == 0));
        assert!(piece.occupied_positions().iter().all(|p| p.x >= 0));
    }
}
