//! TETRS 2048 - a falling-block grid where equal tiles merge
//!
//! Tetrominoes made of numbered tiles fall onto the [`board::Board`]. Once a
//! piece lands it is locked, stacked equal tiles merge 2048-style and full
//! rows are cleared. [`session::Session`] drives that sequence.

pub mod autoplay;
pub mod bag;
pub mod board;
pub mod error;
pub mod point;
pub mod session;
pub mod settings;
pub mod tetromino;
pub mod tile;

pub use board::{Board, Cell};
pub use error::{BoardError, SettingsError};
pub use point::Point;
pub use session::{Action, LockOutcome, Session, SessionState};
pub use tile::Tile;
