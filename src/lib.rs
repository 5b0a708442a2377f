pub mod config;
pub mod error;
pub mod field;
pub mod game;
pub mod piece;

pub use config::Config;
pub use error::{Error, Result};
pub use field::Field;
pub use game::{spawn_new_session, Game, GameEvent, GameState};
pub use piece::{Piece, PieceProvider, RandomPieceProvider, SequencePieceProvider, Shape};
