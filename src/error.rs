use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Precondition violations caught when a session or piece is built.
///
/// Nothing during play returns an error: rejected moves are no-ops and a
/// blocked spawn is the `GameOver` state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("field needs at least one column")]
    NoColumns,
    #[error("field needs at least one row")]
    NoRows,
    #[error("gravity tick interval must be non-zero")]
    ZeroTickInterval,
    #[error("piece has no cells")]
    EmptyPiece,
    #[error("piece row {row} has {found} cells, expected {expected}")]
    RaggedPiece {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("piece is {width}x{height}, the largest allowed is {max}x{max}")]
    PieceTooLarge { width: usize, height: usize, max: usize },
    #[error("cell value {value} at row {row}, column {col} is not a color id")]
    InvalidCell { row: usize, col: usize, value: u8 },
    #[error("piece has no occupied cell")]
    BlankPiece,
}
