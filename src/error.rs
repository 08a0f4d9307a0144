use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be positive")]
    ZeroDimension,
    #[error("Mine count must satisfy 0 < mines < width * height")]
    MineCountOutOfRange,
    #[error("Starting lives must be positive")]
    ZeroLives,
    #[error("Coordinates out of bounds")]
    OutOfBounds,
}

pub type Result<T> = core::result::Result<T, GameError>;
