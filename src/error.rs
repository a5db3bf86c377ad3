use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid plot bounds: width={width}, height={height}")]
    InvalidBounds { width: i32, height: i32 },

    #[error("invalid series capacity: {0}")]
    InvalidCapacity(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed series snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
