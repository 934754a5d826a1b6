//! Library error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FenceError {
    #[error("bad fence type: {0}")]
    UnknownStrategy(String),

    #[error("fence index does not contain fence {0:?}")]
    NameNotFound(String),

    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FenceError>;
