use super::{CatalogError, ConfigError, NotFoundError};

/// Top-level error of the `maptune` binary.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("{0}")]
    Other(String),
}
