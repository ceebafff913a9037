//! Structured error types for every layer of the player.

mod app;
mod audio;
mod catalog;
mod command;
mod config;
mod decode;
mod load;

pub use app::AppError;
pub use audio::{AudioError, TeardownWarning};
pub use catalog::{CatalogError, NotFoundError};
pub use command::CommandError;
pub use config::ConfigError;
pub use decode::DecodeError;
pub use load::LoadError;
