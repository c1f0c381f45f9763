//! Fontgraft CLI library.

pub mod cli;
pub mod discover;
pub mod io;
pub mod prompt;

pub use cli::Cli;
