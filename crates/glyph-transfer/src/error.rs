use std::result;

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::BuilderError;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("failed to read font: {0}")]
    Read(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Builder(#[from] BuilderError),

    #[error("failed to build font: {0}")]
    Write(#[from] write_fonts::error::Error),

    #[error("font has no glyf table (CFF outlines are not supported)")]
    NoGlyfTable,

    #[error("font has no usable cmap table")]
    NoCmap,

    #[error("no code points selected")]
    NoCodepoints,

    #[error("invalid code point '{0}': expected hex like 0041 or 0x1F600")]
    InvalidCodepoint(String),

    #[error("invalid range: start U+{start:04X} is greater than end U+{end:04X}")]
    InvertedRange { start: u32, end: u32 },

    #[error("font name cannot be empty")]
    EmptyFamilyName,

    #[error("author name cannot be empty")]
    EmptyAuthor,

    #[error("composite glyph GID{0} nests deeper than {1} levels")]
    ComponentDepthExceeded(u16, usize),
}

pub type Result<T> = result::Result<T, TransferError>;
