//! Core types for a glyph transfer run.

use std::{
    collections::BTreeSet,
    fmt,
    fmt::{Display, Formatter},
};

use crate::error::{Result, TransferError};

/// A Unicode codepoint, the key for glyph lookup in both fonts.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codepoint(pub u32);

impl Codepoint {
    pub const MAX: u32 = 0x10FFFF;

    pub const fn new(cp: u32) -> Self {
        Self(cp)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Convert to a Rust char if valid
    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<u32> for Codepoint {
    fn from(cp: u32) -> Self {
        Self(cp)
    }
}

impl From<Codepoint> for u32 {
    fn from(cp: Codepoint) -> Self {
        cp.0
    }
}

impl Display for Codepoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

/// How a transferred outline is positioned vertically in the destination.
///
/// Applied uniformly to every glyph in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Keep the source glyph's native vertical position.
    #[default]
    SourceTop,
    /// Shift so the new bounding-box top matches the destination glyph's
    /// prior bounding-box top.
    DestinationTop,
    /// Shift so the new bounding-box bottom matches the destination glyph's
    /// prior bounding-box bottom.
    DestinationBottom,
}

impl Alignment {
    /// Parse the interactive menu choice. Blank or unrecognized input
    /// selects the default (keep source top).
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "2" => Self::DestinationTop,
            "3" => Self::DestinationBottom,
            _ => Self::SourceTop,
        }
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SourceTop => "keep source top",
            Self::DestinationTop => "match destination top",
            Self::DestinationBottom => "match destination bottom",
        };
        f.write_str(name)
    }
}

/// Naming metadata applied to the output font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetadata {
    family_name: String,
    author: String,
    license: Option<String>,
}

impl FontMetadata {
    /// Create metadata. Family name and author are required and must be
    /// non-empty after trimming.
    pub fn new(
        family_name: impl Into<String>,
        author: impl Into<String>,
        license: Option<String>,
    ) -> Result<Self> {
        let family_name = family_name.into().trim().to_string();
        let author = author.into().trim().to_string();
        if family_name.is_empty() {
            return Err(TransferError::EmptyFamilyName);
        }
        if author.is_empty() {
            return Err(TransferError::EmptyAuthor);
        }
        let license = license.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        Ok(Self { family_name, author, license })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// PostScript-safe name: family name with spaces removed.
    pub fn postscript_name(&self) -> String {
        self.family_name.replace(' ', "")
    }

    /// The explicit license, or the generated default.
    pub fn license_text(&self) -> String {
        match &self.license {
            Some(license) => license.clone(),
            None => format!("© {} All rights reserved", self.author),
        }
    }
}

/// Immutable configuration for one transfer run.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Codepoints to copy, iterated in ascending order.
    pub codepoints: BTreeSet<Codepoint>,
    pub alignment: Alignment,
}

impl TransferOptions {
    pub fn new(codepoints: BTreeSet<Codepoint>, alignment: Alignment) -> Self {
        Self { codepoints, alignment }
    }
}

/// Outcome of a transfer run.
#[derive(Debug, Clone)]
pub struct TransferOutput {
    /// The rebuilt destination font.
    pub data: Vec<u8>,
    /// Codepoints whose glyphs were copied, ascending.
    pub replaced: Vec<Codepoint>,
    /// Requested codepoints absent from the source font, ascending.
    pub skipped: Vec<Codepoint>,
}

impl TransferOutput {
    pub fn stats(&self) -> TransferStats {
        TransferStats { replaced: self.replaced.len(), skipped: self.skipped.len() }
    }
}

/// Counts for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub replaced: usize,
    pub skipped: usize,
}

impl Display for TransferStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "replaced {}, skipped {}", self.replaced, self.skipped)
    }
}
