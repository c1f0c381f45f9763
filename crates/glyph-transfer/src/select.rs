//! Codepoint selection: the union of an inclusive hex range and an
//! explicit comma-separated hex list, with set semantics.

use std::collections::BTreeSet;

use crate::{
    error::{Result, TransferError},
    types::Codepoint,
};

/// Parse a single hex codepoint token.
///
/// Accepts an optional `0x`/`0X` or `U+`/`u+` prefix. Values above
/// U+10FFFF, empty tokens, and non-hex input are rejected; a typo in a
/// selection is fatal so the user finds out before any font is touched.
pub fn parse_codepoint(token: &str) -> Result<Codepoint> {
    let cleaned = token.trim();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .or_else(|| cleaned.strip_prefix("U+"))
        .or_else(|| cleaned.strip_prefix("u+"))
        .unwrap_or(cleaned);

    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| TransferError::InvalidCodepoint(cleaned.to_string()))?;
    if value > Codepoint::MAX {
        return Err(TransferError::InvalidCodepoint(cleaned.to_string()));
    }
    Ok(Codepoint::new(value))
}

/// Accumulates the selected codepoints for a run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    codepoints: BTreeSet<Codepoint>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the inclusive range `[start, end]`, both given as hex tokens.
    pub fn add_range(&mut self, start: &str, end: &str) -> Result<()> {
        let start = parse_codepoint(start)?;
        let end = parse_codepoint(end)?;
        if start > end {
            return Err(TransferError::InvertedRange {
                start: start.to_u32(),
                end: end.to_u32(),
            });
        }
        self.codepoints.extend((start.to_u32()..=end.to_u32()).map(Codepoint::new));
        Ok(())
    }

    /// Add a comma-separated list of hex tokens. Empty tokens are ignored;
    /// malformed ones are fatal.
    pub fn add_list(&mut self, list: &str) -> Result<()> {
        for token in list.split(',') {
            if token.trim().is_empty() {
                continue;
            }
            let cp = parse_codepoint(token)?;
            self.codepoints.insert(cp);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    /// Finish, failing if nothing was selected.
    pub fn build(self) -> Result<BTreeSet<Codepoint>> {
        if self.codepoints.is_empty() {
            return Err(TransferError::NoCodepoints);
        }
        Ok(self.codepoints)
    }
}
