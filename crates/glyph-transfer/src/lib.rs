//! Copy glyph outlines and horizontal metrics from one TrueType font to
//! another for a chosen set of Unicode codepoints, with optional vertical
//! alignment against the destination's prior glyphs.

mod error;
mod metadata;
mod outline;
mod select;
mod transfer;
mod types;

pub use error::{Result, TransferError};
pub use metadata::apply_metadata;
pub use select::{Selection, parse_codepoint};
pub use transfer::transfer;
pub use types::{
    Alignment, Codepoint, FontMetadata, TransferOptions, TransferOutput, TransferStats,
};

/// Transfer glyphs and apply output metadata in one step.
///
/// This is a convenience wrapper around [`transfer`] and [`apply_metadata`]
/// for the common case of producing a finished, renamed font.
///
/// # Example
///
/// ```no_run
/// use fontgraft_transfer::{transfer_and_rename, FontMetadata, TransferOptions, Selection};
///
/// let source = std::fs::read("Source/Hack-Regular.ttf").unwrap();
/// let destination = std::fs::read("Destination/Roboto-Regular.ttf").unwrap();
///
/// let mut selection = Selection::new();
/// selection.add_range("0041", "005A").unwrap();
/// let options = TransferOptions::new(selection.build().unwrap(), Default::default());
/// let metadata = FontMetadata::new("My Face", "Jane", None).unwrap();
///
/// let output = transfer_and_rename(&source, &destination, &options, &metadata).unwrap();
/// std::fs::write("Output/My Face.ttf", &output.data).unwrap();
/// ```
pub fn transfer_and_rename(
    source: &[u8],
    destination: &[u8],
    options: &TransferOptions,
    metadata: &FontMetadata,
) -> Result<TransferOutput> {
    let mut output = transfer(source, destination, options)?;
    output.data = apply_metadata(&output.data, metadata)?;
    Ok(output)
}
