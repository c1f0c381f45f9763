//! Output font naming: family, author, copyright, and license fields.

use chrono::Datelike;
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
    types::NameId,
};

use crate::{error::Result, types::FontMetadata};

const NAME_ID_COPYRIGHT: u16 = 0;
const NAME_ID_FAMILY: u16 = 1;
const NAME_ID_FULL_NAME: u16 = 4;
const NAME_ID_POSTSCRIPT: u16 = 6;
const NAME_ID_DESIGNER: u16 = 9;
const NAME_ID_LICENSE: u16 = 13;
const NAME_ID_TYPOGRAPHIC_FAMILY: u16 = 16;

/// Name IDs that are inserted when the font has no record for them.
const REQUIRED_IDS: [u16; 6] = [
    NAME_ID_COPYRIGHT,
    NAME_ID_FAMILY,
    NAME_ID_FULL_NAME,
    NAME_ID_POSTSCRIPT,
    NAME_ID_DESIGNER,
    NAME_ID_LICENSE,
];

/// Windows platform, Unicode BMP encoding, US English.
const WINDOWS_PLATFORM: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_EN_US: u16 = 0x409;

/// Rewrite the `name` table with the new family name, author, and license,
/// raw-copying every other table. A missing `name` table is built from
/// scratch.
pub fn apply_metadata(data: &[u8], metadata: &FontMetadata) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let name = build_name_table(&font, metadata);

    let mut builder = FontBuilder::new();
    builder.add_table(&name)?;

    let name_tag = Tag::new(b"name");
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if tag == name_tag {
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    Ok(builder.build())
}

/// The replacement string for a name ID, or `None` to keep the original.
fn replacement(metadata: &FontMetadata, year: i32, name_id: u16) -> Option<String> {
    match name_id {
        NAME_ID_COPYRIGHT => Some(format!("Copyright {year}: {}", metadata.author())),
        NAME_ID_FAMILY | NAME_ID_FULL_NAME | NAME_ID_TYPOGRAPHIC_FAMILY => {
            Some(metadata.family_name().to_string())
        }
        NAME_ID_POSTSCRIPT => Some(metadata.postscript_name()),
        NAME_ID_DESIGNER => Some(metadata.author().to_string()),
        NAME_ID_LICENSE => Some(metadata.license_text()),
        _ => None,
    }
}

fn build_name_table(font: &FontRef, metadata: &FontMetadata) -> Name {
    let year = chrono::Local::now().year();
    let mut records: Vec<NameRecord> = Vec::new();
    let mut seen_ids: Vec<u16> = Vec::new();

    if let Ok(name) = font.name() {
        for record in name.name_record() {
            let name_id = record.name_id().to_u16();
            let current = match record.string(name.string_data()) {
                Ok(s) => s.chars().collect::<String>(),
                Err(_) => continue,
            };

            let new_string = replacement(metadata, year, name_id).unwrap_or(current);
            seen_ids.push(name_id);
            records.push(NameRecord::new(
                record.platform_id(),
                record.encoding_id(),
                record.language_id(),
                NameId::new(name_id),
                new_string.into(),
            ));
        }
    }

    for name_id in REQUIRED_IDS {
        if seen_ids.contains(&name_id) {
            continue;
        }
        // replacement() covers every required ID
        let Some(value) = replacement(metadata, year, name_id) else {
            continue;
        };
        records.push(NameRecord::new(
            WINDOWS_PLATFORM,
            WINDOWS_UNICODE_BMP,
            WINDOWS_EN_US,
            NameId::new(name_id),
            value.into(),
        ));
    }

    // The name_record array must stay sorted for the table to validate.
    records.sort();
    Name::new(records)
}
