//! The glyph transfer engine.
//!
//! One pass over the selected codepoints, ascending: look the glyph up in
//! the source font, flatten and scale its outline, align it vertically,
//! and write it into the destination glyph slot along with the source
//! horizontal metrics. The destination font is then rebuilt with fresh
//! `glyf`/`loca`/`hmtx`/`cmap` tables; everything else is carried over raw.

use std::collections::BTreeMap;

use log::{info, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{
        Anchor as ReadAnchor, CompositeGlyph as ReadCompositeGlyph, Glyph as ReadGlyph,
        SimpleGlyph as ReadSimpleGlyph,
    },
    types::{GlyphId, Version16Dot16},
};
use skrifa::MetadataProvider;
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        cmap::{Cmap, Cmap12, CmapSubtable, EncodingRecord, PlatformId, SequentialMapGroup},
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            Glyph as WriteGlyph, SimpleGlyph, Transform,
        },
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        post::Post,
    },
};

use crate::{
    error::{Result, TransferError},
    outline::Outline,
    types::{Alignment, TransferOptions, TransferOutput},
};

/// Copy the selected glyphs from `source` into `destination` and return
/// the rebuilt destination font.
///
/// Codepoints absent from the source font (or mapped to an empty outline)
/// are skipped with a warning; everything else is fatal. Outlines and
/// metrics are scaled by the units-per-em ratio when the two fonts differ.
pub fn transfer(
    source: &[u8],
    destination: &[u8],
    options: &TransferOptions,
) -> Result<TransferOutput> {
    if options.codepoints.is_empty() {
        return Err(TransferError::NoCodepoints);
    }

    let src_font = FontRef::new(source)?;
    let dst_font = FontRef::new(destination)?;

    let src_glyf = src_font.glyf().map_err(|_| TransferError::NoGlyfTable)?;
    let src_loca = src_font.loca(None).map_err(|_| TransferError::NoGlyfTable)?;
    let src_hmtx = src_font.hmtx()?;
    let src_charmap = src_font.charmap();

    let dst_glyf = dst_font.glyf().map_err(|_| TransferError::NoGlyfTable)?;
    let dst_loca = dst_font.loca(None).map_err(|_| TransferError::NoGlyfTable)?;
    let dst_hmtx = dst_font.hmtx()?;

    let scale = dst_font.head()?.units_per_em() as f64 / src_font.head()?.units_per_em() as f64;

    // Destination glyph order is preserved; transferred glyphs overwrite
    // their slot in place, unmapped codepoints get appended slots.
    let num_glyphs = dst_font.maxp()?.num_glyphs();
    let mut glyphs: Vec<WriteGlyph> = Vec::with_capacity(num_glyphs as usize);
    let mut advances: Vec<u16> = Vec::with_capacity(num_glyphs as usize);
    let mut lsbs: Vec<i16> = Vec::with_capacity(num_glyphs as usize);

    for gid in 0..num_glyphs {
        let glyph_id = GlyphId::new(gid as u32);
        let glyph = match dst_loca.get_glyf(glyph_id, &dst_glyf) {
            Ok(Some(g)) => convert_glyph(&g),
            _ => WriteGlyph::Empty,
        };
        glyphs.push(glyph);
        advances.push(dst_hmtx.advance(glyph_id).unwrap_or(0));
        lsbs.push(dst_hmtx.side_bearing(glyph_id).unwrap_or(0));
    }

    let mut mappings = cmap_entries(&dst_font)?;

    let mut replaced = Vec::new();
    let mut skipped = Vec::new();

    for &cp in &options.codepoints {
        let Some(src_gid) = src_charmap.map(cp.to_u32()) else {
            warn!("{cp} missing in source, skipped");
            skipped.push(cp);
            continue;
        };

        let outline =
            Outline::from_glyph(&src_glyf, &src_loca, src_gid.to_u32() as u16, scale)?;
        if outline.is_empty() {
            warn!("{cp} has no outline in source, skipped");
            skipped.push(cp);
            continue;
        }

        let slot = mappings.get(&cp.to_u32()).copied().filter(|&gid| (gid as usize) < glyphs.len());
        let prior_bbox = slot.and_then(|gid| glyphs[gid as usize].bbox());
        let dy = vertical_shift(options.alignment, &outline, prior_bbox);
        let glyph = outline.into_glyph(dy);

        let advance = (src_hmtx.advance(src_gid).unwrap_or(0) as f64 * scale).round() as u16;
        let lsb = (src_hmtx.side_bearing(src_gid).unwrap_or(0) as f64 * scale).round() as i16;

        match slot {
            Some(gid) => {
                glyphs[gid as usize] = glyph;
                advances[gid as usize] = advance;
                lsbs[gid as usize] = lsb;
            }
            None => {
                let gid = glyphs.len() as u16;
                glyphs.push(glyph);
                advances.push(advance);
                lsbs.push(lsb);
                mappings.insert(cp.to_u32(), gid);
            }
        }

        info!("{cp} replaced");
        replaced.push(cp);
    }

    let data = rebuild(&dst_font, &glyphs, &advances, &lsbs, &mappings)?;

    Ok(TransferOutput { data, replaced, skipped })
}

/// Vertical translation for one transferred outline, in destination units.
///
/// When the destination has no prior glyph for the codepoint there is
/// nothing to align against, so the destination-relative modes fall back
/// to keeping the source position.
fn vertical_shift(alignment: Alignment, outline: &Outline, prior: Option<Bbox>) -> f64 {
    let Some((new_bottom, new_top)) = outline.vertical_bounds() else {
        return 0.0;
    };
    match (alignment, prior) {
        (Alignment::SourceTop, _) | (_, None) => 0.0,
        (Alignment::DestinationTop, Some(bbox)) => bbox.y_max as f64 - new_top,
        (Alignment::DestinationBottom, Some(bbox)) => bbox.y_min as f64 - new_bottom,
    }
}

/// Serialize the updated glyph set back into a complete font.
fn rebuild(
    font: &FontRef,
    glyphs: &[WriteGlyph],
    advances: &[u16],
    lsbs: &[i16],
    mappings: &BTreeMap<u32, u16>,
) -> Result<Vec<u8>> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut bounds = FontBounds::default();
    let mut h_metrics = Vec::with_capacity(glyphs.len());

    for (gid, glyph) in glyphs.iter().enumerate() {
        // hmtx LSB must track the glyph's xMin when there is an outline.
        let lsb = glyph.bbox().map(|b| b.x_min).unwrap_or(lsbs[gid]);
        bounds.update(glyph.bbox(), advances[gid], lsb);
        h_metrics.push(LongMetric { advance: advances[gid], side_bearing: lsb });
        glyf_builder.add_glyph(glyph)?;
    }

    let (glyf, loca, loca_format) = glyf_builder.build();
    bounds.finalize();
    let hmtx = Hmtx { h_metrics, left_side_bearings: vec![] };

    let mut head: Head = font.head()?.to_owned_table();
    head.x_min = bounds.x_min;
    head.y_min = bounds.y_min;
    head.x_max = bounds.x_max;
    head.y_max = bounds.y_max;
    head.index_to_loc_format = match loca_format {
        LocaFormat::Short => 0,
        LocaFormat::Long => 1,
    };

    let mut hhea: Hhea = font.hhea()?.to_owned_table();
    hhea.advance_width_max = bounds.advance_width_max.into();
    hhea.min_left_side_bearing = bounds.min_left_side_bearing.into();
    hhea.min_right_side_bearing = bounds.min_right_side_bearing.into();
    hhea.x_max_extent = bounds.x_max_extent.into();
    hhea.number_of_h_metrics = glyphs.len() as u16;

    let mut maxp: Maxp = font.maxp()?.to_owned_table();
    let appended = glyphs.len() as u16 != maxp.num_glyphs;
    maxp.num_glyphs = glyphs.len() as u16;
    let (max_points, max_contours) = simple_glyph_maxima(glyphs);
    maxp.max_points = maxp.max_points.map(|v| v.max(max_points));
    maxp.max_contours = maxp.max_contours.map(|v| v.max(max_contours));

    let cmap = build_cmap_format12(mappings);

    // A version 2.0 post table carries one name index per glyph; appended
    // glyphs would leave it short, so it drops to version 3.0.
    let post = appended
        .then(|| font.post().ok())
        .flatten()
        .filter(|p| p.version() == Version16Dot16::VERSION_2_0)
        .map(|p| {
            let mut post: Post = p.to_owned_table();
            post.version = Version16Dot16::VERSION_3_0;
            post.num_glyphs = None;
            post.glyph_name_index = None;
            post.string_data = None;
            post
        });

    let mut builder = FontBuilder::new();
    builder.add_table(&glyf)?;
    builder.add_table(&loca)?;
    builder.add_table(&hmtx)?;
    builder.add_table(&head)?;
    builder.add_table(&hhea)?;
    builder.add_table(&maxp)?;
    builder.add_table(&cmap)?;
    if let Some(post) = &post {
        builder.add_table(post)?;
    }

    let post_tag = read_fonts::types::Tag::new(b"post");
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if REPLACED_TABLES.contains(&tag) || (post.is_some() && tag == post_tag) {
            continue;
        }
        if let Some(data) = font.table_data(tag) {
            builder.add_raw(tag, data);
        }
    }

    Ok(builder.build())
}

const REPLACED_TABLES: [read_fonts::types::Tag; 7] = [
    read_fonts::types::Tag::new(b"glyf"),
    read_fonts::types::Tag::new(b"loca"),
    read_fonts::types::Tag::new(b"hmtx"),
    read_fonts::types::Tag::new(b"head"),
    read_fonts::types::Tag::new(b"hhea"),
    read_fonts::types::Tag::new(b"maxp"),
    read_fonts::types::Tag::new(b"cmap"),
];

/// Font-wide bounds and metric extremes, recomputed over the final glyph set.
#[derive(Debug, Clone, Copy)]
struct FontBounds {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    advance_width_max: u16,
    min_left_side_bearing: i16,
    min_right_side_bearing: i16,
    x_max_extent: i16,
    has_content: bool,
}

impl Default for FontBounds {
    fn default() -> Self {
        Self {
            x_min: i16::MAX,
            y_min: i16::MAX,
            x_max: i16::MIN,
            y_max: i16::MIN,
            advance_width_max: 0,
            min_left_side_bearing: i16::MAX,
            min_right_side_bearing: i16::MAX,
            x_max_extent: i16::MIN,
            has_content: false,
        }
    }
}

impl FontBounds {
    fn update(&mut self, bbox: Option<Bbox>, advance: u16, lsb: i16) {
        self.advance_width_max = self.advance_width_max.max(advance);
        let Some(bbox) = bbox else {
            return;
        };
        self.has_content = true;
        self.x_min = self.x_min.min(bbox.x_min);
        self.y_min = self.y_min.min(bbox.y_min);
        self.x_max = self.x_max.max(bbox.x_max);
        self.y_max = self.y_max.max(bbox.y_max);
        self.min_left_side_bearing = self.min_left_side_bearing.min(lsb);
        let extent = lsb as i32 + (bbox.x_max as i32 - bbox.x_min as i32);
        let rsb = advance as i32 - extent;
        self.min_right_side_bearing =
            self.min_right_side_bearing.min(rsb.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
        self.x_max_extent =
            self.x_max_extent.max(extent.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
    }

    /// Zero out the sentinels when no glyph had an outline.
    fn finalize(&mut self) {
        if !self.has_content {
            self.x_min = 0;
            self.y_min = 0;
            self.x_max = 0;
            self.y_max = 0;
            self.min_left_side_bearing = 0;
            self.min_right_side_bearing = 0;
            self.x_max_extent = 0;
        }
    }
}

/// Convert a destination glyph to its owned `write-fonts` form, unchanged.
///
/// Glyph IDs inside composites stay valid because the destination glyph
/// order is never reshuffled, only extended.
fn convert_glyph(glyph: &ReadGlyph) -> WriteGlyph {
    match glyph {
        ReadGlyph::Simple(simple) => convert_simple(simple),
        ReadGlyph::Composite(composite) => convert_composite(composite),
    }
}

fn convert_simple(simple: &ReadSimpleGlyph) -> WriteGlyph {
    let mut contours: Vec<Contour> = Vec::new();
    let mut points_iter = simple.points();
    let mut current_point = 0usize;

    for end_pt in simple.end_pts_of_contours() {
        let end = end_pt.get() as usize;
        let mut contour_points = Vec::new();

        while current_point <= end {
            if let Some(pt) = points_iter.next() {
                contour_points.push(read_fonts::tables::glyf::CurvePoint {
                    x: pt.x,
                    y: pt.y,
                    on_curve: pt.on_curve,
                });
            }
            current_point += 1;
        }

        contours.push(contour_points.into());
    }

    let bbox = Bbox {
        x_min: simple.x_min(),
        y_min: simple.y_min(),
        x_max: simple.x_max(),
        y_max: simple.y_max(),
    };

    WriteGlyph::Simple(SimpleGlyph {
        bbox,
        contours,
        instructions: simple.instructions().to_vec(),
    })
}

fn convert_composite(composite: &ReadCompositeGlyph) -> WriteGlyph {
    let bbox = Bbox {
        x_min: composite.x_min(),
        y_min: composite.y_min(),
        x_max: composite.x_max(),
        y_max: composite.y_max(),
    };

    let mut components = composite.components().map(|comp| {
        let anchor = match comp.anchor {
            ReadAnchor::Offset { x, y } => Anchor::Offset { x, y },
            ReadAnchor::Point { base, component } => Anchor::Point { base, component },
        };
        let transform = Transform {
            xx: comp.transform.xx,
            yx: comp.transform.yx,
            xy: comp.transform.xy,
            yy: comp.transform.yy,
        };
        let flags: ComponentFlags = comp.flags.into();
        Component { glyph: comp.glyph, anchor, transform, flags }
    });

    let Some(first) = components.next() else {
        return WriteGlyph::Empty;
    };

    let mut new_composite = CompositeGlyph::new(first, bbox);
    for comp in components {
        new_composite.add_component(comp, bbox);
    }
    WriteGlyph::Composite(new_composite)
}

/// Collect the destination's codepoint-to-glyph mapping. The first
/// subtable that maps a codepoint wins.
fn cmap_entries(font: &FontRef) -> Result<BTreeMap<u32, u16>> {
    let cmap = font.cmap().map_err(|_| TransferError::NoCmap)?;
    let mut entries = BTreeMap::new();

    for record in cmap.encoding_records() {
        let Ok(subtable) = record.subtable(cmap.offset_data()) else {
            continue;
        };
        for (cp, gid) in subtable.iter() {
            let gid = gid.to_u32() as u16;
            if gid != 0 {
                entries.entry(cp).or_insert(gid);
            }
        }
    }

    if entries.is_empty() {
        return Err(TransferError::NoCmap);
    }
    Ok(entries)
}

/// Build a cmap with format 12 subtables only.
///
/// Format 4 cannot represent codepoints beyond the BMP and can overflow
/// its segment counts; format 12 covers everything.
fn build_cmap_format12(mappings: &BTreeMap<u32, u16>) -> Cmap {
    let groups = build_sequential_groups(mappings);
    let cmap12 = Cmap12 { language: 0, groups };

    // Platform 0 (Unicode full) and platform 3 (Windows, Unicode full)
    // records for cross-platform support.
    Cmap::new(vec![
        EncodingRecord::new(PlatformId::Unicode, 4, CmapSubtable::Format12(cmap12.clone())),
        EncodingRecord::new(PlatformId::Windows, 10, CmapSubtable::Format12(cmap12)),
    ])
}

/// Compress sorted mappings into sequential map groups: consecutive
/// codepoints mapping to consecutive glyph IDs share a group.
fn build_sequential_groups(mappings: &BTreeMap<u32, u16>) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::new();

    for (&cp, &gid) in mappings {
        if let Some(last) = groups.last_mut() {
            let next_gid = last.start_glyph_id + (last.end_char_code - last.start_char_code) + 1;
            if cp == last.end_char_code + 1 && gid as u32 == next_gid {
                last.end_char_code = cp;
                continue;
            }
        }
        groups.push(SequentialMapGroup {
            start_char_code: cp,
            end_char_code: cp,
            start_glyph_id: gid as u32,
        });
    }

    groups
}

fn simple_glyph_maxima(glyphs: &[WriteGlyph]) -> (u16, u16) {
    let mut max_points = 0usize;
    let mut max_contours = 0usize;
    for glyph in glyphs {
        if let WriteGlyph::Simple(simple) = glyph {
            let points: usize = simple.contours.iter().map(|c| c.len()).sum();
            max_points = max_points.max(points);
            max_contours = max_contours.max(simple.contours.len());
        }
    }
    (max_points.min(u16::MAX as usize) as u16, max_contours.min(u16::MAX as usize) as u16)
}
