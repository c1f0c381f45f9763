//! End-to-end transfer tests over minimal TrueType fonts built in memory.

use std::collections::BTreeSet;

use fontgraft_transfer::{
    Alignment, Codepoint, FontMetadata, TransferError, TransferOptions, transfer,
    transfer_and_rename,
};
use read_fonts::{FontRef, TableProvider, tables::glyf::CurvePoint, types::GlyphId};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            Glyph, SimpleGlyph, Transform,
        },
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        post::Post,
    },
};

/// One mapped glyph in a test font: a rectangle outline and its metrics.
struct TestGlyph {
    codepoint: u32,
    bbox: (i16, i16, i16, i16),
    advance: u16,
}

fn rect_contour(x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Contour {
    vec![
        CurvePoint::new(x_min, y_min, true),
        CurvePoint::new(x_max, y_min, true),
        CurvePoint::new(x_max, y_max, true),
        CurvePoint::new(x_min, y_max, true),
    ]
    .into()
}

fn rect_glyph(x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Glyph {
    Glyph::Simple(SimpleGlyph {
        bbox: Bbox { x_min, y_min, x_max, y_max },
        contours: vec![rect_contour(x_min, y_min, x_max, y_max)],
        instructions: vec![],
    })
}

fn component(gid: u16, dx: i16, dy: i16, scale: f32) -> Component {
    Component::new(
        font_types::GlyphId16::new(gid),
        Anchor::Offset { x: dx, y: dy },
        Transform {
            xx: font_types::F2Dot14::from_f32(scale),
            yx: font_types::F2Dot14::from_f32(0.0),
            xy: font_types::F2Dot14::from_f32(0.0),
            yy: font_types::F2Dot14::from_f32(scale),
        },
        ComponentFlags::default(),
    )
}

fn v3_post(num_glyphs: u16) -> Post {
    Post {
        version: font_types::Version16Dot16::VERSION_3_0,
        italic_angle: font_types::Fixed::from_f64(0.0),
        underline_position: font_types::FWord::new(-100),
        underline_thickness: font_types::FWord::new(50),
        is_fixed_pitch: 0,
        min_mem_type42: 0,
        max_mem_type42: 0,
        min_mem_type1: 0,
        max_mem_type1: 0,
        num_glyphs: Some(num_glyphs),
        glyph_name_index: None,
        string_data: None,
    }
}

fn v2_post(num_glyphs: u16) -> Post {
    Post {
        version: font_types::Version16Dot16::VERSION_2_0,
        // every glyph named ".notdef" via standard Mac name index 0
        glyph_name_index: Some(vec![0; num_glyphs as usize]),
        string_data: Some(vec![]),
        ..v3_post(num_glyphs)
    }
}

/// Assemble a font from an explicit glyph set (GID 0 included), cmap
/// mappings, per-glyph metrics, and a post table.
fn assemble_font(
    units_per_em: u16,
    glyphs: &[Glyph],
    mappings: Vec<(char, GlyphId)>,
    h_metrics: Vec<LongMetric>,
    post: Post,
) -> Vec<u8> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    for glyph in glyphs {
        glyf_builder.add_glyph(glyph).unwrap();
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let cmap = Cmap::from_mappings(mappings).expect("cmap");

    let head = Head {
        font_revision: font_types::Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: write_fonts::tables::head::Flags::empty(),
        units_per_em,
        created: font_types::LongDateTime::new(0),
        modified: font_types::LongDateTime::new(0),
        x_min: 0,
        y_min: -200,
        x_max: 1000,
        y_max: 800,
        mac_style: write_fonts::tables::head::MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            write_fonts::tables::loca::LocaFormat::Short => 0,
            write_fonts::tables::loca::LocaFormat::Long => 1,
        },
    };

    let hhea = Hhea {
        ascender: font_types::FWord::new(700),
        descender: font_types::FWord::new(-200),
        line_gap: font_types::FWord::new(0),
        advance_width_max: font_types::UfWord::new(1000),
        min_left_side_bearing: font_types::FWord::new(0),
        min_right_side_bearing: font_types::FWord::new(0),
        x_max_extent: font_types::FWord::new(1000),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: h_metrics.len() as u16,
    };

    let hmtx = Hmtx { h_metrics, left_side_bearings: vec![] };

    let maxp = Maxp {
        num_glyphs: glyphs.len() as u16,
        max_points: Some(4),
        max_contours: Some(1),
        max_composite_points: Some(4),
        max_composite_contours: Some(1),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(2),
        max_component_depth: Some(1),
    };

    let mut builder = FontBuilder::new();
    builder.add_table(&head).unwrap();
    builder.add_table(&hhea).unwrap();
    builder.add_table(&hmtx).unwrap();
    builder.add_table(&maxp).unwrap();
    builder.add_table(&cmap).unwrap();
    builder.add_table(&post).unwrap();
    builder.add_table(&glyf).unwrap();
    builder.add_table(&loca).unwrap();
    builder.build()
}

/// Build a minimal TrueType font: .notdef at GID 0, then one rectangle
/// glyph per entry, mapped in order.
fn make_test_font(units_per_em: u16, glyphs: &[TestGlyph]) -> Vec<u8> {
    make_test_font_with_post(units_per_em, glyphs, v3_post(glyphs.len() as u16 + 1))
}

fn make_test_font_with_post(units_per_em: u16, glyphs: &[TestGlyph], post: Post) -> Vec<u8> {
    let mut built = vec![Glyph::Empty];
    for g in glyphs {
        let (x_min, y_min, x_max, y_max) = g.bbox;
        built.push(rect_glyph(x_min, y_min, x_max, y_max));
    }

    let mappings: Vec<(char, GlyphId)> = glyphs
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            char::from_u32(g.codepoint).map(|ch| (ch, GlyphId::new(i as u32 + 1)))
        })
        .collect();

    let mut h_metrics = vec![LongMetric { advance: 600, side_bearing: 0 }];
    h_metrics.extend(
        glyphs.iter().map(|g| LongMetric { advance: g.advance, side_bearing: g.bbox.0 }),
    );

    assemble_font(units_per_em, &built, mappings, h_metrics, post)
}

fn options(codepoints: &[u32], alignment: Alignment) -> TransferOptions {
    let set: BTreeSet<Codepoint> = codepoints.iter().copied().map(Codepoint::new).collect();
    TransferOptions::new(set, alignment)
}

fn glyph_bbox(data: &[u8], cp: u32) -> Option<(i16, i16, i16, i16)> {
    let font = FontRef::new(data).unwrap();
    let gid = font.cmap().unwrap().map_codepoint(cp)?;
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    match loca.get_glyf(gid, &glyf).unwrap()? {
        read_fonts::tables::glyf::Glyph::Simple(g) => {
            Some((g.x_min(), g.y_min(), g.x_max(), g.y_max()))
        }
        read_fonts::tables::glyf::Glyph::Composite(g) => {
            Some((g.x_min(), g.y_min(), g.x_max(), g.y_max()))
        }
    }
}

fn glyph_metrics(data: &[u8], cp: u32) -> Option<(u16, i16)> {
    let font = FontRef::new(data).unwrap();
    let gid = font.cmap().unwrap().map_codepoint(cp)?;
    let hmtx = font.hmtx().unwrap();
    Some((hmtx.advance(gid).unwrap(), hmtx.side_bearing(gid).unwrap()))
}

fn source_font() -> Vec<u8> {
    make_test_font(
        1000,
        &[
            TestGlyph { codepoint: 0x41, bbox: (50, 0, 450, 700), advance: 500 },
            TestGlyph { codepoint: 0x42, bbox: (60, -10, 460, 710), advance: 520 },
            TestGlyph { codepoint: 0x43, bbox: (70, 20, 470, 720), advance: 540 },
            TestGlyph { codepoint: 0xA9, bbox: (80, 30, 480, 730), advance: 560 },
        ],
    )
}

fn destination_font() -> Vec<u8> {
    // No glyph for U+00A9.
    make_test_font(
        1000,
        &[
            TestGlyph { codepoint: 0x41, bbox: (0, 0, 400, 500), advance: 600 },
            TestGlyph { codepoint: 0x42, bbox: (0, 0, 400, 500), advance: 600 },
            TestGlyph { codepoint: 0x43, bbox: (0, 0, 400, 500), advance: 600 },
        ],
    )
}

fn destination_with_v2_post() -> Vec<u8> {
    make_test_font_with_post(
        1000,
        &[
            TestGlyph { codepoint: 0x41, bbox: (0, 0, 400, 500), advance: 600 },
            TestGlyph { codepoint: 0x42, bbox: (0, 0, 400, 500), advance: 600 },
            TestGlyph { codepoint: 0x43, bbox: (0, 0, 400, 500), advance: 600 },
        ],
        v2_post(4),
    )
}

/// Source font where U+0041 maps to a composite: the base rectangle at
/// GID 1 placed once as-is and once half-scaled, offset by (400, 50).
fn composite_source_font() -> Vec<u8> {
    let union_bbox = Bbox { x_min: 100, y_min: 0, x_max: 550, y_max: 400 };
    let mut combined = CompositeGlyph::new(component(1, 0, 0, 1.0), union_bbox);
    combined.add_component(component(1, 400, 50, 0.5), union_bbox);

    let glyphs = vec![Glyph::Empty, rect_glyph(100, 0, 300, 400), Glyph::Composite(combined)];
    assemble_font(
        1000,
        &glyphs,
        vec![('A', GlyphId::new(2))],
        vec![
            LongMetric { advance: 600, side_bearing: 0 },
            LongMetric { advance: 400, side_bearing: 100 },
            LongMetric { advance: 520, side_bearing: 100 },
        ],
        v3_post(3),
    )
}

/// Source font where U+0041 maps to a chain of ten composites, each
/// wrapping the previous glyph, ending at the rectangle at GID 1.
fn deeply_nested_source_font() -> Vec<u8> {
    let bbox = Bbox { x_min: 0, y_min: 0, x_max: 200, y_max: 200 };
    let mut glyphs = vec![Glyph::Empty, rect_glyph(0, 0, 200, 200)];
    for gid in 1..11u16 {
        glyphs.push(Glyph::Composite(CompositeGlyph::new(component(gid, 0, 0, 1.0), bbox)));
    }

    let h_metrics =
        (0..glyphs.len()).map(|_| LongMetric { advance: 600, side_bearing: 0 }).collect();
    let num_glyphs = glyphs.len() as u16;
    assemble_font(1000, &glyphs, vec![('A', GlyphId::new(11))], h_metrics, v3_post(num_glyphs))
}

#[test]
fn test_transfer_range_plus_explicit() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0x41, 0x42, 0x43, 0xA9], Alignment::SourceTop),
    )
    .unwrap();

    let replaced: Vec<u32> = output.replaced.iter().map(|cp| cp.to_u32()).collect();
    assert_eq!(replaced, vec![0x41, 0x42, 0x43, 0xA9]);
    assert!(output.skipped.is_empty());

    // Outlines come from the source, unshifted.
    assert_eq!(glyph_bbox(&output.data, 0x41), Some((50, 0, 450, 700)));
    assert_eq!(glyph_bbox(&output.data, 0x42), Some((60, -10, 460, 710)));

    // U+00A9 had no destination slot and was appended.
    let font = FontRef::new(&output.data).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 5);
    assert_eq!(glyph_bbox(&output.data, 0xA9), Some((80, 30, 480, 730)));
}

#[test]
fn test_metrics_copied_from_source() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
    )
    .unwrap();

    assert_eq!(glyph_metrics(&output.data, 0x41), Some((500, 50)));
    // Untouched glyph keeps its destination metrics.
    assert_eq!(glyph_metrics(&output.data, 0x42), Some((600, 0)));
}

#[test]
fn test_match_destination_top() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0x41], Alignment::DestinationTop),
    )
    .unwrap();

    // Source top 700 shifted down to the destination's prior top 500.
    assert_eq!(glyph_bbox(&output.data, 0x41), Some((50, -200, 450, 500)));
}

#[test]
fn test_match_destination_bottom() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0x42], Alignment::DestinationBottom),
    )
    .unwrap();

    // Source bottom -10 shifted up to the destination's prior bottom 0.
    assert_eq!(glyph_bbox(&output.data, 0x42), Some((60, 0, 460, 720)));
}

#[test]
fn test_alignment_falls_back_without_destination_glyph() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0xA9], Alignment::DestinationTop),
    )
    .unwrap();

    // Nothing to align against, so the source position is kept.
    assert_eq!(glyph_bbox(&output.data, 0xA9), Some((80, 30, 480, 730)));
}

#[test]
fn test_missing_source_codepoint_is_skipped() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0x41, 0x2764], Alignment::SourceTop),
    )
    .unwrap();

    assert_eq!(output.replaced, vec![Codepoint::new(0x41)]);
    assert_eq!(output.skipped, vec![Codepoint::new(0x2764)]);
    assert_eq!(output.stats().to_string(), "replaced 1, skipped 1");

    // The run still produced a valid font with the other glyph replaced.
    assert_eq!(glyph_bbox(&output.data, 0x41), Some((50, 0, 450, 700)));
}

#[test]
fn test_scaling_by_units_per_em_ratio() {
    let source = make_test_font(
        500,
        &[TestGlyph { codepoint: 0x41, bbox: (25, 0, 225, 350), advance: 250 }],
    );

    let output = transfer(
        &source,
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
    )
    .unwrap();

    // Destination is 1000/em, source 500/em: everything doubles.
    assert_eq!(glyph_bbox(&output.data, 0x41), Some((50, 0, 450, 700)));
    assert_eq!(glyph_metrics(&output.data, 0x41), Some((500, 50)));
}

#[test]
fn test_composite_source_glyph_is_flattened() {
    let output = transfer(
        &composite_source_font(),
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
    )
    .unwrap();

    // Both components resolve against the base rectangle (100,0)-(300,400):
    // the half-scaled copy lands at (450,50)-(550,250), so the union grows
    // to the right.
    assert_eq!(glyph_bbox(&output.data, 0x41), Some((100, 0, 550, 400)));
    assert_eq!(glyph_metrics(&output.data, 0x41), Some((520, 100)));

    // The transferred slot holds plain contours, not component references.
    let font = FontRef::new(&output.data).unwrap();
    let gid = font.cmap().unwrap().map_codepoint(0x41u32).unwrap();
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    assert!(matches!(
        loca.get_glyf(gid, &glyf).unwrap(),
        Some(read_fonts::tables::glyf::Glyph::Simple(_))
    ));
}

#[test]
fn test_component_nesting_limit() {
    let result = transfer(
        &deeply_nested_source_font(),
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
    );
    assert!(matches!(result, Err(TransferError::ComponentDepthExceeded(_, _))));
}

#[test]
fn test_empty_selection_aborts() {
    let result = transfer(
        &source_font(),
        &destination_font(),
        &TransferOptions::default(),
    );
    assert!(matches!(result, Err(TransferError::NoCodepoints)));
}

#[test]
fn test_invalid_font_data() {
    let result = transfer(
        b"not a font",
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
    );
    assert!(matches!(result, Err(TransferError::Read(_))));
}

#[test]
fn test_unrelated_tables_survive() {
    let output = transfer(
        &source_font(),
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
    )
    .unwrap();

    let font = FontRef::new(&output.data).unwrap();
    assert!(font.post().is_ok(), "post table should be carried over raw");
}

#[test]
fn test_appending_glyphs_downgrades_version2_post() {
    let output = transfer(
        &source_font(),
        &destination_with_v2_post(),
        &options(&[0xA9], Alignment::SourceTop),
    )
    .unwrap();

    // U+00A9 got a new glyph ID beyond the version 2.0 name index, so the
    // post table cannot be carried over as-is.
    let font = FontRef::new(&output.data).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 5);
    assert_eq!(font.post().unwrap().version(), font_types::Version16Dot16::VERSION_3_0);
}

#[test]
fn test_version2_post_kept_without_appends() {
    let output = transfer(
        &source_font(),
        &destination_with_v2_post(),
        &options(&[0x41], Alignment::SourceTop),
    )
    .unwrap();

    // Overwriting an existing slot leaves the glyph count alone.
    let font = FontRef::new(&output.data).unwrap();
    assert_eq!(font.post().unwrap().version(), font_types::Version16Dot16::VERSION_2_0);
}

#[test]
fn test_transfer_and_rename() {
    let metadata = FontMetadata::new("MyFace", "Jane", None).unwrap();
    let output = transfer_and_rename(
        &source_font(),
        &destination_font(),
        &options(&[0x41], Alignment::SourceTop),
        &metadata,
    )
    .unwrap();

    let font = FontRef::new(&output.data).unwrap();
    let name = font.name().unwrap();
    let family = name
        .name_record()
        .iter()
        .find(|r| r.name_id().to_u16() == 1)
        .and_then(|r| r.string(name.string_data()).ok())
        .map(|s| s.to_string());
    assert_eq!(family.as_deref(), Some("MyFace"));

    // The glyph transfer still happened.
    assert_eq!(glyph_bbox(&output.data, 0x41), Some((50, 0, 450, 700)));
}
