//! Outline extraction for transferred glyphs.
//!
//! Source glyphs are flattened to plain contours before they are written
//! into the destination: composite components reference glyph IDs in the
//! source glyph order, which mean nothing in the destination font, so each
//! component is resolved recursively with its 2x2 transform and offset
//! applied. Per-glyph hinting instructions are dropped for the same reason
//! they are stripped when merging fonts: they may reference `fpgm`
//! functions or `cvt` values the destination font does not have.

use kurbo::Affine;
use read_fonts::tables::{
    glyf::{Anchor, CurvePoint, Glyf, Glyph as ReadGlyph},
    loca::Loca,
};
use write_fonts::tables::glyf::{Bbox, Contour, Glyph as WriteGlyph, SimpleGlyph};

use crate::error::{Result, TransferError};

/// Composites nesting deeper than this are treated as malformed.
const MAX_COMPONENT_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy)]
struct FlatPoint {
    x: f64,
    y: f64,
    on_curve: bool,
}

/// A glyph outline flattened to absolute, transform-free contours in
/// destination font units.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    contours: Vec<Vec<FlatPoint>>,
}

impl Outline {
    /// Read the glyph for `gid`, resolve composites, and scale every point
    /// by `scale` (the destination/source units-per-em ratio).
    pub fn from_glyph(glyf: &Glyf, loca: &Loca, gid: u16, scale: f64) -> Result<Self> {
        let mut outline = Self::default();
        outline.collect(glyf, loca, gid, Affine::scale(scale), 0)?;
        Ok(outline)
    }

    fn collect(
        &mut self,
        glyf: &Glyf,
        loca: &Loca,
        gid: u16,
        transform: Affine,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_COMPONENT_DEPTH {
            return Err(TransferError::ComponentDepthExceeded(gid, MAX_COMPONENT_DEPTH));
        }

        let glyph = match loca.get_glyf(read_fonts::types::GlyphId::new(gid as u32), glyf) {
            Ok(Some(g)) => g,
            _ => return Ok(()),
        };

        match glyph {
            ReadGlyph::Simple(simple) => {
                let mut points_iter = simple.points();
                let mut current_point = 0usize;

                for end_pt in simple.end_pts_of_contours() {
                    let end = end_pt.get() as usize;
                    let mut contour = Vec::with_capacity(end + 1 - current_point);

                    while current_point <= end {
                        if let Some(pt) = points_iter.next() {
                            let mapped =
                                transform * kurbo::Point::new(pt.x as f64, pt.y as f64);
                            contour.push(FlatPoint {
                                x: mapped.x,
                                y: mapped.y,
                                on_curve: pt.on_curve,
                            });
                        }
                        current_point += 1;
                    }

                    if !contour.is_empty() {
                        self.contours.push(contour);
                    }
                }
            }
            ReadGlyph::Composite(composite) => {
                for comp in composite.components() {
                    let (dx, dy) = match comp.anchor {
                        Anchor::Offset { x, y } => (x as f64, y as f64),
                        // Point anchors need the component outlines to
                        // resolve; fontTools also falls back to no offset.
                        Anchor::Point { .. } => (0.0, 0.0),
                    };
                    let t = comp.transform;
                    let component = Affine::new([
                        t.xx.to_f32() as f64,
                        t.yx.to_f32() as f64,
                        t.xy.to_f32() as f64,
                        t.yy.to_f32() as f64,
                        dx,
                        dy,
                    ]);
                    self.collect(
                        glyf,
                        loca,
                        comp.glyph.to_u16(),
                        transform * component,
                        depth + 1,
                    )?;
                }
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Lowest and highest y coordinate across all points.
    pub fn vertical_bounds(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for point in self.contours.iter().flatten() {
            bounds = Some(match bounds {
                None => (point.y, point.y),
                Some((min, max)) => (min.min(point.y), max.max(point.y)),
            });
        }
        bounds
    }

    /// Round to font units after shifting vertically by `dy`.
    ///
    /// The rebuilt glyph is always a simple glyph with no instructions;
    /// an outline with no contours becomes an empty glyph.
    pub fn into_glyph(self, dy: f64) -> WriteGlyph {
        if self.contours.is_empty() {
            return WriteGlyph::Empty;
        }

        let contours: Vec<Contour> = self
            .contours
            .into_iter()
            .map(|points| {
                points
                    .into_iter()
                    .map(|p| {
                        CurvePoint::new(
                            clamp_i16(p.x.round()),
                            clamp_i16((p.y + dy).round()),
                            p.on_curve,
                        )
                    })
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect();

        let mut glyph = SimpleGlyph { bbox: Bbox::default(), contours, instructions: vec![] };
        glyph.recompute_bounding_box();
        WriteGlyph::Simple(glyph)
    }
}

pub(crate) fn clamp_i16(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Outline {
        Outline {
            contours: vec![vec![
                FlatPoint { x: 0.0, y: 0.0, on_curve: true },
                FlatPoint { x: size, y: 0.0, on_curve: true },
                FlatPoint { x: size, y: size, on_curve: true },
                FlatPoint { x: 0.0, y: size, on_curve: true },
            ]],
        }
    }

    #[test]
    fn test_vertical_bounds() {
        assert_eq!(square(700.0).vertical_bounds(), Some((0.0, 700.0)));
        assert_eq!(Outline::default().vertical_bounds(), None);
    }

    #[test]
    fn test_into_glyph_applies_shift() {
        let glyph = square(700.0).into_glyph(-100.0);
        let WriteGlyph::Simple(simple) = glyph else {
            panic!("expected simple glyph");
        };
        assert_eq!(simple.bbox.y_min, -100);
        assert_eq!(simple.bbox.y_max, 600);
        assert_eq!(simple.bbox.x_min, 0);
        assert_eq!(simple.bbox.x_max, 700);
    }

    #[test]
    fn test_empty_outline_becomes_empty_glyph() {
        assert!(matches!(Outline::default().into_glyph(0.0), WriteGlyph::Empty));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_i16(40000.0), i16::MAX);
        assert_eq!(clamp_i16(-40000.0), i16::MIN);
        assert_eq!(clamp_i16(12.0), 12);
    }
}
