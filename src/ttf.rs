//! Advances of glyphs from a vector font.

use std::collections::BTreeSet;
use std::path::Path;

use owned_ttf_parser::AsFaceRef;
use rusttype::{Font, GlyphId, Scale};

use crate::definition::{Advance, AdvanceMap};
use crate::error::{Error, Result};

/// A parsed vector font with usable horizontal metrics.
#[derive(Debug)]
pub struct VectorFont {
    font: Font<'static>,
    units_per_em: f32,
    unit_scale: Scale,
}

impl VectorFont {
    /// Parses the font file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not a font, or has a zero em
    /// size or non-positive line height.
    pub fn open(path: &Path) -> Result<Self> {
        let parse_err = || Error::FontParse { path: path.to_owned() };
        let data = std::fs::read(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
        let font = Font::try_from_vec(data).ok_or_else(parse_err)?;

        let units_per_em = f32::from(font.units_per_em());
        let vmetrics = font.v_metrics_unscaled();
        let height = vmetrics.ascent - vmetrics.descent;
        if units_per_em <= 0.0 || height <= 0.0 {
            return Err(parse_err());
        }
        // rusttype scales by pixel height (ascent - descent); scaling by that
        // height in font units yields unscaled advances.
        Ok(VectorFont { font, units_per_em, unit_scale: Scale::uniform(height) })
    }

    /// Every character the font maps to a glyph, in codepoint order.
    #[must_use]
    pub fn mapped_chars(&self) -> BTreeSet<char> {
        let face = match &self.font {
            Font::Ref(face) => &**face,
            Font::Owned(face) => face.as_face_ref(),
        };
        let mut chars = BTreeSet::new();
        let Some(cmap) = face.tables().cmap else {
            return chars;
        };
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|codepoint| {
                if let Some(c) = char::from_u32(codepoint) {
                    chars.insert(c);
                }
            });
        }
        chars.retain(|&c| self.font.glyph(c).id() != GlyphId(0));
        chars
    }

    /// Unhinted advance of `c` in font units.
    #[must_use]
    pub fn advance_units(&self, c: char) -> f32 {
        self.font.glyph(c).scaled(self.unit_scale).h_metrics().advance_width
    }
}

/// Rounds a pixel distance to the 1/64 pixel grid a 26.6 fixed point advance lives on.
#[must_use]
pub fn to_26_6(pixels: f32) -> f32 {
    (pixels * 64.0).round() / 64.0
}

/// Unhinted advances of all characters of `font` not in `skip`.
///
/// The font is laid out at `size * oversample` pixels per em; each advance
/// is divided by `oversample` again and multiplied by `factor`.
#[must_use]
pub fn ttf_advances(
    font: &VectorFont,
    size: f32,
    oversample: f32,
    skip: &BTreeSet<char>,
    factor: f64,
) -> AdvanceMap {
    let pixels_per_em = size * oversample;
    font.mapped_chars()
        .into_iter()
        .filter(|c| !skip.contains(c))
        .map(|c| {
            let pixels = to_26_6(font.advance_units(c) * pixels_per_em / font.units_per_em);
            (c, Advance::Float(f64::from(pixels / oversample) * factor))
        })
        .collect()
}
