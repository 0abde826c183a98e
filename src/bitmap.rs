//! Advances of glyphs cut from a raster glyph sheet.

use std::path::Path;

use image::RgbaImage;

use crate::definition::{Advance, AdvanceMap};
use crate::error::{Error, Result};

/// Decodes the glyph sheet at `path` into RGBA pixels.
///
/// # Errors
///
/// Fails when the file cannot be read or decoded.
pub fn load_sheet(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|source| Error::Image { path: path.to_owned(), source })?;
    Ok(image.to_rgba8())
}

/// Whether any of the `height` pixels from `(x, y)` downwards is not fully transparent.
#[must_use]
pub fn scan_column(image: &RgbaImage, x: u32, y: u32, height: u32) -> bool {
    (y..y + height).any(|row| image.get_pixel(x, row)[3] != 0)
}

/// Width of the drawn part of a cell: one past its rightmost inked column,
/// or 0 for an empty cell.
#[must_use]
pub fn ink_width(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> u32 {
    (0..width)
        .rev()
        .find(|&column| scan_column(image, x + column, y, height))
        .map_or(0, |column| column + 1)
}

/// Advances of every character in the `chars` grid laid over `image`.
///
/// The ink width of each cell is scaled from the cell's pixel height to the
/// logical `height`, rounded half up, padded by one pixel and multiplied by
/// `factor`. NUL and space cells are left out.
#[must_use]
pub fn bitmap_advances(image: &RgbaImage, chars: &[String], height: f64, factor: f64) -> AdvanceMap {
    let mut advances = AdvanceMap::new();
    let Ok(rows) = u32::try_from(chars.len()) else {
        return advances;
    };
    if rows == 0 {
        return advances;
    }
    let cell_height = image.height() / rows;

    for (y, line) in (0..rows).zip(chars) {
        let Ok(columns) = u32::try_from(line.chars().count()) else {
            continue;
        };
        if columns == 0 {
            continue;
        }
        let cell_width = image.width() / columns;

        for (x, c) in (0..columns).zip(line.chars()) {
            if c == '\0' || c == ' ' {
                continue;
            }
            let width = if cell_height == 0 {
                0.0
            } else {
                let ink = ink_width(image, x * cell_width, y * cell_height, cell_width, cell_height);
                f64::from(ink) * height / f64::from(cell_height)
            };
            let rounded = (0.5 + width).trunc();
            advances.insert(c, Advance::Float((rounded + 1.0) * factor));
        }
    }
    advances
}
