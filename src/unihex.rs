//! Advances of glyphs from unifont style `.hex` bitmap fonts.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::definition::{Advance, AdvanceMap, SizeOverride};
use crate::error::{Error, Result};

/// Highest codepoint kept by [`UnihexMode::Ascii`].
pub const ASCII_LIMIT: u32 = 256;

/// Which codepoints of a hex font end up in the converted font.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnihexMode {
    /// Drop unihex providers entirely.
    None,
    /// Only codepoints up to [`ASCII_LIMIT`].
    #[default]
    Ascii,
    /// Codepoints up to [`ASCII_LIMIT`] plus everything covered by a size override.
    AllNamed,
    /// Every codepoint in the hex file.
    All,
}

impl FromStr for UnihexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(UnihexMode::None),
            "ascii" => Ok(UnihexMode::Ascii),
            "all_named" => Ok(UnihexMode::AllNamed),
            "all" => Ok(UnihexMode::All),
            _ => Err(format!(
                "unknown unihex mode \"{s}\": expected one of none, ascii, all_named, all"
            )),
        }
    }
}

impl fmt::Display for UnihexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnihexMode::None => "none",
            UnihexMode::Ascii => "ascii",
            UnihexMode::AllNamed => "all_named",
            UnihexMode::All => "all",
        })
    }
}

impl SizeOverride {
    /// Whether `codepoint` lies in the inclusive `from..=to` range.
    #[must_use]
    pub fn contains(&self, codepoint: u32) -> bool {
        (u32::from(self.from)..=u32::from(self.to)).contains(&codepoint)
    }

    /// Drawn width of the range, 0 for the `\0..=\0` range.
    #[must_use]
    pub fn width(&self) -> i32 {
        if self.from == '\0' && self.to == '\0' {
            0
        } else {
            self.right - self.left + 1
        }
    }
}

/// Number of bit columns between the leftmost and rightmost set bit across
/// all 16 rows of a hex bitmap, or 0 for an empty bitmap.
///
/// Returns `None` when the rows are not hexadecimal or wider than 128 bits.
#[must_use]
pub fn bitmap_extent(digits: &str) -> Option<u32> {
    let row_len = digits.len() / 16;
    if row_len == 0 || row_len > 32 || !digits.is_ascii() {
        return None;
    }

    let mut low = u32::MAX;
    let mut high = 0;
    for i in 0..16 {
        let row = u128::from_str_radix(&digits[i * row_len..(i + 1) * row_len], 16).ok()?;
        if row == 0 {
            continue;
        }
        low = low.min(row.trailing_zeros() + 1);
        high = high.max(u128::BITS - row.leading_zeros());
    }
    Some(if high == 0 { 0 } else { high - low + 1 })
}

/// Advances of the glyphs in the text of a `.hex` file, filtered by `mode`.
///
/// Widths come from the first matching size override, else from the bitmap
/// extent; the advance is half the width truncated toward zero, plus one,
/// times `factor`.
///
/// # Errors
///
/// Fails on lines that are not `<codepoint>:<bitmap>` in hexadecimal.
pub fn unihex_advances(
    hex: &str,
    overrides: &[SizeOverride],
    mode: UnihexMode,
    factor: f64,
) -> Result<AdvanceMap> {
    let mut advances = AdvanceMap::new();
    if mode == UnihexMode::None {
        return Ok(advances);
    }

    for (index, line) in hex.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || Error::MalformedHexLine { line: index + 1, content: line.to_owned() };
        let (codepoint, bitmap) = line.split_once(':').ok_or_else(malformed)?;
        let codepoint = u32::from_str_radix(codepoint, 16).map_err(|_| malformed())?;

        if mode == UnihexMode::Ascii && codepoint > ASCII_LIMIT {
            continue;
        }
        let width = match overrides.iter().find(|o| o.contains(codepoint)) {
            Some(size_override) => size_override.width(),
            None if mode == UnihexMode::AllNamed && codepoint > ASCII_LIMIT => continue,
            None => {
                let extent = bitmap_extent(bitmap).ok_or_else(malformed)?;
                i32::try_from(extent).map_err(|_| malformed())?
            }
        };

        let Some(c) = char::from_u32(codepoint) else {
            log::warn!("Skipping U+{codepoint:04X}, which is not a valid character");
            continue;
        };
        let half = (0.5 * f64::from(width)).trunc();
        advances.insert(c, Advance::Float((half + 1.0) * factor));
    }
    Ok(advances)
}

/// Reads the `.hex` file out of the archive at `path`. When several entries
/// end in `.hex`, the last one wins.
///
/// # Errors
///
/// Fails when the archive cannot be read or has no `.hex` entry.
pub fn read_hex_entry(path: &Path) -> Result<String> {
    let archive_err = |source| Error::Archive { path: path.to_owned(), source };
    let file = File::open(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
    let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;

    let mut hex = None;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_err)?;
        if !entry.name().ends_with(".hex") {
            continue;
        }
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|source| Error::Io { path: path.to_owned(), source })?;
        hex = Some(text);
    }
    hex.ok_or_else(|| Error::MissingHexEntry { path: path.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 16x16 glyph whose only ink is `0x18` on row 8.
    const NARROW: &str = "0000000000000000000000000000000000180000000000000000000000000000";
    /// An 8x16 glyph with ink in the two outermost columns.
    const WIDE: &str = "00000000000000000000000000000081";

    #[test]
    fn extent_spans_set_bits() {
        assert_eq!(bitmap_extent(NARROW), Some(2));
        assert_eq!(bitmap_extent(WIDE), Some(8));
        assert_eq!(bitmap_extent(&"0".repeat(32)), Some(0));
    }

    #[test]
    fn extent_combines_rows() {
        let mut rows = vec!["00"; 16];
        rows[2] = "40";
        rows[9] = "04";
        assert_eq!(bitmap_extent(&rows.concat()), Some(5));
    }

    #[test]
    fn extent_rejects_garbage() {
        assert_eq!(bitmap_extent(""), None);
        assert_eq!(bitmap_extent(&"zz".repeat(16)), None);
    }

    #[test]
    fn override_widths() {
        let range = SizeOverride { from: 'a', to: 'z', left: 1, right: 6 };
        assert!(range.contains(u32::from('m')));
        assert!(!range.contains(u32::from('A')));
        assert_eq!(range.width(), 6);
        let null = SizeOverride { from: '\0', to: '\0', left: 3, right: 9 };
        assert_eq!(null.width(), 0);
    }

    #[test]
    fn modes_filter_codepoints() {
        let hex = format!("0041:{WIDE}\n2603:{NARROW}\n");
        let ascii = unihex_advances(&hex, &[], UnihexMode::Ascii, 1.0).unwrap();
        assert_eq!(ascii.keys().copied().collect::<Vec<_>>(), vec!['A']);
        assert_eq!(ascii[&'A'], Advance::Float(5.0));

        let all = unihex_advances(&hex, &[], UnihexMode::All, 1.0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&'☃'], Advance::Float(2.0));

        let named = unihex_advances(&hex, &[], UnihexMode::AllNamed, 1.0).unwrap();
        assert_eq!(named.len(), 1);

        assert!(unihex_advances(&hex, &[], UnihexMode::None, 1.0).unwrap().is_empty());
    }

    #[test]
    fn overrides_take_precedence() {
        let hex = format!("2603:{NARROW}\n0041:{WIDE}");
        let overrides = [
            SizeOverride { from: '☀', to: '☃', left: 0, right: 9 },
            SizeOverride { from: '☃', to: '☃', left: 0, right: 1 },
            SizeOverride { from: 'A', to: 'A', left: 0, right: -2 },
        ];
        let named = unihex_advances(&hex, &overrides, UnihexMode::AllNamed, 2.0).unwrap();
        assert_eq!(named[&'☃'], Advance::Float(12.0));
        assert_eq!(named[&'A'], Advance::Float(2.0));
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let hex = format!("0041:{WIDE}\n\nnot a glyph\n");
        let err = unihex_advances(&hex, &[], UnihexMode::All, 1.0).unwrap_err();
        assert!(matches!(err, Error::MalformedHexLine { line: 3, .. }));
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in [UnihexMode::None, UnihexMode::Ascii, UnihexMode::AllNamed, UnihexMode::All] {
            assert_eq!(mode.to_string().parse::<UnihexMode>(), Ok(mode));
        }
        assert!("everything".parse::<UnihexMode>().is_err());
    }
}
