//! Font definition model and its JSON representation.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Horizontal advance of a single character.
///
/// Whole values are written as JSON integers once [normalized](Advance::normalized).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Advance {
    /// An integral advance.
    Int(i64),
    /// A fractional (or not yet normalized) advance.
    Float(f64),
}

impl Advance {
    /// The advance as a real number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self) -> f64 {
        match self {
            Advance::Int(v) => v as f64,
            Advance::Float(v) => v,
        }
    }

    /// Stores whole-numbered values as integers. The value itself is unchanged.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn normalized(self) -> Self {
        match self {
            Advance::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Advance::Int(v as i64),
            other => other,
        }
    }
}

/// Character to advance mapping, in declaration order.
pub type AdvanceMap = IndexMap<char, Advance>;

/// Applies [`Advance::normalized`] to every entry of `advances`.
pub fn normalize_advances(advances: &mut AdvanceMap) {
    for advance in advances.values_mut() {
        *advance = advance.normalized();
    }
}

/// Characters a vector font provider leaves out, written either as one string
/// or as a list of strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Skip {
    /// `"skip": "abc"`
    Chars(String),
    /// `"skip": ["ab", "c"]`
    List(Vec<String>),
}

impl Default for Skip {
    fn default() -> Self {
        Skip::Chars(String::new())
    }
}

impl Skip {
    /// All skipped characters, deduplicated.
    #[must_use]
    pub fn to_set(&self) -> BTreeSet<char> {
        match self {
            Skip::Chars(chars) => chars.chars().collect(),
            Skip::List(list) => list.iter().flat_map(|s| s.chars()).collect(),
        }
    }
}

fn default_ttf_size() -> f32 {
    11.0
}

fn default_oversample() -> f32 {
    1.0
}

fn default_cell_height() -> f64 {
    8.0
}

/// A vector font provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TtfSource {
    /// Namespaced id of the font file, relative to `font/`.
    pub file: String,
    /// Nominal pixel size.
    #[serde(default = "default_ttf_size")]
    pub size: f32,
    /// Oversampling factor the font is rendered at.
    #[serde(default = "default_oversample")]
    pub oversample: f32,
    /// Characters left out of the converted provider.
    #[serde(default)]
    pub skip: Skip,
}

/// A raster glyph sheet provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BitmapSource {
    /// Namespaced id of the image, relative to `textures/`.
    pub file: String,
    /// Glyph grid, one string per row of cells.
    pub chars: Vec<String>,
    /// Logical glyph height the cells are scaled to.
    #[serde(default = "default_cell_height")]
    pub height: f64,
}

/// An explicit width for an inclusive range of codepoints in a unihex font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeOverride {
    /// First character of the range.
    pub from: char,
    /// Last character of the range.
    pub to: char,
    /// Leftmost drawn pixel column.
    pub left: i32,
    /// Rightmost drawn pixel column.
    pub right: i32,
}

/// A hex bitmap font provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnihexSource {
    /// Namespaced id of the archive holding the `.hex` file.
    pub hex_file: String,
    /// Width overrides, checked in order.
    #[serde(default)]
    pub size_overrides: Vec<SizeOverride>,
}

/// Kind-specific part of a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderKind {
    /// Includes all providers of another font.
    Reference {
        /// Namespaced id of the referenced font.
        id: String,
    },
    /// Blank glyphs with explicit advances.
    Space {
        /// Advance of every character.
        advances: AdvanceMap,
    },
    /// Glyphs from a vector font.
    Ttf(TtfSource),
    /// Glyphs cut from an image.
    Bitmap(BitmapSource),
    /// Glyphs from a unifont style `.hex` file.
    Unihex(UnihexSource),
}

impl ProviderKind {
    const NAMES: [&'static str; 5] = ["reference", "space", "ttf", "bitmap", "unihex"];

    /// The `type` string of this kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Reference { .. } => "reference",
            ProviderKind::Space { .. } => "space",
            ProviderKind::Ttf(_) => "ttf",
            ProviderKind::Bitmap(_) => "bitmap",
            ProviderKind::Unihex(_) => "unihex",
        }
    }
}

/// One entry of a font definition's `providers` list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Provider {
    /// What the provider renders and from where.
    #[serde(flatten)]
    pub kind: ProviderKind,
    /// Opaque filter criteria, carried over untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

impl Provider {
    /// A provider without filter.
    #[must_use]
    pub fn new(kind: ProviderKind) -> Self {
        Provider { kind, filter: None }
    }

    /// A space provider with the given advances.
    #[must_use]
    pub fn space(advances: AdvanceMap) -> Self {
        Provider::new(ProviderKind::Space { advances })
    }

    /// Parses a provider from its JSON object.
    ///
    /// # Errors
    ///
    /// Fails when `type` is missing or unknown, or when the kind-specific
    /// fields do not match the kind.
    pub fn from_value(mut value: Value) -> Result<Self> {
        let filter = value.as_object_mut().and_then(|object| object.remove("filter"));
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(Error::MissingProviderKind)?
            .to_owned();
        if !ProviderKind::NAMES.contains(&kind.as_str()) {
            return Err(Error::UnknownProviderKind(kind));
        }
        let kind = serde_json::from_value(value)
            .map_err(|source| Error::MalformedProvider { kind, source })?;
        Ok(Provider { kind, filter })
    }
}

#[derive(Deserialize)]
struct RawDefinition {
    providers: Vec<Value>,
}

#[derive(Serialize)]
struct DefinitionRef<'a> {
    providers: &'a [Provider],
}

/// Reads the provider list of the font definition at `path`.
///
/// Trailing commas before a closing bracket or brace are accepted.
///
/// # Errors
///
/// Fails when the file cannot be read, is not valid JSON, or holds an
/// invalid provider.
pub fn load_font_definition(path: &Path) -> Result<Vec<Provider>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
    let raw: RawDefinition = serde_json::from_str(&strip_trailing_commas(&text))
        .map_err(|source| Error::MalformedDefinition { path: path.to_owned(), source })?;
    raw.providers.into_iter().map(Provider::from_value).collect()
}

/// Writes `providers` as a compact font definition to `path`, creating
/// parent directories as needed. Non-ASCII characters are written as-is.
///
/// # Errors
///
/// Fails when the file or its directories cannot be written.
pub fn store_font_definition(path: &Path, providers: &[Provider]) -> Result<()> {
    let io_err = |source| Error::Io { path: path.to_owned(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer(&mut writer, &DefinitionRef { providers })
        .map_err(|source| Error::Io { path: path.to_owned(), source: source.into() })?;
    writer.flush().map_err(io_err)
}

/// Removes commas that directly precede `]` or `}` (ignoring whitespace),
/// leaving string literals untouched.
#[must_use]
pub fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = text[i + 1..].trim_start().chars().next();
            if matches!(next, Some(']' | '}')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn trailing_commas_are_dropped_outside_strings() {
        let text = r#"{"a": [1, 2, ], "b": ",}", "c": {"d": 1,
        },}"#;
        let parsed: Value = serde_json::from_str(&strip_trailing_commas(text)).unwrap();
        assert_eq!(parsed, json!({"a": [1, 2], "b": ",}", "c": {"d": 1}}));
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let text = r#"["a\",]", ]"#;
        assert_eq!(strip_trailing_commas(text), r#"["a\",]" ]"#);
    }

    #[test]
    fn parses_every_kind() {
        let reference = Provider::from_value(json!({"type": "reference", "id": "x:y"})).unwrap();
        assert_eq!(reference.kind, ProviderKind::Reference { id: "x:y".into() });

        let ttf = Provider::from_value(json!({"type": "ttf", "file": "a.ttf", "shift": [0, 1]})).unwrap();
        let ProviderKind::Ttf(ttf) = ttf.kind else { panic!("not a ttf provider") };
        assert_eq!(ttf.size, 11.0);
        assert_eq!(ttf.oversample, 1.0);
        assert!(ttf.skip.to_set().is_empty());

        let bitmap = Provider::from_value(json!({
            "type": "bitmap", "file": "f.png", "ascent": 7, "chars": ["ab"]
        }))
        .unwrap();
        let ProviderKind::Bitmap(bitmap) = bitmap.kind else { panic!("not a bitmap provider") };
        assert_eq!(bitmap.height, 8.0);

        let unihex = Provider::from_value(json!({
            "type": "unihex",
            "hex_file": "u.zip",
            "size_overrides": [{"from": "\u{0}", "to": "\u{0}", "left": 0, "right": 0}]
        }))
        .unwrap();
        let ProviderKind::Unihex(unihex) = unihex.kind else { panic!("not a unihex provider") };
        assert_eq!(unihex.size_overrides[0].from, '\0');
    }

    #[test]
    fn skip_accepts_string_or_list() {
        let as_list: Skip = serde_json::from_value(json!(["ab", "b", "c"])).unwrap();
        let as_string: Skip = serde_json::from_value(json!("cab")).unwrap();
        assert_eq!(as_list.to_set(), as_string.to_set());
        assert_eq!(as_list.to_set().len(), 3);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Provider::from_value(json!({"type": "legacy_unicode"})).unwrap_err();
        assert!(matches!(err, Error::UnknownProviderKind(kind) if kind == "legacy_unicode"));
        let err = Provider::from_value(json!({"file": "a.png"})).unwrap_err();
        assert!(matches!(err, Error::MissingProviderKind));
        let err = Provider::from_value(json!({"type": "bitmap", "file": "a.png"})).unwrap_err();
        assert!(matches!(err, Error::MalformedProvider { .. }));
    }

    #[test]
    fn filter_is_split_off_and_written_back() {
        let provider = Provider::from_value(json!({
            "type": "space",
            "advances": {" ": 4},
            "filter": {"uniform": true}
        }))
        .unwrap();
        assert_eq!(provider.filter, Some(json!({"uniform": true})));
        assert_eq!(
            serde_json::to_value(&provider).unwrap(),
            json!({"type": "space", "advances": {" ": 4}, "filter": {"uniform": true}})
        );
    }

    #[test]
    fn normalization_keeps_values_and_is_idempotent() {
        let mut advances = AdvanceMap::new();
        advances.insert('a', Advance::Float(4.0));
        advances.insert('b', Advance::Float(2.5));
        advances.insert('c', Advance::Int(3));
        normalize_advances(&mut advances);
        assert_eq!(advances[&'a'], Advance::Int(4));
        assert_eq!(advances[&'b'], Advance::Float(2.5));
        let once = advances.clone();
        normalize_advances(&mut advances);
        assert_eq!(advances, once);
        assert_eq!(serde_json::to_string(&advances).unwrap(), r#"{"a":4,"b":2.5,"c":3}"#);
    }

    #[test]
    fn non_ascii_is_written_literally() {
        let mut advances = AdvanceMap::new();
        advances.insert('☃', Advance::Int(9));
        let text = serde_json::to_string(&DefinitionRef { providers: &[Provider::space(advances)] }).unwrap();
        assert_eq!(text, r#"{"providers":[{"type":"space","advances":{"☃":9}}]}"#);
    }
}
