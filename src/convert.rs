//! Turning every provider of a font into width-only space providers.

use std::collections::HashSet;

use crate::bitmap::{bitmap_advances, load_sheet};
use crate::definition::{
    load_font_definition, normalize_advances, store_font_definition, Advance, AdvanceMap,
    Provider, ProviderKind,
};
use crate::error::{Error, Result};
use crate::resource::{Access, PackLayout};
use crate::ttf::{ttf_advances, VectorFont};
use crate::unihex::{read_hex_entry, unihex_advances, UnihexMode};

/// Settings shared by every conversion of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionContext {
    /// Appended to the id of every converted font.
    pub suffix: String,
    /// Multiplier applied to every advance.
    pub factor: f64,
    /// Where resources are read from and converted fonts written to.
    pub pack: PackLayout,
    /// Which unihex codepoints are kept.
    pub unihex_mode: UnihexMode,
}

/// Converts fonts (and the fonts they reference) under one [`ConversionContext`].
#[derive(Debug)]
pub struct FontConverter<'a> {
    ctx: &'a ConversionContext,
    in_progress: Vec<String>,
    converted: HashSet<String>,
}

impl<'a> FontConverter<'a> {
    /// A converter that has not converted anything yet.
    #[must_use]
    pub fn new(ctx: &'a ConversionContext) -> Self {
        FontConverter { ctx, in_progress: Vec::new(), converted: HashSet::new() }
    }

    /// Converts the font `font_id` and writes the result under
    /// `font_id + suffix`, which is returned.
    ///
    /// Referenced fonts are converted and written first. A font converted
    /// earlier by this converter is not converted again.
    ///
    /// # Errors
    ///
    /// Fails on missing or malformed resources, unknown provider kinds and
    /// reference cycles. Nothing is written for a font whose conversion fails.
    pub fn convert_font(&mut self, font_id: &str) -> Result<String> {
        let new_font_id = format!("{font_id}{}", self.ctx.suffix);
        if self.converted.contains(font_id) {
            return Ok(new_font_id);
        }
        if self.in_progress.iter().any(|id| id == font_id) {
            let mut chain = self.in_progress.clone();
            chain.push(font_id.to_owned());
            return Err(Error::ReferenceCycle { chain: chain.join(" -> ") });
        }

        log::info!("Converting font \"{font_id}\" to \"{new_font_id}\"");
        let old_path = self.ctx.pack.font_definition(font_id, Access::Read)?;
        let new_path = self.ctx.pack.font_definition(&new_font_id, Access::Write)?;
        if !old_path.is_file() {
            return Err(Error::ResourceNotFound { path: old_path });
        }
        let providers = load_font_definition(&old_path)?;

        self.in_progress.push(font_id.to_owned());
        let converted = self.convert_providers(&providers);
        self.in_progress.pop();

        store_font_definition(&new_path, &converted?)?;
        self.converted.insert(font_id.to_owned());
        Ok(new_font_id)
    }

    /// Converts a provider list and merges the filter-less space providers
    /// into a single one placed after all other providers.
    ///
    /// # Errors
    ///
    /// Fails when any provider fails to convert.
    pub fn convert_providers(&mut self, providers: &[Provider]) -> Result<Vec<Provider>> {
        let mut others = Vec::new();
        let mut spaces = Vec::new();

        for provider in providers {
            let Some(mut kind) = self.convert_provider(&provider.kind)? else {
                continue;
            };
            if let ProviderKind::Space { advances } = &mut kind {
                normalize_advances(advances);
            }
            match (&provider.filter, kind) {
                (Some(filter), kind) => others.push(Provider { kind, filter: Some(filter.clone()) }),
                (None, ProviderKind::Space { advances }) => spaces.push(advances),
                (None, kind) => others.push(Provider::new(kind)),
            }
        }

        if let Some(advances) = merge_advances(spaces) {
            others.push(Provider::space(advances));
        }
        Ok(others)
    }

    /// Converts a single provider. `None` means the provider is dropped.
    ///
    /// # Errors
    ///
    /// Fails when a resource the provider needs is missing or malformed, or
    /// when a referenced font fails to convert.
    pub fn convert_provider(&mut self, kind: &ProviderKind) -> Result<Option<ProviderKind>> {
        let ctx = self.ctx;
        let (factor, pack) = (ctx.factor, &ctx.pack);
        let advances = match kind {
            ProviderKind::Reference { id } => {
                let id = self.convert_font(id)?;
                return Ok(Some(ProviderKind::Reference { id }));
            }
            ProviderKind::Space { advances } => scale_advances(advances, factor),
            ProviderKind::Ttf(source) => {
                log::info!("Parsing file \"{}\"", source.file);
                let font = VectorFont::open(&pack.existing(&source.file, "font", "")?)?;
                ttf_advances(&font, source.size, source.oversample, &source.skip.to_set(), factor)
            }
            ProviderKind::Bitmap(source) => {
                log::info!("Parsing file \"{}\"", source.file);
                let sheet = load_sheet(&pack.existing(&source.file, "textures", "")?)?;
                bitmap_advances(&sheet, &source.chars, source.height, factor)
            }
            ProviderKind::Unihex(source) => {
                if ctx.unihex_mode == UnihexMode::None {
                    return Ok(None);
                }
                log::info!("Parsing file \"{}\"", source.hex_file);
                let hex = read_hex_entry(&pack.existing(&source.hex_file, "", "")?)?;
                let advances =
                    unihex_advances(&hex, &source.size_overrides, ctx.unihex_mode, factor)?;
                if advances.is_empty() {
                    log::debug!("No characters of \"{}\" were kept", source.hex_file);
                    return Ok(None);
                }
                advances
            }
        };
        Ok(Some(ProviderKind::Space { advances }))
    }
}

/// Multiplies every advance by `factor`.
#[must_use]
pub fn scale_advances(advances: &AdvanceMap, factor: f64) -> AdvanceMap {
    advances
        .iter()
        .map(|(&c, advance)| (c, Advance::Float(advance.value() * factor)))
        .collect()
}

/// Folds the advance maps into the first one, from the last map backwards,
/// so that later maps win on shared characters.
#[must_use]
pub fn merge_advances(mut spaces: Vec<AdvanceMap>) -> Option<AdvanceMap> {
    while spaces.len() > 1 {
        let last = spaces.pop()?;
        let target = spaces.last_mut()?;
        log::debug!("Merging {} advances into a space provider", last.len());
        target.extend(last);
    }
    spaces.pop()
}

/// Converts `font_id` with a fresh [`FontConverter`] and returns the new font id.
///
/// # Errors
///
/// See [`FontConverter::convert_font`].
pub fn convert_font(ctx: &ConversionContext, font_id: &str) -> Result<String> {
    FontConverter::new(ctx).convert_font(font_id)
}
