//! Derives width-only "space" fonts from resource pack font definitions.
//!
//! Every provider of a font definition (vector fonts, glyph sheets, unihex
//! archives, space providers and references to other fonts) is replaced by
//! blank glyphs whose advance equals the original character's advance,
//! multiplied by a factor. The result keeps a text's layout while drawing
//! nothing.
//!
//! # Usage
//! ```no_run
//! # fn test() -> width_fonts::Result<()> {
//! use width_fonts::{convert_font, ConversionContext, PackLayout, UnihexMode};
//!
//! let ctx = ConversionContext {
//!     suffix: "_space".into(),
//!     factor: 1.0,
//!     pack: PackLayout::new("my_pack").with_fallback("vanilla_pack"),
//!     unihex_mode: UnihexMode::Ascii,
//! };
//! // Reads assets/minecraft/font/default.json and writes
//! // assets/minecraft/font/default_space.json into `my_pack`.
//! let new_id = convert_font(&ctx, "default")?;
//! assert_eq!(new_id, "default_space");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod bitmap;
mod convert;
pub mod definition;
mod error;
pub mod resource;
pub mod ttf;
pub mod unihex;

pub use convert::{convert_font, merge_advances, scale_advances, ConversionContext, FontConverter};
pub use definition::{Advance, AdvanceMap, Provider, ProviderKind};
pub use error::{Error, Result};
pub use resource::{Access, PackLayout};
pub use unihex::UnihexMode;

#[cfg(feature = "bin")]
mod cli;

#[cfg(feature = "bin")]
pub use cli::{run, Args};
