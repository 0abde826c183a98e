use std::path::PathBuf;

use clap::Parser;

use crate::convert::{convert_font, ConversionContext};
use crate::error::{Error, Result};
use crate::resource::PackLayout;
use crate::unihex::UnihexMode;

/// Converts a font into a new font that replaces each character with a space
/// as wide as the original character, multiplied by a given factor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Namespaced id of the original font
    pub font: String,
    /// Suffix added to the id of every converted font
    pub suffix: String,
    /// Factor the width of each character is multiplied with
    pub factor: f64,
    /// Root of the target resource pack [default: working directory]
    #[arg(short, long, alias = "target_pack_folder")]
    pub target_pack_folder: Option<PathBuf>,
    /// Root of a fallback resource pack for resources missing from the target pack
    #[arg(short, long, alias = "fallback_pack_folder")]
    pub fallback_pack_folder: Option<PathBuf>,
    /// Which unihex characters are included: none, ascii, all_named or all
    #[arg(short, long, alias = "unihex_mode", default_value = "ascii", value_parser = parse_unihex_mode)]
    pub unihex_mode: UnihexMode,
    /// Suppress progress messages
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_unihex_mode(s: &str) -> Result<UnihexMode, String> {
    s.parse()
}

impl Args {
    /// The run configuration these arguments describe.
    ///
    /// # Errors
    ///
    /// Fails when no target pack is given and the working directory is unavailable.
    pub fn context(&self) -> Result<ConversionContext> {
        let target = match &self.target_pack_folder {
            Some(target) => target.clone(),
            None => std::env::current_dir()
                .map_err(|source| Error::Io { path: PathBuf::from("."), source })?,
        };
        let mut pack = PackLayout::new(target);
        if let Some(fallback) = &self.fallback_pack_folder {
            pack = pack.with_fallback(fallback);
        }
        Ok(ConversionContext {
            suffix: self.suffix.clone(),
            factor: self.factor,
            pack,
            unihex_mode: self.unihex_mode,
        })
    }
}

/// Converts the font named by `args` and returns the id of the converted font.
///
/// # Errors
///
/// Fails when the conversion fails; see [`crate::FontConverter::convert_font`].
pub fn run(args: &Args) -> Result<String> {
    let ctx = args.context()?;
    convert_font(&ctx, &args.font)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positionals_and_defaults() {
        let args = Args::try_parse_from(["font2space", "pack:ui", "_space", "0.5"]).unwrap();
        assert_eq!(args.font, "pack:ui");
        assert_eq!(args.suffix, "_space");
        assert_eq!(args.factor, 0.5);
        assert_eq!(args.unihex_mode, UnihexMode::Ascii);
        assert!(!args.quiet);
    }

    #[test]
    fn accepts_underscore_spellings() {
        let args = Args::try_parse_from([
            "font2space",
            "default",
            "_sp",
            "2",
            "--target_pack_folder",
            "out",
            "-f",
            "vanilla",
            "--unihex_mode",
            "all_named",
            "-q",
        ])
        .unwrap();
        let ctx = args.context().unwrap();
        assert_eq!(ctx.pack, PackLayout::new("out").with_fallback("vanilla"));
        assert_eq!(ctx.unihex_mode, UnihexMode::AllNamed);
        assert!(args.quiet);
    }

    #[test]
    fn rejects_unknown_modes() {
        assert!(Args::try_parse_from(["font2space", "default", "_sp", "2", "-u", "some"]).is_err());
    }
}
