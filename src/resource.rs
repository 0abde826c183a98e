//! Resolving namespaced ids to files inside resource packs.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Namespace used when an id does not name one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A `namespace:path` id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceId<'a> {
    /// Namespace, [`DEFAULT_NAMESPACE`] when absent.
    pub namespace: &'a str,
    /// Slash separated location inside the namespace.
    pub location: &'a str,
}

impl<'a> ResourceId<'a> {
    /// Splits `id` at its namespace separator.
    ///
    /// # Errors
    ///
    /// Fails when `id` contains more than one `:`.
    pub fn parse(id: &'a str) -> Result<Self> {
        let mut pieces = id.split(':');
        match (pieces.next(), pieces.next(), pieces.next()) {
            (Some(location), None, None) => Ok(ResourceId { namespace: DEFAULT_NAMESPACE, location }),
            (Some(namespace), Some(location), None) => Ok(ResourceId { namespace, location }),
            _ => Err(Error::InvalidResourceId(id.to_owned())),
        }
    }
}

/// Whether a path is resolved for reading or writing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Falls back to the fallback pack when the target file is missing.
    Read,
    /// Always resolves into the target pack.
    Write,
}

/// The target pack written to, plus an optional read-only fallback pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackLayout {
    /// Root of the pack converted fonts are written to.
    pub target: PathBuf,
    /// Root of the pack consulted for resources missing from `target`.
    pub fallback: Option<PathBuf>,
}

impl PackLayout {
    /// A layout without fallback pack.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        PackLayout { target: target.into(), fallback: None }
    }

    /// Adds a fallback pack.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<PathBuf>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Maps `id` to `assets/<namespace>/<kind>/<location><extension>` in the
    /// target pack, or in the fallback pack when reading a file the target
    /// pack does not have. An empty `kind` puts the file directly under the
    /// namespace.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not a valid resource id.
    pub fn resolve(&self, id: &str, kind: &str, extension: &str, access: Access) -> Result<PathBuf> {
        let ResourceId { namespace, location } = ResourceId::parse(id)?;
        let mut relative = Path::new("assets").join(namespace);
        if !kind.is_empty() {
            relative.push(kind);
        }
        let location = format!("{location}{extension}");
        relative.extend(location.split('/'));

        let target = self.target.join(&relative);
        match (&self.fallback, access) {
            (Some(fallback), Access::Read) if !target.is_file() => Ok(fallback.join(relative)),
            _ => Ok(target),
        }
    }

    /// Resolves a font definition id.
    ///
    /// # Errors
    ///
    /// Fails when `font_id` is not a valid resource id.
    pub fn font_definition(&self, font_id: &str, access: Access) -> Result<PathBuf> {
        self.resolve(font_id, "font", ".json", access)
    }

    /// Resolves `id` for reading and checks that the file exists.
    ///
    /// # Errors
    ///
    /// Fails when `id` is invalid or no file exists at the resolved path.
    pub fn existing(&self, id: &str, kind: &str, extension: &str) -> Result<PathBuf> {
        let path = self.resolve(id, kind, extension, Access::Read)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::ResourceNotFound { path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_defaults() {
        assert_eq!(
            ResourceId::parse("default").unwrap(),
            ResourceId { namespace: "minecraft", location: "default" }
        );
        assert_eq!(
            ResourceId::parse("pack:ui/small").unwrap(),
            ResourceId { namespace: "pack", location: "ui/small" }
        );
        assert!(matches!(ResourceId::parse("a:b:c"), Err(Error::InvalidResourceId(_))));
    }

    #[test]
    fn resolves_into_target_without_fallback() {
        let layout = PackLayout::new("/packs/target");
        let path = layout.resolve("pack:ui/small", "font", ".json", Access::Read).unwrap();
        assert_eq!(path, Path::new("/packs/target/assets/pack/font/ui/small.json"));

        let path = layout.resolve("unifont.zip", "", "", Access::Read).unwrap();
        assert_eq!(path, Path::new("/packs/target/assets/minecraft/unifont.zip"));
    }

    #[test]
    fn missing_target_files_fall_back_for_reads_only() {
        let layout = PackLayout::new("/nonexistent/target").with_fallback("/nonexistent/fallback");
        let read = layout.font_definition("default", Access::Read).unwrap();
        assert_eq!(read, Path::new("/nonexistent/fallback/assets/minecraft/font/default.json"));
        let write = layout.font_definition("default", Access::Write).unwrap();
        assert_eq!(write, Path::new("/nonexistent/target/assets/minecraft/font/default.json"));
    }

    #[test]
    fn missing_resources_are_reported() {
        let layout = PackLayout::new("/nonexistent/target");
        let err = layout.existing("missing.png", "textures", "").unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound { .. }));
    }
}
