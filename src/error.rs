use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a conversion.
#[derive(Debug, Error)]
pub enum Error {
    /// A provider declared a `type` this tool does not know how to convert.
    #[error("Unknown provider type \"{0}\"")]
    UnknownProviderKind(String),

    /// A provider entry without a `type` string.
    #[error("Provider has no \"type\" field")]
    MissingProviderKind,

    /// A provider of a known type with missing or ill-typed fields.
    #[error("Malformed \"{kind}\" provider: {source}")]
    MalformedProvider {
        /// The provider type being parsed.
        kind: String,
        /// The underlying deserialization failure.
        source: serde_json::Error,
    },

    /// A namespaced id that does not have the `namespace:path` shape.
    #[error("Invalid resource id \"{0}\"")]
    InvalidResourceId(String),

    /// A resolved resource path that does not point at a file.
    #[error("Resource {path:?} not found")]
    ResourceNotFound {
        /// The resolved path, after the fallback rule.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A font definition that is not valid JSON or lacks `providers`.
    #[error("Malformed font definition {path:?}: {source}")]
    MalformedDefinition {
        /// The definition file.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A glyph sheet the image decoder rejected.
    #[error("Failed to decode image {path:?}: {source}")]
    Image {
        /// The image file.
        path: PathBuf,
        /// The underlying decoder error.
        source: image::ImageError,
    },

    /// A vector font the font parser rejected.
    #[error("Failed to parse font data in {path:?}")]
    FontParse {
        /// The font file.
        path: PathBuf,
    },

    /// A unihex archive that could not be read.
    #[error("Failed to read archive {path:?}: {source}")]
    Archive {
        /// The archive file.
        path: PathBuf,
        /// The underlying archive error.
        source: zip::result::ZipError,
    },

    /// A unihex archive without any `.hex` entry.
    #[error("Archive {path:?} contains no .hex file")]
    MissingHexEntry {
        /// The archive file.
        path: PathBuf,
    },

    /// A `.hex` line that is not `<codepoint>:<bitmap>` in hexadecimal.
    #[error("Malformed unihex line {line}: {content:?}")]
    MalformedHexLine {
        /// One-based line number inside the `.hex` entry.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A font that (transitively) references itself.
    #[error("Font reference cycle: {chain}")]
    ReferenceCycle {
        /// The font ids on the cycle, joined with ` -> `.
        chain: String,
    },
}

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
