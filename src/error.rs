//! Error types for the part tree, colours, geometry loading and configuration

use std::path::PathBuf;

use thiserror::Error;

/// An index or position that does not address a live part
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The part was removed after the index was obtained.
    #[error("index refers to a part that no longer exists")]
    Stale,
    #[error("row {row} out of range for a parent with {count} children")]
    RowOutOfRange { row: usize, count: usize },
}

/// A structural request the tree refuses; the tree is left unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("cannot delete root item")]
    RootNotDeletable,
    #[error("no part is selected")]
    NoSelection,
    #[error("rows {start}..{end} out of range for a parent with {count} children")]
    RowsOutOfRange {
        start: usize,
        end: usize,
        count: usize,
    },
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Text that is not an `r,g,b` colour with 8-bit channels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour '{0}', expected r,g,b")]
pub struct ParseRgbError(String);

impl ParseRgbError {
    pub(crate) fn new(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Failure to turn a geometry file into a render handle
#[derive(Debug, Error)]
pub enum GeometryLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported geometry format '{0}'")]
    UnsupportedFormat(String),
    #[error("malformed STL data in {}: {reason}", path.display())]
    MalformedStl { path: PathBuf, reason: String },
    #[error("failed to load OBJ {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    /// The file decoded but holds no triangles.
    #[error("{} contains no triangles", .0.display())]
    EmptyGeometry(PathBuf),
    #[error("geometry parser panicked while reading {}", path.display())]
    ParserPanicked { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to start loader worker pool: {0}")]
    WorkerPool(#[from] std::io::Error),
}
