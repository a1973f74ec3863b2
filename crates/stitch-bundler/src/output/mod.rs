//! Output files and the streams that carry them to disk.

pub mod merge;
pub mod metadata;
pub mod writer;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::sourcemap::RawSourceMap;

pub use writer::commit_output_tree;

/// One file of the output stream.
///
/// `path` is relative to the output root and always uses `/` separators;
/// `base` is the root it is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub base: PathBuf,
    pub path: String,
    pub contents: Vec<u8>,
    pub source_map: Option<RawSourceMap>,
}

impl OutputFile {
    pub fn new(base: impl Into<PathBuf>, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            base: base.into(),
            path: normalize_separators(&path.into()),
            contents: contents.into(),
            source_map: None,
        }
    }

    pub fn with_source_map(mut self, map: RawSourceMap) -> Self {
        self.source_map = Some(map);
        self
    }

    /// Contents as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }

    /// Whether this is a script by its destination name.
    pub fn is_script(&self) -> bool {
        self.path.ends_with(".js")
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.path).extension().and_then(|e| e.to_str())
    }

    /// Final file name component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Absolute destination under `base`.
    pub fn absolute_path(&self) -> PathBuf {
        self.base.join(&self.path)
    }
}

pub(crate) fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
