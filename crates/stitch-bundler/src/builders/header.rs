//! Copyright header injection.

use regex::Regex;

use crate::output::OutputFile;
use crate::{Error, Result};

/// Header prepended to outputs built from copyrighted sources.
pub const DEFAULT_HEADER: &str = "/*!--------------------------------------------------------\n * Copyright (C) The authors. All rights reserved.\n * Released under the MIT license.\n *--------------------------------------------------------*/";

/// Pattern recognizing a copyright block in a source file.
pub const DEFAULT_COPYRIGHT_MARKER: &str = r"(?s)/\*-{2,}.{0,200}?Copyright \(c\)";

/// Prepends the header to an output when any of its sources carries the
/// copyright marker.
#[derive(Debug, Clone)]
pub struct HeaderInjector {
    header: String,
    marker: Regex,
}

impl Default for HeaderInjector {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            marker: Regex::new(DEFAULT_COPYRIGHT_MARKER).expect("default marker is valid"),
        }
    }
}

impl HeaderInjector {
    pub fn new(header: impl Into<String>, marker: &str) -> Result<Self> {
        let marker = Regex::new(marker)
            .map_err(|e| Error::InvalidConfig(format!("invalid copyright marker: {e}")))?;
        Ok(Self {
            header: header.into(),
            marker,
        })
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether any of `sources` contains the marker.
    pub fn needs_header<S: AsRef<str>>(&self, sources: &[S]) -> bool {
        sources.iter().any(|s| self.marker.is_match(s.as_ref()))
    }

    /// Prepend the header to `file` if any of `sources` needs it.
    ///
    /// Never prepends twice: a file that already starts with the header is
    /// left alone. Returns whether the header was added.
    pub fn apply<S: AsRef<str>>(&self, file: &mut OutputFile, sources: &[S]) -> bool {
        if !self.needs_header(sources) || file.contents.starts_with(self.header.as_bytes()) {
            return false;
        }

        let mut contents = Vec::with_capacity(self.header.len() + 1 + file.contents.len());
        contents.extend_from_slice(self.header.as_bytes());
        contents.push(b'\n');
        contents.extend_from_slice(&file.contents);
        file.contents = contents;

        if let Some(map) = &mut file.source_map {
            map.shift_lines(self.header_lines());
        }
        true
    }

    /// Lines the header occupies, including its trailing newline.
    pub fn header_lines(&self) -> usize {
        self.header.split('\n').count()
    }
}
