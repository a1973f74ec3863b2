//! Manual concatenation of listed sources into one destination.

use std::path::{Path, PathBuf};

use oxc_sourcemap::SourceMapBuilder;
use serde::{Deserialize, Serialize};

use crate::builders::header::HeaderInjector;
use crate::output::OutputFile;
use crate::sourcemap::{RawSourceMap, line_count};
use crate::{Error, Result};

/// Concatenate `sources` (source-root relative) into `destination`, in
/// exactly the listed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatJob {
    pub sources: Vec<String>,
    pub destination: String,
}

impl ConcatJob {
    pub fn new<I, S>(sources: I, destination: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            destination: destination.into(),
        }
    }
}

/// Joins sources with `\n` while building a line map back to each of them.
pub(crate) struct SourceJoiner {
    code: String,
    builder: SourceMapBuilder,
    next_line: u32,
}

impl SourceJoiner {
    pub fn new() -> Self {
        Self {
            code: String::new(),
            builder: SourceMapBuilder::default(),
            next_line: 0,
        }
    }

    fn separate(&mut self) {
        if !self.code.is_empty() {
            self.code.push('\n');
        }
    }

    /// Append text with no mapping.
    pub fn append_raw(&mut self, text: &str) {
        self.separate();
        self.code.push_str(text);
        self.next_line += line_count(text);
    }

    /// Append a source, mapping each of its lines to itself.
    pub fn append_source(&mut self, name: &str, content: &str) {
        self.separate();
        let source_id = self.builder.add_source_and_content(name, content);
        let lines = line_count(content);
        for line in 0..lines {
            self.builder
                .add_token(self.next_line + line, 0, line, 0, Some(source_id), None);
        }
        self.code.push_str(content);
        self.next_line += lines;
    }

    pub fn finish(mut self, file: &str) -> Result<(String, RawSourceMap)> {
        self.builder.set_file(file);
        let json = self.builder.into_sourcemap().to_json_string();
        Ok((self.code, RawSourceMap::from_json(file, &json)?))
    }
}

pub(crate) async fn read_source(src_root: &Path, relative: &str) -> Result<String> {
    let path: PathBuf = src_root.join(relative);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| Error::io_at(&path, e))
}

/// Run every job, keeping job order.
///
/// Each output gets the copyright header when any of its sources carries
/// the marker.
pub async fn run_concat_jobs(
    jobs: &[ConcatJob],
    src_root: &Path,
    out_root: &Path,
    header: &HeaderInjector,
) -> Result<Vec<OutputFile>> {
    let mut outputs = Vec::with_capacity(jobs.len());

    for job in jobs {
        let mut contents = Vec::with_capacity(job.sources.len());
        for source in &job.sources {
            contents.push(read_source(src_root, source).await?);
        }

        let mut joiner = SourceJoiner::new();
        for (name, content) in job.sources.iter().zip(&contents) {
            joiner.append_source(name, content);
        }
        let (code, map) = joiner.finish(&job.destination)?;

        let mut file = OutputFile::new(out_root, job.destination.as_str(), code).with_source_map(map);
        header.apply(&mut file, &contents);
        tracing::debug!(
            destination = %job.destination,
            sources = job.sources.len(),
            "Concatenated"
        );
        outputs.push(file);
    }

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_joiner_maps_each_source_line() {
        let mut joiner = SourceJoiner::new();
        joiner.append_raw("// banner");
        joiner.append_source("a.js", "a1\na2");
        joiner.append_source("b.js", "b1");
        let (code, map) = joiner.finish("out.js").unwrap();

        assert_eq!(code, "// banner\na1\na2\nb1");
        assert_eq!(map.sources, vec!["a.js", "b.js"]);
        assert_eq!(map.file.as_deref(), Some("out.js"));
        // banner line is unmapped
        assert!(map.mappings.starts_with(';'));
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error_with_path() {
        let temp = TempDir::new().unwrap();
        let job = ConcatJob::new(["missing.js"], "out.js");

        let err = run_concat_jobs(&[job], temp.path(), temp.path(), &HeaderInjector::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("missing.js"));
    }
}
