//! Source map reconciliation for the merged output stream.
//!
//! Maps travel with their [`OutputFile`] as plain JSON ([`RawSourceMap`]) so
//! that every stage can rewrite them without caring which tool produced
//! them. The reconciler runs once, after the merge, and:
//!
//! - inlines original source content (maps never reference sources by path),
//! - renames well-known synthesized sources to their original sibling,
//! - appends a `sourceMappingURL` comment and emits the `.map` file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use oxc_sourcemap::SourceMapBuilder;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::output::OutputFile;
use crate::{Error, Result};

/// Source map in its JSON (revision 3) shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

impl RawSourceMap {
    pub fn from_json(file: &str, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::SourceMap {
            file: file.to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Line-identity map of `content` onto itself, with content inlined.
    pub fn identity(source: &str, content: &str) -> Result<Self> {
        let mut builder = SourceMapBuilder::default();
        let source_id = builder.add_source_and_content(source, content);
        for line in 0..line_count(content) {
            builder.add_token(line, 0, line, 0, Some(source_id), None);
        }
        let json = builder.into_sourcemap().to_json_string();
        Self::from_json(source, &json)
    }

    /// Account for `lines` lines inserted before the mapped code.
    pub fn shift_lines(&mut self, lines: usize) {
        if lines > 0 {
            self.mappings.insert_str(0, &";".repeat(lines));
        }
    }
}

pub(crate) fn line_count(content: &str) -> u32 {
    u32::try_from(content.split('\n').count()).unwrap_or(u32::MAX)
}

/// Source map handling for the merged stream.
#[derive(Debug, Clone)]
pub struct SourceMapOptions {
    /// Write `.map` files. When disabled every map is dropped.
    pub enabled: bool,
    /// Absolute URL prefix for `sourceMappingURL` comments.
    pub base_url: Option<String>,
    /// Source file names rewritten to their unprocessed sibling.
    pub renames: BTreeMap<String, String>,
    /// Root used to read original sources for inlining.
    pub src_root: PathBuf,
}

impl Default for SourceMapOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            renames: default_renames(),
            src_root: PathBuf::from("src"),
        }
    }
}

pub fn default_renames() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "bootstrap-fork.js".to_string(),
        "bootstrap-fork.orig.js".to_string(),
    )])
}

/// Files whose name starts with `nls.` carry localization metadata and
/// never get a source map.
pub fn is_localization_metadata(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with("nls."))
}

/// Attach source maps to every script of the merged stream.
///
/// Order is preserved; each `.map` file immediately follows its script.
pub async fn reconcile_source_maps(
    files: Vec<OutputFile>,
    options: &SourceMapOptions,
) -> Result<Vec<OutputFile>> {
    // Maps already in the stream describe code this pass rewrites.
    let script_maps: BTreeSet<String> = files
        .iter()
        .filter(|f| f.is_script() && !is_localization_metadata(&f.path))
        .map(|f| format!("{}.map", f.path))
        .collect();

    let mut reconciled = Vec::with_capacity(files.len() * 2);

    for mut file in files {
        if script_maps.contains(&file.path) {
            tracing::debug!(path = %file.path, "Dropping stale source map");
            continue;
        }
        if !options.enabled || !file.is_script() || is_localization_metadata(&file.path) {
            if file.source_map.take().is_some() {
                strip_mapping_url(&mut file.contents);
            }
            reconciled.push(file);
            continue;
        }

        let mut map = match file.source_map.take() {
            Some(map) => map,
            None => RawSourceMap::identity(file.file_name(), &file.text())?,
        };

        inline_sources(&mut map, &file, &options.src_root).await;
        rename_sources(&mut map, &options.renames);
        map.file = Some(file.file_name().to_string());

        let map_path = format!("{}.map", file.path);
        let url = match &options.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), map_path),
            None => format!("{}.map", file.file_name()),
        };
        strip_mapping_url(&mut file.contents);
        if !file.contents.ends_with(b"\n") {
            file.contents.push(b'\n');
        }
        file.contents
            .extend_from_slice(format!("//# sourceMappingURL={url}\n").as_bytes());

        let map_file = OutputFile::new(file.base.clone(), map_path, map.to_json()?);
        reconciled.push(file);
        reconciled.push(map_file);
    }

    Ok(reconciled)
}

/// Remove a trailing `sourceMappingURL` comment left by an earlier tool.
fn strip_mapping_url(contents: &mut Vec<u8>) {
    const MARKER: &[u8] = b"//# sourceMappingURL=";
    let body_end = contents
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let line_start = contents[..body_end]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    if contents[line_start..body_end].starts_with(MARKER) {
        contents.truncate(line_start);
    }
}

async fn inline_sources(map: &mut RawSourceMap, file: &OutputFile, src_root: &Path) {
    let mut contents = map
        .sources_content
        .take()
        .unwrap_or_else(|| vec![None; map.sources.len()]);
    contents.resize(map.sources.len(), None);

    let file_dir = file
        .absolute_path()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.base.clone());

    for (source, content) in map.sources.iter().zip(contents.iter_mut()) {
        if content.is_some() {
            continue;
        }
        let candidates = [file_dir.join(source).clean(), src_root.join(source).clean()];
        let mut found = None;
        for candidate in &candidates {
            if let Ok(text) = tokio::fs::read_to_string(candidate).await {
                found = Some(text);
                break;
            }
        }
        if found.is_none() {
            tracing::warn!(
                file = %file.path,
                source = %source,
                "Original source not found; map keeps it without content"
            );
        }
        *content = found;
    }

    map.sources_content = Some(contents);
}

fn rename_sources(map: &mut RawSourceMap, renames: &BTreeMap<String, String>) {
    for source in &mut map.sources {
        let (dir, name) = match source.rfind('/') {
            Some(idx) => (&source[..=idx], &source[idx + 1..]),
            None => ("", source.as_str()),
        };
        if let Some(renamed) = renames.get(name) {
            *source = format!("{dir}{renamed}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_identity_map_covers_every_line() {
        let map = RawSourceMap::identity("a.js", "one\ntwo\nthree").unwrap();
        assert_eq!(map.sources, vec!["a.js"]);
        assert_eq!(map.mappings.split(';').count(), 3);
        assert_eq!(
            map.sources_content,
            Some(vec![Some("one\ntwo\nthree".to_string())])
        );
    }

    #[test]
    fn test_shift_lines() {
        let mut map = RawSourceMap::identity("a.js", "x").unwrap();
        let before = map.mappings.clone();
        map.shift_lines(2);
        assert_eq!(map.mappings, format!(";;{before}"));
    }

    #[test]
    fn test_localization_metadata_detection() {
        assert!(is_localization_metadata("vs/nls.messages.js"));
        assert!(is_localization_metadata("nls.keys.json"));
        assert!(!is_localization_metadata("vs/app.js"));
    }

    #[test]
    fn test_rename_keeps_directory() {
        let mut map = RawSourceMap::identity("x", "x").unwrap();
        map.sources = vec!["../src/bootstrap-fork.js".into(), "main.js".into()];
        rename_sources(&mut map, &default_renames());
        assert_eq!(map.sources[0], "../src/bootstrap-fork.orig.js");
        assert_eq!(map.sources[1], "main.js");
    }

    #[tokio::test]
    async fn test_reconcile_inlines_content_and_appends_url() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("bootstrap-fork.js"), "original();").unwrap();

        let mut map = RawSourceMap::identity("bootstrap-fork.js", "x").unwrap();
        map.sources_content = None;
        let script = OutputFile::new(temp.path().join("out"), "bootstrap-fork.js", "bundled();")
            .with_source_map(map);
        let options = SourceMapOptions {
            src_root: src,
            ..SourceMapOptions::default()
        };

        let files = reconcile_source_maps(vec![script], &options).await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].text().ends_with("//# sourceMappingURL=bootstrap-fork.js.map\n"));
        assert_eq!(files[1].path, "bootstrap-fork.js.map");
        let written: RawSourceMap = serde_json::from_slice(&files[1].contents).unwrap();
        assert_eq!(written.sources, vec!["bootstrap-fork.orig.js"]);
        assert_eq!(
            written.sources_content,
            Some(vec![Some("original();".to_string())])
        );
        assert_eq!(written.file.as_deref(), Some("bootstrap-fork.js"));
    }

    #[tokio::test]
    async fn test_base_url_makes_absolute_urls() {
        let script = OutputFile::new("out", "vs/app.js", "app();\n");
        let options = SourceMapOptions {
            base_url: Some("https://cdn.example.com/maps/".into()),
            ..SourceMapOptions::default()
        };

        let files = reconcile_source_maps(vec![script], &options).await.unwrap();

        assert!(files[0]
            .text()
            .ends_with("//# sourceMappingURL=https://cdn.example.com/maps/vs/app.js.map\n"));
    }

    #[tokio::test]
    async fn test_disabled_strips_maps() {
        let map = RawSourceMap::identity("a.js", "a").unwrap();
        let script = OutputFile::new("out", "a.js", "a").with_source_map(map);
        let options = SourceMapOptions {
            enabled: false,
            ..SourceMapOptions::default()
        };

        let files = reconcile_source_maps(vec![script], &options).await.unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].source_map.is_none());
        assert_eq!(files[0].text(), "a");
    }

    #[tokio::test]
    async fn test_engine_map_and_comment_are_replaced() {
        let map = RawSourceMap::identity("app.ts", "app();").unwrap();
        let script = OutputFile::new("out", "vs/app.js", "app();\n//# sourceMappingURL=app.js.map\n")
            .with_source_map(map);
        let stale = OutputFile::new("out", "vs/app.js.map", "{}");

        let files = reconcile_source_maps(vec![script, stale], &SourceMapOptions::default())
            .await
            .unwrap();

        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["vs/app.js", "vs/app.js.map"]);
        assert_eq!(files[0].text().matches("sourceMappingURL").count(), 1);
        assert_eq!(files[0].text(), "app();\n//# sourceMappingURL=app.js.map\n");
        assert_ne!(files[1].contents, b"{}");
    }

    #[tokio::test]
    async fn test_nls_files_skipped() {
        let file = OutputFile::new("out", "nls.metadata.js", "{}");
        let files = reconcile_source_maps(vec![file], &SourceMapOptions::default())
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
    }
}
