//! Minification and validation of an already assembled output tree.
//!
//! Files are split by type into disjoint sets (scripts, stylesheets, vector
//! images, everything else), processed concurrently under a semaphore, and
//! recombined. Any failure aborts the whole pass and nothing is written.
//! Minified scripts must stay within Latin-1.

pub mod script;
pub mod style;
pub mod svg;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

pub use script::{check_latin1, minify_script};
pub use style::minify_style;
pub use svg::minify_svg;

use crate::output::{OutputFile, commit_output_tree, normalize_separators};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Files processed at once.
    pub max_parallel: usize,
    /// Emit an external `.map` per script.
    pub source_maps: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            max_parallel: num_cpus::get().min(8),
            source_maps: true,
        }
    }
}

/// Counts per file type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinifyReport {
    pub scripts: usize,
    pub styles: usize,
    pub vectors: usize,
    pub copied: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Script,
    Style,
    Vector,
    Other,
}

impl FileKind {
    pub fn of(path: &str) -> Self {
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("js") => FileKind::Script,
            Some("css") => FileKind::Style,
            Some("svg") => FileKind::Vector,
            _ => FileKind::Other,
        }
    }
}

/// Minify every file under `src` into `dest`.
pub async fn minify_tree(src: &Path, dest: &Path, options: &MinifyOptions) -> Result<MinifyReport> {
    let root = src.to_path_buf();
    let paths = tokio::task::spawn_blocking(move || list_files(&root))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    let scripts: BTreeSet<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|p| FileKind::of(p) == FileKind::Script)
        .collect();
    // Maps of minified scripts are regenerated or dropped, never copied.
    let work: Vec<(String, FileKind)> = paths
        .iter()
        .filter(|p| {
            !p.strip_suffix(".map")
                .is_some_and(|script| scripts.contains(script))
        })
        .map(|p| (p.clone(), FileKind::of(p)))
        .collect();

    let semaphore = Arc::new(Semaphore::new(options.max_parallel.max(1)));
    let mut join_set = JoinSet::new();

    for (path, kind) in work {
        let semaphore = Arc::clone(&semaphore);
        let source_path = src.join(&path);
        let dest = dest.to_path_buf();
        let source_maps = options.source_maps;

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let contents = tokio::fs::read(&source_path)
                .await
                .map_err(|e| Error::io_at(&source_path, e))?;
            let before = contents.len() as u64;
            let outputs = tokio::task::spawn_blocking(move || {
                process_file(&dest, &path, kind, contents, source_maps)
            })
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;
            Ok::<_, Error>((kind, before, outputs))
        });
    }

    let mut report = MinifyReport::default();
    let mut outputs = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        let result = joined.map_err(|e| Error::Io(std::io::Error::other(e)))?;
        let (kind, before, files) = match result {
            Ok(done) => done,
            Err(err) => {
                join_set.abort_all();
                return Err(err);
            }
        };
        match kind {
            FileKind::Script => report.scripts += 1,
            FileKind::Style => report.styles += 1,
            FileKind::Vector => report.vectors += 1,
            FileKind::Other => report.copied += 1,
        }
        report.bytes_before += before;
        outputs.extend(files);
    }

    outputs.sort_by(|a, b| a.path.cmp(&b.path));
    report.bytes_after = commit_output_tree(&outputs, dest, true)?;

    tracing::info!(
        scripts = report.scripts,
        styles = report.styles,
        vectors = report.vectors,
        copied = report.copied,
        "Minified output tree"
    );
    Ok(report)
}

fn list_files(root: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            paths.push(normalize_separators(&relative.to_string_lossy()));
        }
    }
    Ok(paths)
}

fn utf8(path: &str, contents: Vec<u8>) -> Result<String> {
    String::from_utf8(contents).map_err(|e| Error::Minify {
        file: path.to_string(),
        message: e.to_string(),
    })
}

/// Minify one file; scripts may yield a second file (the map).
fn process_file(
    dest: &Path,
    path: &str,
    kind: FileKind,
    contents: Vec<u8>,
    source_maps: bool,
) -> Result<Vec<OutputFile>> {
    let base: PathBuf = dest.to_path_buf();
    match kind {
        FileKind::Script => {
            let source = utf8(path, contents)?;
            let minified = minify_script(path, &source, source_maps)?;
            check_latin1(path, &minified.code)?;

            let mut code = minified.code;
            let mut files = Vec::with_capacity(2);
            if let Some(mut map) = minified.map {
                let file_name = path.rsplit('/').next().unwrap_or(path);
                map.file = Some(file_name.to_string());
                if !code.ends_with('\n') {
                    code.push('\n');
                }
                code.push_str(&format!("//# sourceMappingURL={file_name}.map\n"));
                files.push(OutputFile::new(base.clone(), format!("{path}.map"), map.to_json()?));
            }
            files.insert(0, OutputFile::new(base, path, code));
            Ok(files)
        }
        FileKind::Style => {
            let source = utf8(path, contents)?;
            Ok(vec![OutputFile::new(base, path, minify_style(path, &source)?)])
        }
        FileKind::Vector => {
            let source = utf8(path, contents)?;
            Ok(vec![OutputFile::new(base, path, minify_svg(&source))])
        }
        FileKind::Other => Ok(vec![OutputFile::new(base, path, contents)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::of("vs/a.js"), FileKind::Script);
        assert_eq!(FileKind::of("vs/a.css"), FileKind::Style);
        assert_eq!(FileKind::of("vs/a.svg"), FileKind::Vector);
        assert_eq!(FileKind::of("vs/a.js.map"), FileKind::Other);
        assert_eq!(FileKind::of("LICENSE"), FileKind::Other);
    }

    #[test]
    fn test_process_other_is_copied_verbatim() {
        let files = process_file(Path::new("out"), "a.png", FileKind::Other, vec![1, 2, 3], true)
            .unwrap();
        assert_eq!(files[0].contents, vec![1, 2, 3]);
    }

    #[test]
    fn test_process_script_emits_map() {
        let files = process_file(
            Path::new("out"),
            "vs/a.js",
            FileKind::Script,
            b"var answer = 40 + 2;\nconsole.log(answer);\n".to_vec(),
            true,
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].text().ends_with("//# sourceMappingURL=a.js.map\n"));
        assert_eq!(files[1].path, "vs/a.js.map");
    }

    #[test]
    fn test_default_parallelism_bounded() {
        let options = MinifyOptions::default();
        assert!(options.max_parallel >= 1 && options.max_parallel <= 8);
    }
}
