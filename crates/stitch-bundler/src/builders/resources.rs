//! Passthrough resources copied from the source tree unchanged.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::modules::ModuleSet;
use crate::output::metadata::normalize_module_path;
use crate::output::{OutputFile, normalize_separators};
use crate::{Error, Result};

/// Read every file under `src_root` matching one of `globs`.
///
/// A glob matching nothing is not an error. Files come back sorted by path.
pub async fn collect_resources(
    src_root: PathBuf,
    out_root: PathBuf,
    globs: Vec<String>,
) -> Result<Vec<OutputFile>> {
    if globs.is_empty() {
        return Ok(Vec::new());
    }

    tokio::task::spawn_blocking(move || walk_resources(&src_root, &out_root, &globs))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

fn walk_resources(src_root: &Path, out_root: &Path, globs: &[String]) -> Result<Vec<OutputFile>> {
    let mut matched_per_glob = vec![0usize; globs.len()];
    let mut files = Vec::new();

    for entry in WalkDir::new(src_root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src_root) else {
            continue;
        };
        let relative = normalize_separators(&relative.to_string_lossy());

        let mut matched = false;
        for (glob, count) in globs.iter().zip(matched_per_glob.iter_mut()) {
            if fast_glob::glob_match(glob, &relative) {
                *count += 1;
                matched = true;
            }
        }
        if matched {
            let contents = std::fs::read(entry.path()).map_err(|e| Error::io_at(entry.path(), e))?;
            files.push(OutputFile::new(out_root, relative, contents));
        }
    }

    for (glob, count) in globs.iter().zip(&matched_per_glob) {
        if *count == 0 {
            tracing::debug!(glob = %glob, "Resource glob matched no files");
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Drop resources the engine inlined and files belonging to excluded modules.
pub fn filter_resources(
    resources: Vec<OutputFile>,
    inlined: &BTreeSet<String>,
    modules: &ModuleSet,
) -> Vec<OutputFile> {
    resources
        .into_iter()
        .filter(|file| {
            if inlined.contains(&file.path) {
                return false;
            }
            !modules.is_excluded(&normalize_module_path(&file.path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{EntryPoint, resolve_module_set};
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let vs = temp.path().join("src/vs");
        std::fs::create_dir_all(vs.join("media")).unwrap();
        std::fs::write(vs.join("media/icon.png"), [0x89, b'P']).unwrap();
        std::fs::write(vs.join("media/inline.svg"), "<svg/>").unwrap();
        std::fs::write(vs.join("app.css"), "a{}").unwrap();
        std::fs::write(vs.join("app.ts"), "").unwrap();
        temp
    }

    #[tokio::test]
    async fn test_collect_matches_globs() {
        let temp = tree();
        let files = collect_resources(
            temp.path().join("src"),
            temp.path().join("out"),
            vec!["vs/**/*.png".into(), "vs/**/*.svg".into(), "vs/**/*.css".into()],
        )
        .await
        .unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["vs/app.css", "vs/media/icon.png", "vs/media/inline.svg"]
        );
        assert_eq!(files[1].contents, vec![0x89, b'P']);
    }

    #[tokio::test]
    async fn test_zero_matches_is_ok() {
        let temp = tree();
        let files = collect_resources(
            temp.path().join("src"),
            temp.path().join("out"),
            vec!["**/*.woff".into()],
        )
        .await
        .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_filter_inlined_and_excluded() {
        let resources = vec![
            OutputFile::new("out", "vs/media/icon.png", ""),
            OutputFile::new("out", "vs/media/inline.svg", ""),
            OutputFile::new("out", "vs/nls.css", ""),
        ];
        let inlined = BTreeSet::from(["vs/media/inline.svg".to_string()]);
        let modules = resolve_module_set(&[EntryPoint::new("vs/app").exclude(["vs/nls"])]);

        let kept = filter_resources(resources, &inlined, &modules);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].path, "vs/media/icon.png");
    }
}
