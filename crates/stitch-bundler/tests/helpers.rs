//! Shared test utilities for stitch-bundler tests
//!
//! Provides a scripted [`BundleEngine`] whose per-module latency and
//! failures are controlled by the test, plus a small source tree to build.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use stitch_bundler::engine::{MetafileImport, MetafileInput, MetafileOutput};
use stitch_bundler::{
    BundleEngine, BundleRequest, EngineOutput, Error, Metafile, OutputFile, RawSourceMap,
};
use tempfile::TempDir;

/// Engine that echoes each entry file into `<module>.js`.
///
/// The bundle's map carries the entry source as its content, so copyright
/// detection sees the original text.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    imports: HashMap<String, Vec<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, module: &str, millis: u64) -> Self {
        self.delays
            .insert(module.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn fail(mut self, module: &str) -> Self {
        self.failures.insert(module.to_string());
        self
    }

    pub fn imports(mut self, module: &str, deps: &[&str]) -> Self {
        self.imports.insert(
            module.to_string(),
            deps.iter().map(|d| d.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl BundleEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn bundle(&self, request: BundleRequest) -> stitch_bundler::Result<EngineOutput> {
        if let Some(delay) = self.delays.get(&request.module) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&request.module) {
            return Err(Error::ModuleBundle {
                module: request.module.clone(),
                diagnostics: Vec::new(),
            });
        }

        let source = tokio::fs::read_to_string(&request.entry_file).await?;
        let input = format!("{}.ts", request.module);
        let output = format!("{}.js", request.module);

        let code = format!("// bundled {}\n{}", request.module, source);
        let map = RawSourceMap::identity(&input, &source)?;
        let file = OutputFile::new(&request.config.out_root, output.clone(), code)
            .with_source_map(map);

        let mut metafile = Metafile::default();
        let deps = self.imports.get(&request.module).cloned().unwrap_or_default();
        metafile.inputs.insert(
            input.clone(),
            MetafileInput {
                imports: deps
                    .into_iter()
                    .map(|dep| MetafileImport {
                        path: format!("{dep}.ts"),
                    })
                    .collect(),
            },
        );
        let mut inputs = BTreeMap::new();
        inputs.insert(input, serde_json::json!({}));
        metafile.outputs.insert(output, MetafileOutput { inputs });

        Ok(EngineOutput {
            files: vec![file],
            metafile: Some(metafile),
        })
    }
}

/// Source tree with a loader, a CSS shim and one file per module.
pub fn create_project(modules: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("vs")).expect("create src");

    fs::write(src.join("vs/loader.js"), "var define;\n").expect("write loader");
    fs::write(src.join("vs/css.js"), "define('vs/css', {});\n").expect("write css shim");

    for module in modules {
        write_source(&src, &format!("{module}.ts"), &format!("export const name = '{module}';\n"));
    }

    dir
}

pub fn write_source(src: &Path, relative: &str, contents: &str) {
    let path = src.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write source");
}

/// Relative paths and contents of every file under `root`, sorted.
pub fn read_tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/");
            (relative, fs::read(entry.path()).expect("read output"))
        })
        .collect();
    files.sort();
    files
}
