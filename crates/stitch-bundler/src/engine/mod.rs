//! Bundling engine seam.
//!
//! The orchestrator treats the engine as a black box: one request per
//! module in, output files plus a dependency metafile out. [`RolldownEngine`]
//! is the in-process default; tests substitute scripted engines.

pub mod rolldown;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::output::OutputFile;

pub use self::rolldown::RolldownEngine;

/// How the engine loads a non-script file referenced by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetLoader {
    /// Emitted as a separate file and referenced by URL.
    File,
    Base64,
    DataUrl,
    Text,
    Binary,
}

impl AssetLoader {
    /// Whether the file content ends up inside the bundle.
    pub fn inlines(self) -> bool {
        !matches!(self, AssetLoader::File)
    }
}

/// Fixed configuration shared by every per-module invocation.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub src_root: PathBuf,
    pub out_root: PathBuf,
    /// Loader per file extension (with leading dot).
    pub asset_loaders: BTreeMap<String, AssetLoader>,
    /// Import patterns left unresolved.
    pub external: Vec<String>,
    pub metafile: bool,
    pub source_maps: bool,
}

impl BundleConfig {
    pub fn new(src_root: impl Into<PathBuf>, out_root: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
            out_root: out_root.into(),
            asset_loaders: default_asset_loaders(),
            external: vec!["^[^./]".to_string()],
            metafile: true,
            source_maps: true,
        }
    }

    /// Loader registered for the extension of `path`, if any.
    pub fn loader_for(&self, path: &str) -> Option<AssetLoader> {
        let ext = path.rfind('.').map(|idx| &path[idx..])?;
        self.asset_loaders.get(ext).copied()
    }
}

pub fn default_asset_loaders() -> BTreeMap<String, AssetLoader> {
    [".png", ".svg", ".ttf", ".sh"]
        .into_iter()
        .map(|ext| (ext.to_string(), AssetLoader::File))
        .collect()
}

/// One module's bundling request.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    pub module: String,
    pub entry_file: PathBuf,
    pub config: Arc<BundleConfig>,
}

/// Dependency metafile, shaped like the one esbuild emits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafile {
    pub inputs: BTreeMap<String, MetafileInput>,
    pub outputs: BTreeMap<String, MetafileOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafileInput {
    #[serde(default)]
    pub imports: Vec<MetafileImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafileImport {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafileOutput {
    #[serde(default)]
    pub inputs: BTreeMap<String, serde_json::Value>,
}

/// Result of one engine invocation.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub files: Vec<OutputFile>,
    pub metafile: Option<Metafile>,
}

/// A bundling engine invoked once per module.
///
/// Implementations must not write to disk; files are returned buffered so
/// the caller can commit the whole tree at once.
#[async_trait]
pub trait BundleEngine: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn bundle(&self, request: BundleRequest) -> Result<EngineOutput>;
}
