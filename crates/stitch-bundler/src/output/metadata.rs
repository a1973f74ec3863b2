//! Bundle metadata (`bundleInfo.json`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::engine::Metafile;
use crate::output::{OutputFile, normalize_separators};

/// Name of the serialized metadata artifact.
pub const BUNDLE_INFO_FILE: &str = "bundleInfo.json";

/// Dependency graph and bundle membership across every module.
///
/// Keys and values are module paths without extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub graph: BTreeMap<String, Vec<String>>,
    pub bundles: BTreeMap<String, Vec<String>>,
}

/// A key written by more than one contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateKey {
    Graph(String),
    Bundle(String),
}

impl BundleMetadata {
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty() && self.bundles.is_empty()
    }

    /// One invocation's contribution, normalized.
    pub fn from_metafile(metafile: &Metafile) -> Self {
        let mut metadata = Self::default();

        for (input, data) in &metafile.inputs {
            let imports = data
                .imports
                .iter()
                .map(|import| normalize_module_path(&resolve_specifier(input, &import.path)))
                .collect();
            metadata.graph.insert(normalize_module_path(input), imports);
        }

        for (output, data) in &metafile.outputs {
            let inputs = data.inputs.keys().map(|i| normalize_module_path(i)).collect();
            metadata.bundles.insert(normalize_module_path(output), inputs);
        }

        metadata
    }

    /// Fold `other` in; later writes win.
    ///
    /// Returns the keys that were overwritten. Graph entries only count when
    /// the import lists differ, since shared modules legitimately appear in
    /// several invocations. Any repeated bundle key is reported.
    pub fn merge(&mut self, other: BundleMetadata) -> Vec<DuplicateKey> {
        let mut duplicates = Vec::new();

        for (module, imports) in other.graph {
            if let Some(previous) = self.graph.insert(module.clone(), imports) {
                if previous != self.graph[&module] {
                    duplicates.push(DuplicateKey::Graph(module));
                }
            }
        }

        for (output, inputs) in other.bundles {
            if self.bundles.insert(output.clone(), inputs).is_some() {
                duplicates.push(DuplicateKey::Bundle(output));
            }
        }

        duplicates
    }

    /// Serialize with tab indentation.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }

    pub fn to_output_file(&self, out_root: impl Into<PathBuf>) -> Result<OutputFile> {
        Ok(OutputFile::new(out_root, BUNDLE_INFO_FILE, self.to_json()?))
    }
}

/// `/` separators, no leading `./`, no extension.
pub fn normalize_module_path(path: &str) -> String {
    let path = normalize_separators(path);
    let path = path.strip_prefix("./").unwrap_or(&path);
    let name_start = path.rfind('/').map_or(0, |idx| idx + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => path[..name_start + dot].to_string(),
        _ => path.to_string(),
    }
}

fn resolve_specifier(importer: &str, specifier: &str) -> String {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return specifier.to_string();
    }
    let base = Path::new(importer).parent().unwrap_or(Path::new(""));
    normalize_separators(&base.join(specifier).clean().to_string_lossy())
}
