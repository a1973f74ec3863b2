//! Configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and the config file.
//! Priority: CLI > Environment > File > Defaults

mod conversions;
mod defaults;
mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use stitch_bundler::{AssetLoader, ConcatJob, EntryPoint, LoaderPreamble};

pub use defaults::*;
pub use loading::CONFIG_FILE;

/// Stitch configuration, loaded from stitch.config.json or CLI args.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StitchConfig {
    /// Source root module names resolve against
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    /// Output root
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Modules to bundle with their include and exclude lists
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,

    /// Globs of files copied through unchanged
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    /// Loader preamble parts
    #[serde(default)]
    pub loader: LoaderPreamble,

    /// License header prepended to outputs whose sources carry the marker
    #[serde(default = "default_header")]
    pub header: String,

    /// Regular expression recognizing a copyright notice in sources
    #[serde(default = "default_copyright_marker")]
    pub copyright_marker: String,

    /// Emit bundleInfo.json
    #[serde(default = "default_bundle_info")]
    pub bundle_info: bool,

    /// Target languages for localization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,

    /// Manual concatenation jobs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concat: Vec<ConcatJob>,

    #[serde(default)]
    pub source_maps: SourceMapsConfig,

    /// Loader per extension, merged over the built-in table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub asset_loaders: BTreeMap<String, AssetLoader>,

    /// Cap on concurrently bundled modules (unbounded when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,

    /// Bundle one module at a time
    #[serde(default)]
    pub serial: bool,
}

/// Source map settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceMapsConfig {
    #[serde(default = "default_source_maps_enabled")]
    pub enabled: bool,

    /// Absolute URL prefix for sourceMappingURL comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Extra source renames, merged over the built-in ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub renames: BTreeMap<String, String>,
}

impl Default for SourceMapsConfig {
    fn default() -> Self {
        Self {
            enabled: default_source_maps_enabled(),
            base_url: None,
            renames: BTreeMap::new(),
        }
    }
}
