//! Loader preamble: the bootstrap file loaded before any bundle.
//!
//! The preamble is hand-assembled rather than bundled. Its parts are ranked
//! and emitted in ascending rank after an unconditional header:
//!
//! | rank | part                  |
//! |------|-----------------------|
//! | 0    | runtime loader        |
//! | 1    | CSS-loading shim      |
//! | 2    | external loader info  |
//!
//! Parts with equal rank keep their registration order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;
use crate::builders::concat::{SourceJoiner, read_source};
use crate::modules::CSS_SHIM_MODULE;
use crate::output::OutputFile;

/// Placeholder replaced by a run-time overridable base URL expression.
pub const BASE_URL_PLACEHOLDER: &str = "__STITCH_BASE_URL__";

/// Global a host can set before loading to redirect module loading.
pub const BASE_URL_GLOBAL: &str = "globalThis._STITCH_BASE_URL";

/// Rank of a preamble part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreambleRank {
    Loader = 0,
    CssShim = 1,
    ExternalInfo = 2,
}

/// Loader configuration a host can redirect after the fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalLoaderInfo {
    /// Base URL used when the host does not override it.
    pub base_url: String,
    /// Extra `require.config` entries.
    pub config: Map<String, Value>,
}

impl ExternalLoaderInfo {
    /// `require.config(...)` call with the base URL left overridable.
    pub fn render(&self) -> Result<String> {
        let mut config = self.config.clone();
        config.insert(
            "baseUrl".to_string(),
            Value::String(BASE_URL_PLACEHOLDER.to_string()),
        );
        let json = serde_json::to_string(&config)?;
        let default_url = serde_json::to_string(&self.base_url)?;
        let expression = format!("({BASE_URL_GLOBAL} ?? {default_url})");
        let json = json.replace(&format!("\"{BASE_URL_PLACEHOLDER}\""), &expression);
        Ok(format!("require.config({json});"))
    }
}

/// What goes into the loader preamble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderPreamble {
    /// Runtime loader module; also names the output (`<runtime>.js`).
    pub runtime: String,
    pub css_shim: Option<String>,
    pub external_loader_info: Option<ExternalLoaderInfo>,
}

impl Default for LoaderPreamble {
    fn default() -> Self {
        Self {
            runtime: "vs/loader".to_string(),
            css_shim: Some(CSS_SHIM_MODULE.to_string()),
            external_loader_info: None,
        }
    }
}

impl LoaderPreamble {
    pub fn output_path(&self) -> String {
        format!("{}.js", self.runtime)
    }
}

/// One ranked part of the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreambleSource {
    pub rank: PreambleRank,
    pub name: String,
    pub contents: String,
}

/// Order `sources` by rank, keeping registration order within a rank.
pub fn order_sources(mut sources: Vec<PreambleSource>) -> Vec<PreambleSource> {
    sources.sort_by_key(|s| s.rank);
    sources
}

/// Read the configured parts and produce the single preamble file.
pub async fn build_preamble(
    preamble: &LoaderPreamble,
    header: &str,
    src_root: &Path,
    out_root: &Path,
) -> Result<OutputFile> {
    let mut sources = Vec::with_capacity(3);

    if let Some(info) = &preamble.external_loader_info {
        sources.push(PreambleSource {
            rank: PreambleRank::ExternalInfo,
            name: "external-loader-info.js".to_string(),
            contents: info.render()?,
        });
    }
    if let Some(shim) = &preamble.css_shim {
        let name = format!("{shim}.js");
        sources.push(PreambleSource {
            rank: PreambleRank::CssShim,
            contents: read_source(src_root, &name).await?,
            name,
        });
    }
    let name = preamble.output_path();
    sources.push(PreambleSource {
        rank: PreambleRank::Loader,
        contents: read_source(src_root, &name).await?,
        name,
    });

    let output_path = preamble.output_path();
    let mut joiner = SourceJoiner::new();
    joiner.append_raw(header);
    for source in order_sources(sources) {
        joiner.append_source(&source.name, &source.contents);
    }
    let (code, map) = joiner.finish(&output_path)?;

    tracing::debug!(path = %output_path, "Built loader preamble");
    Ok(OutputFile::new(out_root, output_path, code).with_source_map(map))
}
