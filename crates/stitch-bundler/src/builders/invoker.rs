//! One engine invocation per module.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::builders::dedupe::strip_duplicate_helpers;
use crate::engine::{BundleConfig, BundleEngine, BundleRequest};
use crate::output::OutputFile;
use crate::output::metadata::BundleMetadata;
use crate::{Error, Result};

/// Source extensions tried, in order, when resolving a module's entry file.
pub const ENTRY_EXTENSIONS: [&str; 3] = ["ts", "js", "mjs"];

/// Everything one module's bundling produced.
#[derive(Debug, Clone, Default)]
pub struct ModuleBundle {
    pub module: String,
    pub files: Vec<OutputFile>,
    pub metadata: Option<BundleMetadata>,
    /// Source-root-relative paths the engine inlined into the bundle.
    pub inlined_resources: Vec<String>,
}

/// Find the entry file for `module` under `src_root`.
pub fn resolve_entry_file(src_root: &std::path::Path, module: &str) -> Result<PathBuf> {
    let searched: Vec<PathBuf> = ENTRY_EXTENSIONS
        .iter()
        .map(|ext| src_root.join(format!("{module}.{ext}")))
        .collect();

    if let Some(found) = searched.iter().find(|path| path.is_file()) {
        return Ok(found.clone());
    }

    Err(Error::EntryNotFound {
        module: module.to_string(),
        searched,
    })
}

/// Bundle one module and normalize the result.
///
/// Engine failures are returned unchanged; there is no retry.
pub async fn invoke_module(
    engine: &dyn BundleEngine,
    module: &str,
    config: Arc<BundleConfig>,
) -> Result<ModuleBundle> {
    let entry_file = resolve_entry_file(&config.src_root, module)?;
    let started = Instant::now();
    tracing::info!(module, engine = engine.name(), "Bundling");

    let output = engine
        .bundle(BundleRequest {
            module: module.to_string(),
            entry_file,
            config: Arc::clone(&config),
        })
        .await?;

    let files = output
        .files
        .into_iter()
        .map(|mut file| {
            if file.is_script() {
                let stripped = match strip_duplicate_helpers(&file.text()) {
                    Cow::Owned(stripped) => Some(stripped),
                    Cow::Borrowed(_) => None,
                };
                if let Some(stripped) = stripped {
                    file.contents = stripped.into_bytes();
                }
            }
            file
        })
        .collect();

    let mut inlined_resources = Vec::new();
    if let Some(metafile) = &output.metafile {
        inlined_resources.extend(
            metafile
                .inputs
                .keys()
                .filter(|input| config.loader_for(input).is_some_and(|l| l.inlines()))
                .cloned(),
        );
    }

    let metadata = config
        .metafile
        .then(|| output.metafile.as_ref().map(BundleMetadata::from_metafile))
        .flatten();

    tracing::info!(
        module,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Finished bundling"
    );

    Ok(ModuleBundle {
        module: module.to_string(),
        files,
        metadata,
        inlined_resources,
    })
}
