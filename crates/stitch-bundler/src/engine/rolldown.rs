//! In-process engine backed by Rolldown.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, IsExternal, OutputFormat,
    Platform, SourceMapType,
};
use rolldown_common::{ModuleType, Output};

use super::{
    AssetLoader, BundleEngine, BundleRequest, EngineOutput, Metafile, MetafileImport,
    MetafileInput, MetafileOutput,
};
use crate::output::{OutputFile, normalize_separators};
use crate::sourcemap::RawSourceMap;
use crate::{Error, Result};

/// Bundles one module per call with Rolldown's `generate()`, which keeps
/// output in memory.
///
/// Each call runs on its own task so a panic inside the engine surfaces as
/// that module's [`Error::TaskPanicked`] instead of tearing down the build.
#[derive(Debug, Default, Clone)]
pub struct RolldownEngine;

impl RolldownEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BundleEngine for RolldownEngine {
    fn name(&self) -> &str {
        "rolldown"
    }

    async fn bundle(&self, request: BundleRequest) -> Result<EngineOutput> {
        let module = request.module.clone();
        tokio::spawn(generate(request))
            .await
            .map_err(|e| Error::TaskPanicked {
                module,
                message: e.to_string(),
            })?
    }
}

fn configure_rolldown_options(request: &BundleRequest) -> BundlerOptions {
    let config = &request.config;

    // Target level is left at the engine default (latest ECMAScript).
    BundlerOptions {
        input: Some(vec![InputItem {
            name: Some(request.module.clone()),
            import: request.entry_file.to_string_lossy().into_owned(),
        }]),
        cwd: Some(config.src_root.clone()),
        format: Some(OutputFormat::Esm),
        platform: Some(Platform::Neutral),
        // Hidden: no `sourceMappingURL` comment, the map travels on the chunk.
        sourcemap: config.source_maps.then_some(SourceMapType::Hidden),
        external: Some(IsExternal::from(config.external.clone())),
        module_types: Some(
            config
                .asset_loaders
                .iter()
                .map(|(ext, loader)| (ext.clone(), module_type_for(*loader)))
                .collect(),
        ),
        ..Default::default()
    }
}

fn module_type_for(loader: AssetLoader) -> ModuleType {
    match loader {
        AssetLoader::File => ModuleType::Asset,
        AssetLoader::Base64 => ModuleType::Base64,
        AssetLoader::DataUrl => ModuleType::Dataurl,
        AssetLoader::Text => ModuleType::Text,
        AssetLoader::Binary => ModuleType::Binary,
    }
}

async fn generate(request: BundleRequest) -> Result<EngineOutput> {
    let options = configure_rolldown_options(&request);
    let module = request.module.as_str();
    let config = &request.config;

    let mut bundler = RolldownBundlerBuilder::default()
        .with_options(options)
        .build()
        .map_err(|e| Error::from_rolldown_batch(module, &e))?;

    let bundle = bundler
        .generate()
        .await
        .map_err(|e| Error::from_rolldown_batch(module, &e))?;

    let mut files = Vec::with_capacity(bundle.assets.len());
    let mut metafile = Metafile::default();

    for output in &bundle.assets {
        match output {
            Output::Chunk(chunk) => {
                let filename = normalize_separators(chunk.filename.as_str());
                let mut file =
                    OutputFile::new(config.out_root.clone(), filename.clone(), chunk.code.clone());
                if let Some(map) = &chunk.map {
                    file.source_map = Some(RawSourceMap::from_json(&filename, &map.to_json_string())?);
                }
                files.push(file);

                if !config.metafile {
                    continue;
                }

                let module_ids: Vec<String> = chunk
                    .module_ids
                    .iter()
                    .map(|id| id.to_string())
                    .filter(|id| !is_virtual_module(id))
                    .map(|id| relative_to(&id, &config.src_root))
                    .collect();
                let facade = chunk
                    .facade_module_id
                    .as_ref()
                    .map(|id| relative_to(&id.to_string(), &config.src_root));

                // Rolldown exposes imports per chunk, not per module: the facade
                // module is recorded as importing everything bundled with it.
                for id in &module_ids {
                    let imports = if facade.as_deref() == Some(id.as_str()) {
                        module_ids
                            .iter()
                            .filter(|other| *other != id)
                            .cloned()
                            .chain(chunk.imports.iter().map(|s| s.to_string()))
                            .map(|path| MetafileImport { path })
                            .collect()
                    } else {
                        Vec::new()
                    };
                    metafile.inputs.insert(id.clone(), MetafileInput { imports });
                }

                metafile.outputs.insert(
                    filename,
                    MetafileOutput {
                        inputs: module_ids
                            .into_iter()
                            .map(|id| (id, serde_json::Value::Object(Default::default())))
                            .collect::<BTreeMap<_, _>>(),
                    },
                );
            }
            Output::Asset(asset) => {
                if asset.filename.as_str().ends_with(".map") {
                    continue;
                }
                files.push(OutputFile::new(
                    config.out_root.clone(),
                    asset.filename.as_str(),
                    asset.source.as_bytes().to_vec(),
                ));
            }
        }
    }

    Ok(EngineOutput {
        files,
        metafile: config.metafile.then_some(metafile),
    })
}

/// Engine-internal modules such as the Rolldown runtime.
fn is_virtual_module(id: &str) -> bool {
    id.starts_with('\0') || id.starts_with("rolldown:")
}

/// Express `path` relative to `root` with `/` separators.
pub(crate) fn relative_to(path: &str, root: &Path) -> String {
    let path_ref = Path::new(path);
    let relative = path_ref.strip_prefix(root).unwrap_or(path_ref);
    normalize_separators(&relative.to_string_lossy())
}
