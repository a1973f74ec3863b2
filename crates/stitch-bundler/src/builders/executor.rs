//! Parallel execution of per-module bundling.
//!
//! One task per module runs on a `JoinSet`. All of them are awaited before
//! anything is aggregated, and aggregation walks the modules in sorted order,
//! so the result never depends on which task finished first.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::builders::invoker::{ModuleBundle, invoke_module};
use crate::engine::{BundleConfig, BundleEngine};
use crate::modules::ModuleSet;
use crate::output::OutputFile;
use crate::output::metadata::{BundleMetadata, DuplicateKey};
use crate::{Error, Result};

/// Concurrency settings for [`execute_bundles`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Cap on concurrently running invocations. `None` runs every module at
    /// once.
    pub max_parallel: Option<usize>,
}

impl ExecutorOptions {
    /// One invocation at a time, for debugging.
    pub fn serial() -> Self {
        Self {
            max_parallel: Some(1),
        }
    }
}

/// Aggregated result of every module's bundling.
#[derive(Debug, Clone, Default)]
pub struct BundleSetOutput {
    /// Files of every module, module by module in sorted module order.
    pub files: Vec<OutputFile>,
    pub metadata: Option<BundleMetadata>,
    pub inlined_resources: BTreeSet<String>,
}

/// Bundle every module of `modules` concurrently.
///
/// Fails if any invocation fails. The error returned is the one of the
/// first failing module in sorted order, unchanged; the others are logged.
pub async fn execute_bundles(
    engine: Arc<dyn BundleEngine>,
    modules: &ModuleSet,
    config: Arc<BundleConfig>,
    options: ExecutorOptions,
) -> Result<BundleSetOutput> {
    let semaphore = options
        .max_parallel
        .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

    let mut join_set = JoinSet::new();
    let mut task_modules = HashMap::default();

    for module in modules.iter() {
        let module = module.to_string();
        let engine = Arc::clone(&engine);
        let config = Arc::clone(&config);
        let semaphore = semaphore.clone();
        let task_module = module.clone();

        let handle = join_set.spawn(async move {
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            let result = invoke_module(engine.as_ref(), &module, config).await;
            (module, result)
        });
        task_modules.insert(handle.id(), task_module);
    }

    let mut results: BTreeMap<String, Result<ModuleBundle>> = BTreeMap::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((module, result)) => {
                results.insert(module, result);
            }
            Err(join_err) => {
                let module = task_modules
                    .get(&join_err.id())
                    .cloned()
                    .unwrap_or_else(|| "<unknown>".to_string());
                results.insert(
                    module.clone(),
                    Err(Error::TaskPanicked {
                        module,
                        message: join_err.to_string(),
                    }),
                );
            }
        }
    }

    let mut bundles = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (module, result) in results {
        match result {
            Ok(bundle) => bundles.push(bundle),
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(err) => tracing::error!(module = %module, error = %err, "Bundling failed"),
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    Ok(aggregate(bundles))
}

/// Fold module results, already in sorted module order.
fn aggregate(bundles: Vec<ModuleBundle>) -> BundleSetOutput {
    let mut output = BundleSetOutput::default();
    let mut owners: HashMap<String, String> = HashMap::default();

    for bundle in bundles {
        output.files.extend(bundle.files);
        output.inlined_resources.extend(bundle.inlined_resources);

        let Some(contribution) = bundle.metadata else {
            continue;
        };
        let keys: Vec<String> = contribution
            .graph
            .keys()
            .map(|k| format!("graph:{k}"))
            .chain(contribution.bundles.keys().map(|k| format!("bundles:{k}")))
            .collect();

        let metadata = output.metadata.get_or_insert_with(BundleMetadata::default);
        for duplicate in metadata.merge(contribution) {
            let (section, key) = match &duplicate {
                DuplicateKey::Graph(key) => ("graph", key),
                DuplicateKey::Bundle(key) => ("bundles", key),
            };
            let previous = owners
                .get(&format!("{section}:{key}"))
                .map(String::as_str)
                .unwrap_or("<unknown>");
            tracing::warn!(
                section,
                key = %key,
                previous = %previous,
                module = %bundle.module,
                "Duplicate bundle metadata key; keeping the later module's entry"
            );
        }

        for key in keys {
            owners.insert(key, bundle.module.clone());
        }
    }

    output
}
