//! End-to-end assembly of one build.
//!
//! ```text
//! entry points ─▶ module set ─▶ executor ──┐
//!                     loader preamble ─────┤
//!                     concat jobs ─────────┼─▶ merge ─▶ source maps ─▶ localize ─▶ commit
//!                     resources ───────────┤
//!                     bundleInfo.json ─────┘
//! ```
//!
//! The four producers run concurrently and join before the merge; the merge
//! and everything after it see the complete stream.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::builders::concat::{ConcatJob, run_concat_jobs};
use crate::builders::executor::{ExecutorOptions, execute_bundles};
use crate::builders::header::{DEFAULT_COPYRIGHT_MARKER, DEFAULT_HEADER, HeaderInjector};
use crate::builders::preamble::{LoaderPreamble, build_preamble};
use crate::builders::resources::{collect_resources, filter_resources};
use crate::engine::{AssetLoader, BundleConfig, BundleEngine, RolldownEngine, default_asset_loaders};
use crate::localize::{LocalizeOptions, Localizer, Passthrough};
use crate::modules::{EntryPoint, resolve_module_set};
use crate::output::merge::{MergeInputs, merge_streams};
use crate::output::{OutputFile, commit_output_tree};
use crate::sourcemap::{SourceMapOptions, reconcile_source_maps};
use crate::{Error, Result};

/// Everything one build needs, with defaults for all but the roots.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub src_root: PathBuf,
    pub out_root: PathBuf,
    pub entry_points: Vec<EntryPoint>,
    /// Globs (source-root relative) of files copied through unchanged.
    pub resources: Vec<String>,
    pub loader: LoaderPreamble,
    pub header: String,
    pub copyright_marker: String,
    /// Emit `bundleInfo.json`.
    pub bundle_info: bool,
    pub languages: Vec<String>,
    pub concat: Vec<ConcatJob>,
    pub source_maps: SourceMapOptions,
    pub asset_loaders: BTreeMap<String, AssetLoader>,
    pub executor: ExecutorOptions,
    /// Replace existing files in the output root.
    pub overwrite: bool,
}

impl PipelineOptions {
    pub fn new(src_root: impl Into<PathBuf>, out_root: impl Into<PathBuf>) -> Self {
        let src_root = src_root.into();
        Self {
            source_maps: SourceMapOptions {
                src_root: src_root.clone(),
                ..SourceMapOptions::default()
            },
            src_root,
            out_root: out_root.into(),
            entry_points: Vec::new(),
            resources: Vec::new(),
            loader: LoaderPreamble::default(),
            header: DEFAULT_HEADER.to_string(),
            copyright_marker: DEFAULT_COPYRIGHT_MARKER.to_string(),
            bundle_info: true,
            languages: Vec::new(),
            concat: Vec::new(),
            asset_loaders: default_asset_loaders(),
            executor: ExecutorOptions::default(),
            overwrite: true,
        }
    }

    pub fn entry_point(mut self, entry: EntryPoint) -> Self {
        self.entry_points.push(entry);
        self
    }

    pub fn entry_points(mut self, entries: impl IntoIterator<Item = EntryPoint>) -> Self {
        self.entry_points.extend(entries);
        self
    }

    pub fn resources<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(globs.into_iter().map(Into::into));
        self
    }

    pub fn loader(mut self, loader: LoaderPreamble) -> Self {
        self.loader = loader;
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn copyright_marker(mut self, marker: impl Into<String>) -> Self {
        self.copyright_marker = marker.into();
        self
    }

    pub fn bundle_info(mut self, enabled: bool) -> Self {
        self.bundle_info = enabled;
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages.extend(languages.into_iter().map(Into::into));
        self
    }

    pub fn concat_job(mut self, job: ConcatJob) -> Self {
        self.concat.push(job);
        self
    }

    /// Source-map handling; `src_root` is always taken from these options.
    pub fn source_maps(mut self, source_maps: SourceMapOptions) -> Self {
        self.source_maps = SourceMapOptions {
            src_root: self.src_root.clone(),
            ..source_maps
        };
        self
    }

    pub fn asset_loader(mut self, extension: impl Into<String>, loader: AssetLoader) -> Self {
        self.asset_loaders.insert(extension.into(), loader);
        self
    }

    pub fn max_parallel(mut self, limit: Option<usize>) -> Self {
        self.executor.max_parallel = limit;
        self
    }

    /// Bundle one module at a time.
    pub fn serial(mut self) -> Self {
        self.executor = ExecutorOptions::serial();
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.entry_points.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one entry point is required".to_string(),
            ));
        }
        if let Some(job) = self.concat.iter().find(|job| job.sources.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "concatenation job for '{}' has no sources",
                job.destination
            )));
        }
        if self.executor.max_parallel == Some(0) {
            return Err(Error::InvalidConfig(
                "max_parallel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Summary of a committed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub files: usize,
    pub bytes: u64,
    pub modules: usize,
    pub elapsed: Duration,
}

/// One build: options plus the engine and localizer seams.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
    engine: Arc<dyn BundleEngine>,
    localizer: Arc<dyn Localizer>,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            engine: Arc::new(RolldownEngine::new()),
            localizer: Arc::new(Passthrough),
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn BundleEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Produce the final ordered stream without touching the output root.
    pub async fn assemble(&self) -> Result<Vec<OutputFile>> {
        let options = &self.options;
        options.validate()?;

        let header = HeaderInjector::new(options.header.clone(), &options.copyright_marker)?;
        let modules = resolve_module_set(&options.entry_points);
        tracing::debug!(modules = modules.len(), "Resolved module set");

        // Engine maps are always requested: header detection reads their
        // source content. The reconciler drops them when maps are disabled.
        let config = Arc::new(BundleConfig {
            asset_loaders: options.asset_loaders.clone(),
            source_maps: true,
            ..BundleConfig::new(&options.src_root, &options.out_root)
        });

        let (bundled, preamble, concatenated, resources) = tokio::try_join!(
            execute_bundles(
                Arc::clone(&self.engine),
                &modules,
                Arc::clone(&config),
                options.executor,
            ),
            build_preamble(
                &options.loader,
                header.header(),
                &options.src_root,
                &options.out_root,
            ),
            run_concat_jobs(
                &options.concat,
                &options.src_root,
                &options.out_root,
                &header,
            ),
            collect_resources(
                options.src_root.clone(),
                options.out_root.clone(),
                options.resources.clone(),
            ),
        )?;

        let mut bundles = bundled.files;
        for file in bundles.iter_mut().filter(|f| f.is_script()) {
            let sources = constituent_sources(file);
            header.apply(file, &sources);
        }

        let resources = filter_resources(resources, &bundled.inlined_resources, &modules);

        let metadata = if options.bundle_info {
            Some(
                bundled
                    .metadata
                    .unwrap_or_default()
                    .to_output_file(&options.out_root)?,
            )
        } else {
            None
        };

        let merged = merge_streams(MergeInputs {
            preamble: vec![preamble],
            bundles,
            resources,
            concatenated,
            metadata,
        });
        tracing::debug!(files = merged.len(), "Merged output stream");

        let mapped = reconcile_source_maps(merged, &options.source_maps).await?;

        let localize_options = LocalizeOptions {
            out_root: options.out_root.clone(),
            file_header: header.header().to_string(),
            languages: options.languages.clone(),
        };
        let streams = self.localizer.localize(mapped, &localize_options).await?;

        Ok(streams.into_files())
    }

    /// Assemble and commit the output tree atomically.
    pub async fn run(&self) -> Result<BuildReport> {
        let started = Instant::now();
        let modules = resolve_module_set(&self.options.entry_points).len();
        let files = self.assemble().await?;
        let count = files.len();

        let out_root = self.options.out_root.clone();
        let overwrite = self.options.overwrite;
        let bytes = tokio::task::spawn_blocking(move || commit_output_tree(&files, &out_root, overwrite))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        let report = BuildReport {
            files: count,
            bytes,
            modules,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            files = report.files,
            bytes = report.bytes,
            modules = report.modules,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Build complete"
        );
        Ok(report)
    }
}

/// Original sources that went into a bundled script.
///
/// Taken from the inlined content of its source map; without one the
/// script's own text stands in.
fn constituent_sources(file: &OutputFile) -> Vec<String> {
    let from_map: Vec<String> = file
        .source_map
        .as_ref()
        .and_then(|map| map.sources_content.as_ref())
        .map(|contents| contents.iter().flatten().cloned().collect())
        .unwrap_or_default();

    if from_map.is_empty() {
        vec![file.text().into_owned()]
    } else {
        from_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sourcemap::RawSourceMap;

    #[test]
    fn test_builder_defaults() {
        let options = PipelineOptions::new("src", "out")
            .entry_point(EntryPoint::new("vs/app"))
            .resources(["vs/**/*.png"])
            .serial();

        assert_eq!(options.source_maps.src_root, PathBuf::from("src"));
        assert_eq!(options.executor.max_parallel, Some(1));
        assert!(options.bundle_info);
        assert_eq!(options.loader.output_path(), "vs/loader.js");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_entries_and_jobs() {
        assert!(PipelineOptions::new("src", "out").validate().is_err());

        let options = PipelineOptions::new("src", "out")
            .entry_point(EntryPoint::new("a"))
            .concat_job(ConcatJob::new(Vec::<String>::new(), "x.js"));
        assert!(matches!(options.validate(), Err(Error::InvalidConfig(_))));

        let options = PipelineOptions::new("src", "out")
            .entry_point(EntryPoint::new("a"))
            .max_parallel(Some(0));
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_constituent_sources_prefers_map_content() {
        let map = RawSourceMap::identity("a.ts", "original").unwrap();
        let file = OutputFile::new("out", "a.js", "bundled").with_source_map(map);
        assert_eq!(constituent_sources(&file), vec!["original"]);

        let bare = OutputFile::new("out", "b.js", "bundled");
        assert_eq!(constituent_sources(&bare), vec!["bundled"]);
    }
}
