use crate::config::StitchConfig;
use stitch_bundler::{PipelineOptions, SourceMapOptions};

impl StitchConfig {
    /// Library options for this configuration.
    pub fn to_pipeline_options(&self) -> PipelineOptions {
        let mut options = PipelineOptions::new(self.src_dir.clone(), self.out_dir.clone())
            .entry_points(self.entry_points.iter().cloned())
            .resources(self.resources.iter().cloned())
            .loader(self.loader.clone())
            .header(self.header.clone())
            .copyright_marker(self.copyright_marker.clone())
            .bundle_info(self.bundle_info)
            .languages(self.languages.iter().cloned());

        for job in &self.concat {
            options = options.concat_job(job.clone());
        }
        for (extension, loader) in &self.asset_loaders {
            options = options.asset_loader(extension.clone(), *loader);
        }

        let mut source_maps = SourceMapOptions {
            enabled: self.source_maps.enabled,
            base_url: self.source_maps.base_url.clone(),
            ..SourceMapOptions::default()
        };
        source_maps.renames.extend(self.source_maps.renames.clone());
        options = options.source_maps(source_maps);

        if self.serial {
            options.serial()
        } else {
            options.max_parallel(self.max_parallel)
        }
    }
}
