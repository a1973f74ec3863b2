use crate::cli::parse_language;
use crate::config::StitchConfig;
use crate::error::{ConfigError, Result};
use stitch_bundler::HeaderInjector;

impl StitchConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.entry_points.is_empty() {
            return Err(ConfigError::MissingField {
                field: "entryPoints".to_string(),
                hint: "Provide at least one entry point in the config file or with --entry"
                    .to_string(),
            }
            .into());
        }

        if let Some(index) = self.entry_points.iter().position(|e| e.name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("entryPoints[{}].name", index),
                value: "\"\"".to_string(),
                hint: "Every entry point needs a module name such as \"vs/app\"".to_string(),
            }
            .into());
        }

        if let Some(job) = self.concat.iter().find(|job| job.sources.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "concat".to_string(),
                value: job.destination.clone(),
                hint: "A concatenation job needs at least one source".to_string(),
            }
            .into());
        }

        if HeaderInjector::new(self.header.clone(), &self.copyright_marker).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "copyrightMarker".to_string(),
                value: self.copyright_marker.clone(),
                hint: "Must be a valid regular expression".to_string(),
            }
            .into());
        }

        match self.max_parallel {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    field: "maxParallel".to_string(),
                    value: "0".to_string(),
                    hint: "Use at least 1, or omit it to bundle every module at once".to_string(),
                }
                .into());
            }
            Some(n) if self.serial && n > 1 => {
                return Err(ConfigError::ConflictingOptions(format!(
                    "serial: true and maxParallel: {}",
                    n
                ))
                .into());
            }
            _ => {}
        }

        for language in &self.languages {
            if let Err(hint) = parse_language(language) {
                return Err(ConfigError::InvalidValue {
                    field: "languages".to_string(),
                    value: language.clone(),
                    hint,
                }
                .into());
            }
        }

        Ok(())
    }
}
