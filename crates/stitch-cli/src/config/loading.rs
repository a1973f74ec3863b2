use crate::cli::BuildArgs;
use crate::config::StitchConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use stitch_bundler::EntryPoint;

/// Config file picked up from the working directory.
pub const CONFIG_FILE: &str = "stitch.config.json";

/// Environment variable prefix (`STITCH_OUT_DIR`, `STITCH_MAX_PARALLEL`, ...).
const ENV_PREFIX: &str = "STITCH_";

/// Flags given on the command line; unset ones leave lower layers alone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    src_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_parallel: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    serial: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    languages: Option<Vec<String>>,
}

impl CliOverrides {
    fn from_build_args(args: &BuildArgs) -> Self {
        Self {
            src_dir: args.src_dir.clone(),
            out_dir: args.out_dir.clone(),
            max_parallel: args.max_parallel,
            serial: args.serial.then_some(true),
            bundle_info: args.no_bundle_info.then_some(false),
            languages: (!args.languages.is_empty()).then(|| args.languages.clone()),
        }
    }
}

impl StitchConfig {
    /// Load configuration from every source.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load(args: &BuildArgs, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        let config_file = match &args.config {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    cwd.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = &config_file {
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).map(|key| env_key(key.as_str()).into()));
        figment = figment.merge(Serialized::defaults(CliOverrides::from_build_args(args)));

        let mut config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: format!("Check {} syntax and field types", CONFIG_FILE),
        })?;

        // Entry flags add to the configured entry points.
        config
            .entry_points
            .extend(args.entries.iter().map(EntryPoint::new));

        config.src_dir = resolve_path(&config.src_dir, cwd);
        config.out_dir = resolve_path(&config.out_dir, cwd);
        Ok(config)
    }

    /// Default configuration values.
    pub fn default_config() -> Self {
        use crate::config::defaults::*;

        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            entry_points: Vec::new(),
            resources: Vec::new(),
            loader: Default::default(),
            header: default_header(),
            copyright_marker: default_copyright_marker(),
            bundle_info: default_bundle_info(),
            languages: Vec::new(),
            concat: Vec::new(),
            source_maps: Default::default(),
            asset_loaders: Default::default(),
            max_parallel: None,
            serial: false,
        }
    }
}

/// `OUT_DIR` (already stripped of the prefix) to `outDir`.
fn env_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

pub(crate) fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("OUT_DIR"), "outDir");
        assert_eq!(env_key("max_parallel"), "maxParallel");
        assert_eq!(env_key("SERIAL"), "serial");
    }

    #[test]
    fn test_overrides_skip_unset_flags() {
        let overrides = CliOverrides::from_build_args(&BuildArgs::default());
        let json = serde_json::to_value(&overrides).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let args = BuildArgs {
            serial: true,
            no_bundle_info: true,
            ..Default::default()
        };
        let json = serde_json::to_value(CliOverrides::from_build_args(&args)).unwrap();
        assert_eq!(json["serial"], true);
        assert_eq!(json["bundleInfo"], false);
    }
}
