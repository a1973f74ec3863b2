//! Localization seam.
//!
//! A [`Localizer`] forks the merged stream into one translated stream per
//! language. The crate ships only [`Passthrough`]; real string substitution
//! lives outside this crate.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::Result;
use crate::output::OutputFile;

#[derive(Debug, Clone, Default)]
pub struct LocalizeOptions {
    pub out_root: PathBuf,
    pub file_header: String,
    /// Language tags, e.g. `de`, `zh-tw`.
    pub languages: Vec<String>,
}

/// The original stream plus one stream per language.
#[derive(Debug, Clone, Default)]
pub struct LocalizedStreams {
    pub original: Vec<OutputFile>,
    pub translations: BTreeMap<String, Vec<OutputFile>>,
}

impl LocalizedStreams {
    pub fn passthrough(files: Vec<OutputFile>) -> Self {
        Self {
            original: files,
            translations: BTreeMap::new(),
        }
    }

    /// Every file, original first, then each language in tag order.
    pub fn into_files(self) -> Vec<OutputFile> {
        let mut files = self.original;
        for (_, translated) in self.translations {
            files.extend(translated);
        }
        files
    }
}

#[async_trait]
pub trait Localizer: Send + Sync + std::fmt::Debug {
    async fn localize(
        &self,
        files: Vec<OutputFile>,
        options: &LocalizeOptions,
    ) -> Result<LocalizedStreams>;
}

/// Returns the stream untouched and produces no translations.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

#[async_trait]
impl Localizer for Passthrough {
    async fn localize(
        &self,
        files: Vec<OutputFile>,
        options: &LocalizeOptions,
    ) -> Result<LocalizedStreams> {
        if !options.languages.is_empty() {
            tracing::debug!(
                languages = ?options.languages,
                "Passthrough localizer ignores configured languages"
            );
        }
        Ok(LocalizedStreams::passthrough(files))
    }
}
