//! Deterministic merge of the output sub-streams.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::output::OutputFile;

/// The sub-streams entering the merge.
///
/// `preamble` and `concatenated` keep the order they arrive in; `bundles`
/// and `resources` are sorted by path, so the merged order never depends on
/// which task finished first.
#[derive(Debug, Default)]
pub struct MergeInputs {
    pub preamble: Vec<OutputFile>,
    pub bundles: Vec<OutputFile>,
    pub resources: Vec<OutputFile>,
    pub concatenated: Vec<OutputFile>,
    pub metadata: Option<OutputFile>,
}

/// Merge every sub-stream into one ordered list.
///
/// A path produced twice keeps its first position and the later content;
/// the collision is logged.
pub fn merge_streams(inputs: MergeInputs) -> Vec<OutputFile> {
    let MergeInputs {
        preamble,
        mut bundles,
        mut resources,
        concatenated,
        metadata,
    } = inputs;

    bundles.sort_by(|a, b| a.path.cmp(&b.path));
    resources.sort_by(|a, b| a.path.cmp(&b.path));

    let mut merged: IndexMap<String, OutputFile> = IndexMap::new();
    let streams = preamble
        .into_iter()
        .chain(bundles)
        .chain(resources)
        .chain(concatenated)
        .chain(metadata);

    for file in streams {
        match merged.entry(file.path.clone()) {
            Entry::Occupied(mut slot) => {
                tracing::warn!(path = %file.path, "Output produced more than once; keeping the later file");
                slot.insert(file);
            }
            Entry::Vacant(slot) => {
                slot.insert(file);
            }
        }
    }

    merged.into_values().collect()
}
