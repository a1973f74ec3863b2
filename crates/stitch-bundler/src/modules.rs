//! Module set resolution from entry-point declarations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Synthetic CSS-loader shim module.
///
/// It is produced by the loader preamble and never bundled on its own.
pub const CSS_SHIM_MODULE: &str = "vs/css";

/// One module to bundle plus modules to force-include or force-exclude.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryPoint {
    pub name: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn include<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(modules.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(modules.into_iter().map(Into::into));
        self
    }
}

/// Deduplicated, sorted set of modules that must be bundled.
///
/// Excluded modules are still members (they are bundled like any other
/// module) but are also tracked separately so their files can be filtered
/// out of the passthrough resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSet {
    modules: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl ModuleSet {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    /// Modules in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    pub fn is_excluded(&self, module: &str) -> bool {
        self.excluded.contains(module)
    }
}

impl<'a> IntoIterator for &'a ModuleSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

/// Resolve the modules to bundle from a list of entry points.
///
/// The result is the union of every entry's name, include list and exclude
/// list, minus [`CSS_SHIM_MODULE`]. Duplicates and unknown names are
/// tolerated.
pub fn resolve_module_set(entry_points: &[EntryPoint]) -> ModuleSet {
    let mut set = ModuleSet::default();

    for entry in entry_points {
        set.modules.insert(entry.name.clone());
        set.modules.extend(entry.include.iter().cloned());
        set.modules.extend(entry.exclude.iter().cloned());
        set.excluded.extend(entry.exclude.iter().cloned());
    }

    set.modules.remove(CSS_SHIM_MODULE);
    set
}
