//! Workflow locator mapping.
//!
//! Agents are addressed by name; each name maps to a locator string of the
//! form `<module>:<constructor>`. The mapping comes from a `langgraph.json`
//! style file (`{"graphs": {name: locator}}`) and the `[workflows.graphs]`
//! table, with the table taking precedence.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::schema::WorkflowsConfig;

/// File name searched for when no locator file is configured.
pub const LOCATOR_FILE_NAME: &str = "langgraph.json";

/// Locations searched relative to the working directory, in order.
const SEARCH_PATHS: [&str; 3] = ["../langgraph.json", "../../langgraph.json", LOCATOR_FILE_NAME];

#[derive(Debug, Deserialize)]
struct LocatorFile {
    #[serde(default)]
    graphs: HashMap<String, String>,
}

/// Resolved agent name to locator mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowLocators {
    graphs: HashMap<String, String>,
}

impl WorkflowLocators {
    /// Parse a locator file's JSON content.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let file: LocatorFile = serde_json::from_str(content)?;
        Ok(Self { graphs: file.graphs })
    }

    /// Load a locator file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Find the first existing locator file under `base`.
    pub fn discover(base: &Path) -> Option<PathBuf> {
        SEARCH_PATHS
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|path| path.is_file())
    }

    /// Build the effective mapping for a workflows section.
    ///
    /// An explicitly configured file must exist. A discovered file is
    /// optional; without one only the inline table is used.
    pub fn resolve(config: &WorkflowsConfig, base: &Path) -> Result<Self, ConfigError> {
        let mut locators = match &config.locator_file {
            Some(path) => Self::load(&base.join(path))?,
            None => match Self::discover(base) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        for (name, locator) in &config.graphs {
            locators.graphs.insert(name.clone(), locator.clone());
        }
        Ok(locators)
    }

    pub fn insert(&mut self, name: impl Into<String>, locator: impl Into<String>) {
        self.graphs.insert(name.into(), locator.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.graphs.get(name).map(String::as_str)
    }

    /// Configured agent names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.graphs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graphs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Normalize a locator to `<module/path>:<constructor>`.
///
/// A leading `./` is dropped, a trailing `.rs` or `.py` on the module part is
/// dropped, and `.` separators become `/`. Returns `None` when the locator has
/// no `:` or either side is empty.
pub fn normalize_locator(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let (module, constructor) = trimmed.rsplit_once(':')?;
    let constructor = constructor.trim();
    if constructor.is_empty() {
        return None;
    }

    let module = module
        .strip_suffix(".rs")
        .or_else(|| module.strip_suffix(".py"))
        .unwrap_or(module);
    let module = module.replace('.', "/");
    let module = module.trim_matches('/');
    if module.is_empty() {
        return None;
    }

    Some(format!("{module}:{constructor}"))
}
