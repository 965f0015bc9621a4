//! YAML tool-knowledge plugins.
//!
//! A plugin is one YAML file describing a tool: a description plus example
//! commands grouped into categories. The library is a static lookup table
//! consumed during prompt construction; it never executes anything. Files
//! that fail to parse are skipped with a warning so one bad plugin cannot
//! take the whole library down.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandExample {
    pub cmd: String,
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub examples: Vec<CommandExample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolKnowledge {
    pub tool: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl ToolKnowledge {
    pub fn all_examples(&self) -> impl Iterator<Item = &CommandExample> {
        self.categories.iter().flat_map(|c| c.examples.iter())
    }
}

pub struct PluginLibrary {
    plugins: HashMap<String, ToolKnowledge>,
}

impl PluginLibrary {
    /// Load every `.yml`/`.yaml` file under `dir`. A missing directory is
    /// an empty library, not an error.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, PluginError> {
        let dir = dir.as_ref();
        let mut plugins = HashMap::new();

        if dir.is_dir() {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                let is_yaml = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "yml" || e == "yaml");
                if !is_yaml {
                    continue;
                }
                match fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|raw| {
                        serde_yaml::from_str::<ToolKnowledge>(&raw).map_err(|e| e.to_string())
                    }) {
                    Ok(knowledge) => {
                        plugins.insert(knowledge.tool.clone(), knowledge);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping plugin");
                    }
                }
            }
        }

        tracing::debug!(count = plugins.len(), "loaded tool plugins");
        Ok(Self { plugins })
    }

    pub fn lookup(&self, tool: &str) -> Option<&ToolKnowledge> {
        self.plugins.get(tool)
    }

    /// Flattened example commands for one tool; empty when unknown.
    pub fn examples(&self, tool: &str) -> Vec<&CommandExample> {
        self.lookup(tool)
            .map(|k| k.all_examples().collect())
            .unwrap_or_default()
    }

    /// Known tool names, sorted for stable display.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }
}
