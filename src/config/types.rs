//! Core configuration types
//!
//! This module defines the data structures that describe a `Cli` in YAML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Program name shown in usage text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prog: Option<String>,

    /// Replacement for the generated usage line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Description shown in top-level help
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Literal printed by `-V/--version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Whether `help <command>` is accepted
    #[serde(rename = "add-help-command", default = "default_true")]
    pub add_help_command: bool,

    /// Plugin groups mapped to the modules providing their commands
    #[serde(
        rename = "entry-points",
        default,
        skip_serializing_if = "EntryPoints::is_empty",
        deserialize_with = "deserialize_entry_points"
    )]
    pub entry_points: EntryPoints,
}

fn default_true() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            prog: None,
            usage: None,
            description: None,
            version: None,
            add_help_command: true,
            entry_points: EntryPoints::default(),
        }
    }
}

/// Plugin registry: group identifier to an ordered list of module paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntryPoints {
    groups: BTreeMap<String, Vec<String>>,
}

impl EntryPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module to a group
    pub fn add(&mut self, group: impl Into<String>, module: impl Into<String>) -> &mut Self {
        self.groups.entry(group.into()).or_default().push(module.into());
        self
    }

    /// Modules registered for `group`; empty for unknown groups
    pub fn group(&self, group: &str) -> &[String] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over groups and their modules
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(g, m)| (g.as_str(), m.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Add every group of `other` after this one's entries
    pub fn merge(&mut self, other: &EntryPoints) {
        for (group, modules) in other.iter() {
            self.groups
                .entry(group.to_string())
                .or_default()
                .extend(modules.iter().cloned());
        }
    }
}

/// Custom deserializer for entry points that accepts a single module or a list per group
fn deserialize_entry_points<'de, D>(deserializer: D) -> Result<EntryPoints, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let mut entry_points = EntryPoints::new();

    for (group, value) in raw {
        match value {
            Value::String(module) => {
                entry_points.add(group, module);
            }
            Value::Sequence(seq) => {
                for item in seq {
                    let module = String::deserialize(item).map_err(D::Error::custom)?;
                    entry_points.add(group.clone(), module);
                }
            }
            // An empty group is still a known group
            Value::Null => {
                entry_points.groups.entry(group).or_default();
            }
            _ => {
                return Err(D::Error::custom(format!(
                    "entry point group '{}' must be a module path or a list of module paths",
                    group
                )))
            }
        }
    }

    Ok(entry_points)
}
