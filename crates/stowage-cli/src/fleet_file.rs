//! fleet.toml parser.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use stowage_strategy::{DEFAULT_OPTS, NodeResources, StrategyKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetFile {
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub nodes: Vec<NodeResources>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySection {
    #[serde(default)]
    pub name: StrategyKind,
    /// Strategy options string, e.g. the overcommit ratio `"0.05"`.
    #[serde(default = "default_opts")]
    pub opts: String,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            name: StrategyKind::default(),
            opts: default_opts(),
        }
    }
}

fn default_opts() -> String {
    DEFAULT_OPTS.to_string()
}

impl FleetFile {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let fleet: FleetFile = toml::from_str(content)?;
        fleet.validate()?;
        Ok(fleet)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                bail!("duplicate node id: {}", node.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[strategy]
name = "binpacking"
opts = "0.05"

[[nodes]]
id = "node-1"
memory = 1000
cpus = 1000

[[nodes]]
id = "node-2"
memory = 1000
cpus = 1000
reserved_memory = 500
reserved_cpus = 500
"#;

    #[test]
    fn parses_sample() {
        let fleet = FleetFile::from_toml_str(SAMPLE).unwrap();

        assert_eq!(fleet.strategy.name, StrategyKind::Binpack);
        assert_eq!(fleet.strategy.opts, "0.05");
        assert_eq!(fleet.nodes.len(), 2);
        assert_eq!(fleet.nodes[0].reserved_memory, 0);
        assert_eq!(fleet.nodes[1].reserved_cpus, 500);
    }

    #[test]
    fn strategy_section_is_optional() {
        let fleet = FleetFile::from_toml_str(
            r#"
[[nodes]]
id = "n1"
memory = 10
cpus = 10
"#,
        )
        .unwrap();

        assert_eq!(fleet.strategy.name, StrategyKind::Binpack);
        assert_eq!(fleet.strategy.opts, DEFAULT_OPTS);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = FleetFile::from_toml_str(
            r#"
[[nodes]]
id = "n1"
memory = 10
cpus = 10

[[nodes]]
id = "n1"
memory = 20
cpus = 20
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("duplicate node id: n1"));
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(FleetFile::from_toml_str("[strategy]\nname = \"spread\"\n").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let fleet = FleetFile::from_file(&path).unwrap();
        assert_eq!(fleet.nodes[1].id, "node-2");
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = FleetFile::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn toml_roundtrip_keeps_nodes() {
        let fleet = FleetFile::from_toml_str(SAMPLE).unwrap();
        let back = FleetFile::from_toml_str(&toml::to_string_pretty(&fleet).unwrap()).unwrap();
        assert_eq!(back.nodes, fleet.nodes);
    }
}
