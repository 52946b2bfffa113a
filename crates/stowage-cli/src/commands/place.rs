//! `stowage place` and `stowage rank` — run the strategy against a fleet file.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use stowage_strategy::{
    NodeResources, ResourceRequest, StrategyKind, build_strategy, parse_strategy_spec,
};
use tracing::info;

use crate::fleet_file::FleetFile;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unsupported output format: {other} (expected text or json)"),
        }
    }
}

#[derive(Debug, Serialize)]
struct PlacementReport<'a> {
    strategy: &'static str,
    node_id: &'a str,
    memory: u64,
    cpu_shares: u64,
}

#[derive(Debug, Serialize)]
struct RankEntry<'a> {
    node_id: &'a str,
    total: u64,
    cpu: u64,
    memory: u64,
}

/// Resolve the strategy from `--strategy` or the fleet file.
fn resolve(fleet: &FleetFile, spec: Option<&str>) -> Result<(StrategyKind, String)> {
    match spec {
        Some(spec) => parse_strategy_spec(spec).with_context(|| format!("strategy {spec:?}")),
        None => Ok((fleet.strategy.name, fleet.strategy.opts.clone())),
    }
}

/// Choose one node for `request` and render the result.
pub fn place(
    fleet: &FleetFile,
    spec: Option<&str>,
    request: ResourceRequest,
    format: Format,
) -> Result<String> {
    let (kind, opts) = resolve(fleet, spec)?;
    let strategy = build_strategy::<NodeResources>(kind, &opts)
        .with_context(|| format!("initializing {kind} strategy"))?;

    let chosen = strategy
        .place_container(&request, &fleet.nodes)
        .with_context(|| {
            format!(
                "placing memory={} cpu_shares={} on {} nodes",
                request.memory,
                request.cpu_shares,
                fleet.nodes.len()
            )
        })?;

    info!(node = %chosen.id, strategy = strategy.name(), "placement chosen");

    match format {
        Format::Text => Ok(chosen.id.clone()),
        Format::Json => Ok(serde_json::to_string_pretty(&PlacementReport {
            strategy: strategy.name(),
            node_id: &chosen.id,
            memory: request.memory,
            cpu_shares: request.cpu_shares,
        })?),
    }
}

/// Score every node for `request` and render the ranking, best first.
pub fn rank(
    fleet: &FleetFile,
    spec: Option<&str>,
    request: ResourceRequest,
    format: Format,
) -> Result<String> {
    let (kind, opts) = resolve(fleet, spec)?;
    let strategy = build_strategy::<NodeResources>(kind, &opts)
        .with_context(|| format!("initializing {kind} strategy"))?;
    let ranked = strategy.rank(&request, &fleet.nodes);

    let entries: Vec<RankEntry<'_>> = ranked
        .iter()
        .map(|s| RankEntry {
            node_id: &s.node.id,
            total: s.total,
            cpu: s.cpu,
            memory: s.memory,
        })
        .collect();

    match format {
        Format::Json => Ok(serde_json::to_string_pretty(&entries)?),
        Format::Text => {
            let mut out = format!("{:<20} {:>6} {:>6} {:>6}", "NODE", "TOTAL", "CPU", "MEMORY");
            for entry in &entries {
                out.push_str(&format!(
                    "\n{:<20} {:>6} {:>5}% {:>5}%",
                    entry.node_id, entry.total, entry.cpu, entry.memory
                ));
            }
            if entries.is_empty() {
                out.push_str("\n(no candidate nodes)");
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> FleetFile {
        FleetFile::from_toml_str(
            r#"
[strategy]
name = "binpack"
opts = "0"

[[nodes]]
id = "empty"
memory = 1000
cpus = 1000

[[nodes]]
id = "half"
memory = 1000
cpus = 1000
reserved_memory = 500
reserved_cpus = 500
"#,
        )
        .unwrap()
    }

    #[test]
    fn place_prints_chosen_node() {
        let out = place(&fleet(), None, ResourceRequest::new(100, 100), Format::Text).unwrap();
        assert_eq!(out, "half");
    }

    #[test]
    fn place_json_report() {
        let out = place(&fleet(), None, ResourceRequest::new(100, 100), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["node_id"], "half");
        assert_eq!(value["strategy"], "binpack");
    }

    #[test]
    fn place_reports_no_resources() {
        let err = place(&fleet(), None, ResourceRequest::new(5000, 1), Format::Text).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("no resources available"), "{chain}");
    }

    #[test]
    fn strategy_override_applies_overcommit() {
        let req = ResourceRequest::new(1400, 10);
        assert!(place(&fleet(), None, req, Format::Text).is_err());

        let out = place(&fleet(), Some("binpack:0.5"), req, Format::Text).unwrap();
        assert_eq!(out, "empty");
    }

    #[test]
    fn bad_override_is_rejected() {
        assert!(place(&fleet(), Some("binpack:lots"), ResourceRequest::default(), Format::Text).is_err());
        assert!(place(&fleet(), Some("random"), ResourceRequest::default(), Format::Text).is_err());
    }

    #[test]
    fn rank_lists_candidates_best_first() {
        let out = rank(&fleet(), None, ResourceRequest::new(100, 100), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let ids: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["node_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["half", "empty"]);
        assert_eq!(value[0]["cpu"], 60);
    }

    #[test]
    fn rank_honors_strategy_override() {
        let req = ResourceRequest::new(1400, 10);
        let out = rank(&fleet(), Some("binpacking:0.5"), req, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["node_id"], "empty");

        let err = rank(&fleet(), Some("random"), req, Format::Json).unwrap_err();
        assert!(format!("{err:#}").contains("unknown"), "{err:#}");
    }

    #[test]
    fn rank_text_table() {
        let out = rank(&fleet(), None, ResourceRequest::new(5000, 1), Format::Text).unwrap();
        assert!(out.starts_with("NODE"));
        assert!(out.contains("(no candidate nodes)"));
    }

    #[test]
    fn format_parse() {
        assert_eq!(Format::parse("json").unwrap(), Format::Json);
        assert!(Format::parse("yaml").is_err());
    }
}
