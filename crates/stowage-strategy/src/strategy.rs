//! Placement strategies — the contract and the bin-packing policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, PlacementError, PlacementResult};
use crate::node::{NodeCapacity, ResourceRequest};
use crate::ratio::OvercommitRatio;
use crate::scorer::{NodeScore, rank_nodes};

/// A policy that picks one node for a workload.
///
/// Strategies are configured once with [`initialize`](Self::initialize) and
/// then consulted once per scheduling decision. A call to
/// [`place_container`](Self::place_container) is all-or-nothing and reads the
/// node set fresh; it never retries.
pub trait PlacementStrategy<N: NodeCapacity>: Send + Sync {
    /// Short strategy name, as accepted by [`StrategyKind::from_str`].
    fn name(&self) -> &'static str;

    /// Apply strategy-specific options. On error the previous configuration
    /// is left untouched.
    fn initialize(&mut self, opts: &str) -> Result<(), ConfigError>;

    /// Configured overcommit ratio.
    fn overcommit(&self) -> OvercommitRatio;

    /// All candidates for `request`, best first.
    fn rank<'a>(&self, request: &ResourceRequest, nodes: &'a [N]) -> Vec<NodeScore<'a, N>>;

    /// Choose a node for `request` from `nodes`.
    fn place_container<'a>(
        &self,
        request: &ResourceRequest,
        nodes: &'a [N],
    ) -> PlacementResult<&'a N>;
}

/// Bin-packing: prefer the node that will be most utilized after placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinPackingStrategy {
    ratio: OvercommitRatio,
}

impl BinPackingStrategy {
    pub const NAME: &'static str = "binpack";

    /// Strategy with no overcommit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ratio(ratio: OvercommitRatio) -> Self {
        Self { ratio }
    }

    /// Build and initialize from an options string.
    pub fn from_opts(opts: &str) -> Result<Self, ConfigError> {
        Ok(Self::with_ratio(OvercommitRatio::parse(opts)?))
    }

    pub fn ratio(&self) -> OvercommitRatio {
        self.ratio
    }
}

impl<N: NodeCapacity> PlacementStrategy<N> for BinPackingStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize(&mut self, opts: &str) -> Result<(), ConfigError> {
        let ratio = OvercommitRatio::parse(opts)?;
        self.ratio = ratio;
        info!(strategy = Self::NAME, overcommit = %ratio, "placement strategy initialized");
        Ok(())
    }

    fn overcommit(&self) -> OvercommitRatio {
        self.ratio
    }

    fn rank<'a>(&self, request: &ResourceRequest, nodes: &'a [N]) -> Vec<NodeScore<'a, N>> {
        rank_nodes(nodes, request, self.ratio)
    }

    fn place_container<'a>(
        &self,
        request: &ResourceRequest,
        nodes: &'a [N],
    ) -> PlacementResult<&'a N> {
        let ranked = rank_nodes(nodes, request, self.ratio);

        let Some(best) = ranked.first() else {
            debug!(
                memory = request.memory,
                cpu_shares = request.cpu_shares,
                nodes = nodes.len(),
                "no node can take request"
            );
            return Err(PlacementError::NoResourcesAvailable);
        };

        debug!(
            node = best.node.id(),
            total = best.total,
            cpu = best.cpu,
            memory = best.memory,
            candidates = ranked.len(),
            "selected node"
        );
        Ok(best.node)
    }
}

/// The strategies a scheduler can be configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    #[serde(alias = "binpacking")]
    Binpack,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binpack => BinPackingStrategy::NAME,
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binpack" | "binpacking" => Ok(Self::Binpack),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options used when a strategy spec carries none.
pub const DEFAULT_OPTS: &str = "0";

/// Split a `name[:opts]` strategy spec, e.g. `binpack:0.05`.
pub fn parse_strategy_spec(spec: &str) -> Result<(StrategyKind, String), ConfigError> {
    let (name, opts) = match spec.split_once(':') {
        Some((name, opts)) => (name, opts),
        None => (spec, DEFAULT_OPTS),
    };
    Ok((name.parse()?, opts.to_string()))
}

/// Construct and initialize the strategy named by `kind`.
pub fn build_strategy<N>(
    kind: StrategyKind,
    opts: &str,
) -> Result<Box<dyn PlacementStrategy<N>>, ConfigError>
where
    N: NodeCapacity + 'static,
{
    let mut strategy: Box<dyn PlacementStrategy<N>> = match kind {
        StrategyKind::Binpack => Box::new(BinPackingStrategy::new()),
    };
    strategy.initialize(opts)?;
    Ok(strategy)
}
