//! Stowage placement strategies — bin-packing with overcommit.
//!
//! This crate decides which node a single workload lands on. It does not
//! discover nodes, track their health, or retry failed placements; callers
//! hand in the current node set and a resource request and get back one node
//! or [`PlacementError::NoResourcesAvailable`].
//!
//! # Components
//!
//! - **`ratio`** — Overcommit ratio parsing (fixed-point percent)
//! - **`node`** — Node capacity contract and request types
//! - **`scorer`** — Capacity filter, projected-utilization scoring, ranking
//! - **`strategy`** — Strategy contract, bin-packing policy, selection by name
//! - **`fleet`** — Serialized choose-and-reserve for concurrent callers

pub mod error;
pub mod fleet;
pub mod node;
pub mod ratio;
pub mod scorer;
pub mod strategy;

pub use error::{ConfigError, FleetError, PlacementError, PlacementResult};
pub use fleet::{Fleet, Placement};
pub use node::{NodeCapacity, NodeResources, ResourceRequest};
pub use ratio::OvercommitRatio;
pub use scorer::{EffectiveCapacity, NodeScore, rank_nodes, score_node};
pub use strategy::{
    BinPackingStrategy, DEFAULT_OPTS, PlacementStrategy, StrategyKind, build_strategy,
    parse_strategy_spec,
};
