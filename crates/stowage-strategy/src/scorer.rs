//! Node scoring for bin-packing placement.
//!
//! Each candidate is scored by how utilized it will be after placement:
//! - **Capacity filter**: reject nodes whose effective capacity (nominal
//!   inflated by the overcommit ratio) is smaller than the request
//! - **Projected utilization**: `(reserved + requested) * 100 / effective`
//!   per dimension, 100 for a dimension the request leaves at zero
//! - **Ceiling**: reject nodes pushed over 100% in either dimension

use std::cmp::Ordering;

use tracing::trace;

use crate::node::{NodeCapacity, ResourceRequest};
use crate::ratio::OvercommitRatio;

/// Score assigned to a dimension the request does not constrain.
pub const NEUTRAL_SCORE: u64 = 100;

/// Upper bound on either dimension's projected utilization.
pub const MAX_UTILIZATION: u64 = 100;

/// Nominal capacity inflated by the overcommit ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveCapacity {
    pub memory: u64,
    pub cpus: u64,
}

impl EffectiveCapacity {
    pub fn of<N: NodeCapacity + ?Sized>(node: &N, ratio: OvercommitRatio) -> Self {
        Self {
            memory: ratio.inflate(node.memory()),
            cpus: ratio.inflate(node.cpus()),
        }
    }

    /// Hard admission check; the ratio never inflates the request.
    pub fn admits(&self, req: &ResourceRequest) -> bool {
        self.memory >= req.memory && self.cpus >= req.cpu_shares
    }

    /// Exact check that `node`'s reservations plus `req` stay within this
    /// capacity. Dimensions the request leaves at zero are not checked.
    pub fn holds<N: NodeCapacity + ?Sized>(&self, node: &N, req: &ResourceRequest) -> bool {
        let fits = |reserved: u64, requested: u64, effective: u64| {
            requested == 0 || u128::from(reserved) + u128::from(requested) <= u128::from(effective)
        };
        fits(node.reserved_memory(), req.memory, self.memory)
            && fits(node.reserved_cpus(), req.cpu_shares, self.cpus)
    }
}

/// Scored candidate for a single node.
#[derive(Debug, Clone)]
pub struct NodeScore<'a, N> {
    pub node: &'a N,
    /// Position of the node in the caller's slice.
    pub index: usize,
    /// Projected CPU utilization in percent.
    pub cpu: u64,
    /// Projected memory utilization in percent.
    pub memory: u64,
    /// Aggregate score, `((cpu + memory) / 200) * 100`.
    pub total: u64,
}

impl<N> NodeScore<'_, N> {
    /// Untruncated combined utilization, used to order equal totals.
    pub fn combined(&self) -> u64 {
        self.cpu + self.memory
    }
}

/// Projected utilization of one dimension after placing `requested`.
fn projected(reserved: u64, requested: u64, effective: u64) -> u64 {
    if requested == 0 {
        return NEUTRAL_SCORE;
    }
    // The capacity filter guarantees effective >= requested > 0 here.
    let used = u128::from(reserved) + u128::from(requested);
    u64::try_from(used * 100 / u128::from(effective)).unwrap_or(u64::MAX)
}

/// Aggregate two dimension scores. Truncation is part of the policy.
pub fn total_score(cpu: u64, memory: u64) -> u64 {
    (cpu.saturating_add(memory) / 200) * 100
}

/// Score a single node, or `None` if it cannot take the request.
pub fn score_node<'a, N: NodeCapacity>(
    node: &'a N,
    index: usize,
    req: &ResourceRequest,
    ratio: OvercommitRatio,
) -> Option<NodeScore<'a, N>> {
    let effective = EffectiveCapacity::of(node, ratio);
    if !effective.admits(req) {
        trace!(
            node = node.id(),
            effective_memory = effective.memory,
            effective_cpus = effective.cpus,
            "node smaller than request"
        );
        return None;
    }

    let cpu = projected(node.reserved_cpus(), req.cpu_shares, effective.cpus);
    let memory = projected(node.reserved_memory(), req.memory, effective.memory);

    if cpu > MAX_UTILIZATION || memory > MAX_UTILIZATION {
        trace!(node = node.id(), cpu, memory, "node would exceed capacity");
        return None;
    }

    Some(NodeScore {
        node,
        index,
        cpu,
        memory,
        total: total_score(cpu, memory),
    })
}

/// Ranking order: higher total first, then higher combined utilization,
/// then earlier input position.
pub fn compare_scores<N>(a: &NodeScore<'_, N>, b: &NodeScore<'_, N>) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| b.combined().cmp(&a.combined()))
        .then_with(|| a.index.cmp(&b.index))
}

/// Score all nodes and return the candidates sorted best first.
pub fn rank_nodes<'a, N: NodeCapacity>(
    nodes: &'a [N],
    req: &ResourceRequest,
    ratio: OvercommitRatio,
) -> Vec<NodeScore<'a, N>> {
    let mut scores: Vec<NodeScore<'a, N>> = nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| score_node(node, index, req, ratio))
        .collect();

    scores.sort_by(compare_scores);
    scores
}
