//! Fleet — serialized placement against a shared set of nodes.
//!
//! Strategies read reservations without locking. When several placements
//! run concurrently against the same nodes, the read of the reservations
//! and the commit of the chosen node must happen under one lock, otherwise
//! two requests can both fit a node that only has room for one. `Fleet`
//! holds the nodes behind a single async mutex and performs the
//! choose-then-reserve step atomically.
//!
//! The strategy's utilization scores round down, so a node can score 100%
//! while `reserved + requested` is slightly above its effective capacity.
//! `place` walks the strategy's ranking and commits to the first candidate
//! whose reservations plus the request fit exactly within the strategy's
//! overcommit ratio. If none does, the result is
//! [`PlacementError::NoResourcesAvailable`].

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{FleetError, PlacementError};
use crate::node::{NodeResources, ResourceRequest};
use crate::scorer::EffectiveCapacity;
use crate::strategy::PlacementStrategy;

/// Outcome of a committed placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub node_id: String,
    /// Node memory reservations after the commit.
    pub reserved_memory: u64,
    /// Node CPU reservations after the commit.
    pub reserved_cpus: u64,
}

/// A set of nodes whose reservations are updated as placements commit.
#[derive(Debug, Default)]
pub struct Fleet {
    nodes: Mutex<Vec<NodeResources>>,
}

impl Fleet {
    pub fn new(nodes: Vec<NodeResources>) -> Self {
        Self {
            nodes: Mutex::new(nodes),
        }
    }

    /// Register a node. Ids must be unique.
    pub async fn add_node(&self, node: NodeResources) -> Result<(), FleetError> {
        let mut nodes = self.nodes.lock().await;
        if nodes.iter().any(|n| n.id == node.id) {
            return Err(FleetError::DuplicateNode(node.id));
        }
        info!(node = %node.id, memory = node.memory, cpus = node.cpus, "node added to fleet");
        nodes.push(node);
        Ok(())
    }

    /// Remove a node and return its last known state.
    pub async fn remove_node(&self, node_id: &str) -> Result<NodeResources, FleetError> {
        let mut nodes = self.nodes.lock().await;
        let pos = nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| FleetError::NodeNotFound(node_id.to_string()))?;
        info!(node = node_id, "node removed from fleet");
        Ok(nodes.remove(pos))
    }

    /// Choose a node with `strategy` and reserve `request` on it.
    pub async fn place<S>(
        &self,
        strategy: &S,
        request: &ResourceRequest,
    ) -> Result<Placement, FleetError>
    where
        S: PlacementStrategy<NodeResources> + ?Sized,
    {
        let mut nodes = self.nodes.lock().await;

        let effective = |node: &NodeResources| EffectiveCapacity::of(node, strategy.overcommit());
        let chosen = strategy
            .rank(request, &nodes)
            .into_iter()
            .find(|candidate| effective(candidate.node).holds(candidate.node, request))
            .map(|candidate| candidate.index);

        let Some(index) = chosen else {
            warn!(
                strategy = strategy.name(),
                memory = request.memory,
                cpu_shares = request.cpu_shares,
                "placement failed: {}",
                PlacementError::NoResourcesAvailable
            );
            return Err(PlacementError::NoResourcesAvailable.into());
        };

        let node = &mut nodes[index];
        node.reserve(request);
        debug!(
            node = %node.id,
            reserved_memory = node.reserved_memory,
            reserved_cpus = node.reserved_cpus,
            "reservation committed"
        );

        Ok(Placement {
            node_id: node.id.clone(),
            reserved_memory: node.reserved_memory,
            reserved_cpus: node.reserved_cpus,
        })
    }

    /// Return a previously placed request's resources to `node_id`.
    pub async fn release(
        &self,
        node_id: &str,
        request: &ResourceRequest,
    ) -> Result<(), FleetError> {
        let mut nodes = self.nodes.lock().await;
        let node = nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| FleetError::NodeNotFound(node_id.to_string()))?;
        node.release(request);
        debug!(node = node_id, "reservation released");
        Ok(())
    }

    /// Copy of the current node states.
    pub async fn snapshot(&self) -> Vec<NodeResources> {
        self.nodes.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }
}
