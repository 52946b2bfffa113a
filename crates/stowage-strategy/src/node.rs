//! Node contract and resource request types.

use serde::{Deserialize, Serialize};

/// Capacity and live reservations exposed by an execution node.
///
/// Strategies read every value fresh on each placement call. Implementations
/// that back these with shared state must return a consistent view for the
/// duration of one call.
pub trait NodeCapacity {
    /// Stable identifier, used for logging.
    fn id(&self) -> &str;

    /// Nominal memory capacity in bytes.
    fn memory(&self) -> u64;

    /// Nominal CPU-share capacity.
    fn cpus(&self) -> u64;

    /// Memory currently reserved by workloads already placed on the node.
    fn reserved_memory(&self) -> u64;

    /// CPU shares currently reserved by workloads already placed on the node.
    fn reserved_cpus(&self) -> u64;
}

impl<T: NodeCapacity + ?Sized> NodeCapacity for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn memory(&self) -> u64 {
        (**self).memory()
    }

    fn cpus(&self) -> u64 {
        (**self).cpus()
    }

    fn reserved_memory(&self) -> u64 {
        (**self).reserved_memory()
    }

    fn reserved_cpus(&self) -> u64 {
        (**self).reserved_cpus()
    }
}

/// Point-in-time resource snapshot for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResources {
    pub id: String,
    /// Nominal memory in bytes.
    pub memory: u64,
    /// Nominal CPU shares.
    pub cpus: u64,
    #[serde(default)]
    pub reserved_memory: u64,
    #[serde(default)]
    pub reserved_cpus: u64,
}

impl NodeResources {
    pub fn new(id: impl Into<String>, memory: u64, cpus: u64) -> Self {
        Self {
            id: id.into(),
            memory,
            cpus,
            reserved_memory: 0,
            reserved_cpus: 0,
        }
    }

    /// Set the current reservations.
    pub fn with_reserved(mut self, reserved_memory: u64, reserved_cpus: u64) -> Self {
        self.reserved_memory = reserved_memory;
        self.reserved_cpus = reserved_cpus;
        self
    }

    /// Add a placed workload to the reservations.
    pub fn reserve(&mut self, request: &ResourceRequest) {
        self.reserved_memory = self.reserved_memory.saturating_add(request.memory);
        self.reserved_cpus = self.reserved_cpus.saturating_add(request.cpu_shares);
    }

    /// Remove a previously placed workload from the reservations.
    pub fn release(&mut self, request: &ResourceRequest) {
        self.reserved_memory = self.reserved_memory.saturating_sub(request.memory);
        self.reserved_cpus = self.reserved_cpus.saturating_sub(request.cpu_shares);
    }
}

impl NodeCapacity for NodeResources {
    fn id(&self) -> &str {
        &self.id
    }

    fn memory(&self) -> u64 {
        self.memory
    }

    fn cpus(&self) -> u64 {
        self.cpus
    }

    fn reserved_memory(&self) -> u64 {
        self.reserved_memory
    }

    fn reserved_cpus(&self) -> u64 {
        self.reserved_cpus
    }
}

/// Resources requested by a workload. Zero means no requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Memory in bytes, same unit as [`NodeCapacity::memory`].
    #[serde(default)]
    pub memory: u64,
    /// Relative CPU weight, same unit as [`NodeCapacity::cpus`].
    #[serde(default)]
    pub cpu_shares: u64,
}

impl ResourceRequest {
    pub const fn new(memory: u64, cpu_shares: u64) -> Self {
        Self { memory, cpu_shares }
    }

    /// True when the request constrains neither dimension.
    pub const fn is_unconstrained(&self) -> bool {
        self.memory == 0 && self.cpu_shares == 0
    }
}
