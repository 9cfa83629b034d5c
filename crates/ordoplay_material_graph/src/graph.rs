// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::nodes::NodeKind;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current graph document format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// A material graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Document format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Serial handed to the next added node
    #[serde(default)]
    next_serial: u32,
}

fn default_version() -> u32 {
    GRAPH_FORMAT_VERSION
}

/// Outcome of [`Graph::configure_node`]
#[derive(Debug, Clone, Default)]
pub struct Reconfigured {
    /// Whether the node's slot set changed
    pub slots_changed: bool,
    /// Connections dropped because their slot no longer exists
    pub removed_connections: Vec<Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: GRAPH_FORMAT_VERSION,
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            next_serial: 0,
        }
    }

    /// Add a node to the graph, assigning its serial
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.serial = self.next_serial;
        self.next_serial += 1;

        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Create a node of the given kind and add it
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.add_node(Node::new(kind))
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Change a node's configuration.
    ///
    /// The slot set is resynced with the new configuration and connections
    /// attached to slots that no longer exist are removed. Returns `None` if
    /// the node is not in the graph.
    pub fn configure_node<F>(&mut self, node_id: NodeId, configure: F) -> Option<Reconfigured>
    where
        F: FnOnce(&mut NodeKind),
    {
        let node = self.nodes.get_mut(&node_id)?;
        configure(node.kind_mut());
        let slots_changed = node.sync_slots();

        let mut report = Reconfigured {
            slots_changed,
            removed_connections: Vec::new(),
        };
        if !slots_changed {
            return Some(report);
        }

        let nodes = &self.nodes;
        let mut kept = IndexMap::with_capacity(self.connections.len());
        for (id, connection) in self.connections.drain(..) {
            if connection_endpoints_exist(nodes, &connection) {
                kept.insert(id, connection);
            } else {
                report.removed_connections.push(connection);
            }
        }
        self.connections = kept;

        tracing::debug!(
            node = ?node_id,
            removed = report.removed_connections.len(),
            "Node slots changed after reconfiguration"
        );
        Some(report)
    }

    /// Connect an output slot to an input slot
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_slot: &str,
        to_node: NodeId,
        to_slot: &str,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_node = self.nodes.get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        let source_slot = source_node.slot(from_slot)
            .ok_or_else(|| ConnectionError::SlotNotFound(from_slot.to_string()))?;
        let target_slot = target_node.slot(to_slot)
            .ok_or_else(|| ConnectionError::SlotNotFound(to_slot.to_string()))?;

        if !source_slot.is_output() || !target_slot.is_input() {
            return Err(ConnectionError::WrongDirection);
        }

        if !source_slot.can_connect(target_slot) {
            return Err(ConnectionError::IncompatibleSlots);
        }

        // Inputs are single-valued
        if self.connection_into(to_node, to_slot).is_some() {
            return Err(ConnectionError::PortAlreadyConnected(to_slot.to_string()));
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        let connection = Connection::new(from_node, from_slot, to_node, to_slot);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// The connection feeding an input slot, if any
    pub fn connection_into(&self, node_id: NodeId, slot: &str) -> Option<&Connection> {
        self.connections.values().find(|c| c.feeds(node_id, slot))
    }

    /// Connections leaving an output slot
    pub fn connections_from<'a>(
        &'a self,
        node_id: NodeId,
        slot: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| c.drains(node_id, slot))
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Nodes feeding this node's inputs, in connection order
    fn dependencies(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut deps = IndexSet::new();
        for connection in self.connections.values() {
            if connection.to_node == node_id {
                deps.insert(connection.from_node);
            }
        }
        deps.into_iter().collect()
    }

    /// Whether connecting `from` into `to` would close a cycle
    pub fn would_create_cycle(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = IndexSet::new();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.dependencies(current));
        }

        false
    }

    /// Get nodes in dependency order: every node comes after all nodes
    /// feeding its inputs.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        let mut marks: IndexMap<NodeId, Mark> = IndexMap::with_capacity(self.nodes.len());
        let mut order = Vec::with_capacity(self.nodes.len());

        for &root in self.nodes.keys() {
            if marks.contains_key(&root) {
                continue;
            }

            marks.insert(root, Mark::InProgress);
            let mut stack = vec![(root, self.dependencies(root), 0usize)];

            while let Some((node_id, deps, next)) = stack.last_mut() {
                if let Some(&dep) = deps.get(*next) {
                    *next += 1;
                    match marks.get(&dep) {
                        Some(Mark::Done) => {}
                        Some(Mark::InProgress) => {
                            let start = stack.iter().position(|(id, _, _)| *id == dep).unwrap_or(0);
                            let nodes = stack[start..].iter().map(|(id, _, _)| *id).collect();
                            return Err(CycleError { nodes });
                        }
                        None => {
                            marks.insert(dep, Mark::InProgress);
                            let dep_deps = self.dependencies(dep);
                            stack.push((dep, dep_deps, 0));
                        }
                    }
                } else {
                    let done = *node_id;
                    marks.insert(done, Mark::Done);
                    order.push(done);
                    stack.pop();
                }
            }
        }

        Ok(order)
    }

    /// Check the structural invariants of a graph built outside [`Graph::connect`]
    pub fn validate(&self) -> Result<(), ConnectionError> {
        let mut inputs = IndexSet::new();

        for connection in self.connections.values() {
            let source = self.nodes.get(&connection.from_node)
                .ok_or(ConnectionError::NodeNotFound(connection.from_node))?;
            let target = self.nodes.get(&connection.to_node)
                .ok_or(ConnectionError::NodeNotFound(connection.to_node))?;

            let source_slot = source.slot(&connection.from_slot)
                .ok_or_else(|| ConnectionError::SlotNotFound(connection.from_slot.clone()))?;
            let target_slot = target.slot(&connection.to_slot)
                .ok_or_else(|| ConnectionError::SlotNotFound(connection.to_slot.clone()))?;

            if !source_slot.is_output() || !target_slot.is_input() {
                return Err(ConnectionError::WrongDirection);
            }
            if !source_slot.can_connect(target_slot) {
                return Err(ConnectionError::IncompatibleSlots);
            }
            if !inputs.insert((connection.to_node, connection.to_slot.as_str())) {
                return Err(ConnectionError::PortAlreadyConnected(connection.to_slot.clone()));
            }
        }

        Ok(())
    }

    /// Parse a graph document and check its structure.
    ///
    /// Slot sets are taken as written and not resynced with their kinds; a
    /// node missing a required slot is reported by the generation pass as
    /// [`crate::NodeError::InvalidSlotConfiguration`].
    pub fn from_ron(text: &str) -> Result<Self, GraphLoadError> {
        let mut graph: Graph = ron::from_str(text)?;

        if graph.version > GRAPH_FORMAT_VERSION {
            return Err(GraphLoadError::UnsupportedVersion {
                found: graph.version,
                supported: GRAPH_FORMAT_VERSION,
            });
        }

        graph.validate()?;

        // Serials name emitted variables and must not collide
        let mut serials = IndexSet::with_capacity(graph.nodes.len());
        for node in graph.nodes.values() {
            if !serials.insert(node.serial) {
                return Err(GraphLoadError::DuplicateSerial(node.serial));
            }
        }

        // Keep serials unique even if the document did not record the counter
        let max_serial = graph.nodes.values().map(|n| n.serial + 1).max().unwrap_or(0);
        graph.next_serial = graph.next_serial.max(max_serial);

        Ok(graph)
    }

    /// Serialize to a pretty RON document
    pub fn to_ron(&self) -> Result<String, GraphLoadError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a graph document from disk
    pub fn load(path: &Path) -> Result<Self, GraphLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save the graph document to disk
    pub fn save(&self, path: &Path) -> Result<(), GraphLoadError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn connection_endpoints_exist(nodes: &IndexMap<NodeId, Node>, connection: &Connection) -> bool {
    let from = nodes.get(&connection.from_node)
        .and_then(|n| n.find_output_slot(&connection.from_slot));
    let to = nodes.get(&connection.to_node)
        .and_then(|n| n.find_input_slot(&connection.to_slot));
    from.is_some() && to.is_some()
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Slot not found
    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    /// Connections run from an output slot to an input slot
    #[error("Connections must run from an output slot to an input slot")]
    WrongDirection,

    /// Incompatible slot types
    #[error("Incompatible slot types")]
    IncompatibleSlots,

    /// Input slot is already connected
    #[error("Duplicate input: slot {0} is already connected")]
    PortAlreadyConnected(String),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

/// Error when graph contains a cycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Graph contains a cycle through {} node(s)", .nodes.len())]
pub struct CycleError {
    /// Nodes participating in the cycle, in dependency order
    pub nodes: Vec<NodeId>,
}

/// Error when loading or saving a graph document
#[derive(Debug, thiserror::Error)]
pub enum GraphLoadError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Invalid graph document: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Document could not be serialized
    #[error("Failed to serialize graph: {0}")]
    Serialize(#[from] ron::Error),

    /// Document violates a structural invariant
    #[error("Invalid connection in graph document: {0}")]
    InvalidConnection(#[from] ConnectionError),

    /// Two nodes share a serial
    #[error("Duplicate node serial {0} in graph document")]
    DuplicateSerial(u32),

    /// Written by a newer version
    #[error("Graph version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the document
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}
