// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the material graph.

use crate::nodes::NodeKind;
use crate::slot::{Slot, SlotDirection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Graph-local number used to name emitted variables
    pub serial: u32,
    /// Display name (can be customized)
    pub name: String,
    /// Kind and kind-specific configuration
    kind: NodeKind,
    /// Slots, in declaration order
    slots: Vec<Slot>,
}

impl Node {
    /// Create a new node of the given kind with its required slots
    pub fn new(kind: NodeKind) -> Self {
        let mut node = Self {
            id: NodeId::new(),
            serial: 0,
            name: kind.display_name().to_string(),
            kind,
            slots: Vec::new(),
        };
        node.sync_slots();
        node
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Node kind and configuration
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Mutable access to the kind. Slots must be resynced afterwards,
    /// which [`crate::Graph::configure_node`] takes care of.
    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Insert a slot, replacing any slot with the same name
    pub fn add_slot(&mut self, slot: Slot) {
        match self.slots.iter_mut().find(|s| s.name == slot.name) {
            Some(existing) => *existing = slot,
            None => self.slots.push(slot),
        }
    }

    /// Remove every slot whose name is not in `valid_names`.
    /// Returns the names of the removed slots.
    pub fn remove_slots_not_in(&mut self, valid_names: &[&str]) -> Vec<String> {
        let mut removed = Vec::new();
        self.slots.retain(|slot| {
            let keep = valid_names.contains(&slot.name.as_str());
            if !keep {
                removed.push(slot.name.clone());
            }
            keep
        });
        removed
    }

    /// Bring the slot set in line with what the kind requires.
    /// Returns true if any slot was added, changed or removed.
    pub fn sync_slots(&mut self) -> bool {
        let before = self.slots.clone();
        let descriptors = self.kind.slot_descriptors();

        for descriptor in &descriptors {
            self.add_slot(descriptor.to_slot());
        }
        let names: Vec<&str> = descriptors.iter().map(|d| d.name).collect();
        self.remove_slots_not_in(&names);
        self.slots
            .sort_by_key(|slot| names.iter().position(|name| *name == slot.name));

        before != self.slots
    }

    /// Find an input slot by name
    pub fn find_input_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.is_input() && s.name == name)
    }

    /// Find an output slot by name
    pub fn find_output_slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.is_output() && s.name == name)
    }

    /// Find a slot by name, regardless of direction
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// All slots
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Input slots, in declaration order
    pub fn input_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.direction == SlotDirection::Input)
    }

    /// Output slots, in declaration order
    pub fn output_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.direction == SlotDirection::Output)
    }

    /// Base identifier for everything this node emits, e.g. `texture3`
    pub fn variable_base(&self) -> String {
        format!("{}{}", self.kind.slug(), self.serial)
    }

    /// Name of the variable holding the node's computed value
    pub fn output_variable_name(&self) -> String {
        format!("{}_out", self.variable_base())
    }

    /// Name of the material property backing this node, if it has one
    pub fn property_name(&self) -> String {
        format!("_{}", self.variable_base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{FunctionNode, MathFunction, TextureNode};
    use crate::slot::SlotValueType;

    fn names(node: &Node) -> Vec<&str> {
        node.slots().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_node_creation_syncs_slots() {
        let node = Node::new(NodeKind::Texture(TextureNode::default()));
        assert_eq!(names(&node), ["RGBA", "R", "G", "B", "A", "UV"]);
        assert_eq!(node.name, "Texture");
    }

    #[test]
    fn test_add_slot_replaces_by_name() {
        let mut node = Node::new(NodeKind::Function(FunctionNode::new(MathFunction::Sin)));
        node.add_slot(Slot::input("Input1", SlotValueType::Vector2));
        assert_eq!(node.slots().len(), 2);
        assert_eq!(
            node.find_input_slot("Input1").map(|s| s.value_type),
            Some(SlotValueType::Vector2)
        );
    }

    #[test]
    fn test_remove_slots_not_in() {
        let mut node = Node::new(NodeKind::Function(FunctionNode::new(MathFunction::Lerp)));
        let removed = node.remove_slots_not_in(&["Input1", "Output"]);
        assert_eq!(removed, ["Input2", "Input3"]);
        assert_eq!(names(&node), ["Input1", "Output"]);
    }

    #[test]
    fn test_sync_slots_follows_arity() {
        let mut node = Node::new(NodeKind::Function(FunctionNode::new(MathFunction::Lerp)));
        assert_eq!(names(&node), ["Input1", "Input2", "Input3", "Output"]);

        *node.kind_mut() = NodeKind::Function(FunctionNode::new(MathFunction::Abs));
        assert!(node.sync_slots());
        assert_eq!(names(&node), ["Input1", "Output"]);

        // Already in sync
        assert!(!node.sync_slots());
    }

    #[test]
    fn test_find_slot_respects_direction() {
        let node = Node::new(NodeKind::Texture(TextureNode::default()));
        assert!(node.find_input_slot("UV").is_some());
        assert!(node.find_output_slot("UV").is_none());
        assert!(node.find_output_slot("G").is_some());
        assert!(node.find_input_slot("Missing").is_none());
    }

    #[test]
    fn test_variable_names() {
        let mut node = Node::new(NodeKind::Texture(TextureNode::default()));
        node.serial = 3;
        assert_eq!(node.output_variable_name(), "texture3_out");
        assert_eq!(node.property_name(), "_texture3");
    }
}
