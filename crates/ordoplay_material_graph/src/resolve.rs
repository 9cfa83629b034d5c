// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type resolution for dynamic slots.
//!
//! Rules, applied per node in dependency order:
//! - a connected input takes the type of the output feeding it,
//! - a dynamic output takes the widest connected dynamic input,
//! - an unconnected dynamic input takes the same width as the outputs,
//! - with nothing connected, dynamic slots fall back to
//!   [`DEFAULT_DYNAMIC_TYPE`].

use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::slot::{ConcreteSlotValueType, Slot};
use indexmap::IndexMap;

/// Width of dynamic slots with no concrete source
pub const DEFAULT_DYNAMIC_TYPE: ConcreteSlotValueType = ConcreteSlotValueType::Vector4;

/// Concrete slot types for one generation pass
#[derive(Debug, Clone, Default)]
pub struct ResolvedTypes {
    slots: IndexMap<(NodeId, String), ConcreteSlotValueType>,
}

impl ResolvedTypes {
    /// Resolved type of a slot, if the resolver visited it
    pub fn get(&self, node_id: NodeId, slot: &str) -> Option<ConcreteSlotValueType> {
        self.slots.get(&(node_id, slot.to_string())).copied()
    }

    /// Resolved type of a slot, falling back to its declaration
    pub fn concrete_type(&self, node: &Node, slot: &Slot) -> ConcreteSlotValueType {
        self.get(node.id, &slot.name)
            .or_else(|| slot.fixed_concrete_type())
            .unwrap_or(DEFAULT_DYNAMIC_TYPE)
    }

    fn insert(&mut self, node_id: NodeId, slot: &str, ty: ConcreteSlotValueType) {
        self.slots.insert((node_id, slot.to_string()), ty);
    }
}

/// Resolve every slot of the nodes in `order`.
///
/// `order` must list feeding nodes before the nodes they feed, as returned
/// by [`Graph::topological_order`].
pub fn resolve_types(graph: &Graph, order: &[NodeId]) -> ResolvedTypes {
    let mut types = ResolvedTypes::default();

    for &node_id in order {
        let Some(node) = graph.node(node_id) else {
            continue;
        };

        // Concrete types arriving through connections
        let mut incoming = IndexMap::new();
        for slot in node.input_slots() {
            let upstream = graph.connection_into(node_id, &slot.name).and_then(|c| {
                types.get(c.from_node, &c.from_slot).or_else(|| {
                    graph
                        .node(c.from_node)
                        .and_then(|n| n.find_output_slot(&c.from_slot))
                        .and_then(Slot::fixed_concrete_type)
                })
            });
            if let Some(ty) = upstream {
                incoming.insert(slot.name.as_str(), ty);
            }
        }

        let dynamic_width = node
            .input_slots()
            .filter(|slot| slot.value_type.is_dynamic())
            .filter_map(|slot| incoming.get(slot.name.as_str()).copied())
            .filter(|ty| ty.is_vector())
            .max()
            .unwrap_or(DEFAULT_DYNAMIC_TYPE);

        for slot in node.slots() {
            let ty = match slot.fixed_concrete_type() {
                Some(fixed) => fixed,
                None if slot.is_input() => incoming
                    .get(slot.name.as_str())
                    .copied()
                    .unwrap_or(dynamic_width),
                None => dynamic_width,
            };
            types.insert(node_id, &slot.name, ty);
        }

        tracing::trace!(node = %node.name, width = ?dynamic_width, "Resolved slot types");
    }

    types
}
