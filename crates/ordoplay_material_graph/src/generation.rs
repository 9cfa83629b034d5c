// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader generation pass.
//!
//! [`generate`] walks the graph in dependency order, resolves dynamic slot
//! types, lets every node emit into a [`ShaderGenerator`] and assembles the
//! result. Per-node failures are collected; only cycles and oversized graphs
//! abort the pass.

use crate::config::{GeneratorConfig, Precision};
use crate::generator::{ShaderGenerator, ShaderProperty};
use crate::graph::{CycleError, Graph};
use crate::node::{Node, NodeId};
use crate::nodes::vector_literal;
use crate::resolve::{resolve_types, ResolvedTypes};
use crate::slot::{ConcreteSlotValueType, Slot};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What the generated shader is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    /// Final surface shader
    #[default]
    SurfaceShader,
    /// Live preview; constants become material properties
    Preview,
}

/// Failure of a single node during a pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// A designated slot is missing from the node
    #[error("Invalid slot configuration on node {name}: missing slot {slot}")]
    InvalidSlotConfiguration {
        /// Failing node
        node: NodeId,
        /// Display name of the failing node
        name: String,
        /// Slot that could not be found
        slot: String,
    },
}

/// Failure that aborts a generation pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Dependency order does not exist
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Graph exceeds the configured node limit
    #[error("Graph has {nodes} nodes, limit is {limit}")]
    GraphTooLarge {
        /// Nodes in the graph
        nodes: usize,
        /// Configured limit
        limit: usize,
    },
}

/// Output of a generation pass
#[derive(Debug, Clone)]
pub struct GeneratedShader {
    /// Assembled shader text
    pub source: String,
    /// Material properties, in emission order
    pub properties: Vec<ShaderProperty>,
    /// Nodes that emitted nothing
    pub errors: Vec<NodeError>,
}

impl GeneratedShader {
    /// Whether every node emitted successfully
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

type VariableTable = IndexMap<(NodeId, String), (String, ConcreteSlotValueType)>;

/// View of the pass handed to each node
pub struct NodeContext<'a> {
    /// Graph being generated
    pub graph: &'a Graph,
    /// Node being emitted
    pub node: &'a Node,
    /// Pass mode
    pub mode: GenerationMode,
    /// Precision for emitted types
    pub precision: Precision,
    types: &'a ResolvedTypes,
    variables: &'a VariableTable,
}

impl<'a> NodeContext<'a> {
    /// Look up a designated input slot
    pub fn require_input(&self, name: &str) -> Result<&'a Slot, NodeError> {
        self.node
            .find_input_slot(name)
            .ok_or_else(|| self.invalid_slot(name))
    }

    /// Look up a designated output slot
    pub fn require_output(&self, name: &str) -> Result<&'a Slot, NodeError> {
        self.node
            .find_output_slot(name)
            .ok_or_else(|| self.invalid_slot(name))
    }

    fn invalid_slot(&self, slot: &str) -> NodeError {
        NodeError::InvalidSlotConfiguration {
            node: self.node.id,
            name: self.node.name.clone(),
            slot: slot.to_string(),
        }
    }

    /// Variable and type feeding an input slot.
    ///
    /// `None` when the slot is unconnected or the feeding node failed.
    pub fn upstream_variable(&self, slot: &Slot) -> Option<(String, ConcreteSlotValueType)> {
        let connection = self.graph.connection_into(self.node.id, &slot.name)?;
        self.variables
            .get(&(connection.from_node, connection.from_slot.clone()))
            .cloned()
    }

    /// Expression for an input: the coerced upstream variable, or `defaults`
    /// formatted at the slot's width
    pub fn input_value(&self, slot: &Slot, defaults: &[f32]) -> String {
        let target = self.concrete_type(slot);
        match self.upstream_variable(slot) {
            Some((variable, source)) => coerce(&variable, source, target, self.precision),
            None => vector_literal(defaults, target, self.precision),
        }
    }

    /// Resolved type of a slot on this node
    pub fn concrete_type(&self, slot: &Slot) -> ConcreteSlotValueType {
        self.types.concrete_type(self.node, slot)
    }

    /// Shading-language type name of a slot on this node
    pub fn type_name(&self, slot: &Slot) -> String {
        self.concrete_type(slot).type_name(self.precision)
    }
}

/// Convert `expr` of type `from` into a value of type `to`.
///
/// Narrowing swizzles, scalars broadcast, wider vectors pad with zeros.
pub(crate) fn coerce(
    expr: &str,
    from: ConcreteSlotValueType,
    to: ConcreteSlotValueType,
    precision: Precision,
) -> String {
    if from == to || !from.is_vector() || !to.is_vector() {
        return expr.to_string();
    }

    let have = from.components();
    let want = to.components();
    if want < have {
        format!("{expr}.{}", &"xyzw"[..want])
    } else if have == 1 {
        format!("{}({})", to.type_name(precision), vec![expr; want].join(", "))
    } else {
        format!(
            "{}({expr}, {})",
            to.type_name(precision),
            vec!["0"; want - have].join(", ")
        )
    }
}

/// Generate shader text for a graph
pub fn generate(
    graph: &Graph,
    mode: GenerationMode,
    config: &GeneratorConfig,
) -> Result<GeneratedShader, GenerationError> {
    if graph.node_count() > config.max_nodes {
        return Err(GenerationError::GraphTooLarge {
            nodes: graph.node_count(),
            limit: config.max_nodes,
        });
    }

    let order = graph.topological_order()?;
    let types = resolve_types(graph, &order);

    let mut sink = ShaderGenerator::new();
    let mut variables = VariableTable::new();
    let mut errors = Vec::new();

    for node_id in order {
        let Some(node) = graph.node(node_id) else {
            continue;
        };
        let codegen = node.kind().codegen();
        let ctx = NodeContext {
            graph,
            node,
            mode,
            precision: config.precision,
            types: &types,
            variables: &variables,
        };

        if let Err(err) = codegen.generate_body(&ctx, &mut sink) {
            tracing::warn!(node = %node.name, "{}", err);
            errors.push(err);
            continue;
        }
        codegen.generate_functions(&ctx, &mut sink);
        codegen.generate_property_block(&ctx, &mut sink);
        codegen.generate_property_usages(&ctx, &mut sink);
        codegen.generate_vertex_block(&ctx, &mut sink);
        codegen.generate_vertex_to_fragment_block(&ctx, &mut sink);

        let outputs: Vec<_> = node
            .output_slots()
            .map(|slot| {
                (
                    (node.id, slot.name.clone()),
                    (codegen.output_variable(&ctx, slot), ctx.concrete_type(slot)),
                )
            })
            .collect();
        variables.extend(outputs);
    }

    let source = sink.assemble(config);
    tracing::debug!(
        graph = %graph.name,
        nodes = graph.node_count(),
        failed = errors.len(),
        properties = sink.properties().len(),
        ?mode,
        "Generated shader"
    );

    Ok(GeneratedShader {
        source,
        properties: sink.into_properties(),
        errors,
    })
}
