// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node kinds available in material graphs.
//!
//! Every kind supplies a static slot descriptor table and implements the
//! subset of [`NodeCodegen`] that applies to it. [`NodeKind`] is the tagged
//! variant stored on each [`crate::Node`].

mod constant;
mod function;
mod surface;
mod texture;
mod uv;

pub use constant::{ConstantNode, ConstantValue};
pub use function::{FunctionNode, MathFunction};
pub use surface::SurfaceOutputNode;
pub use texture::{TextureHandle, TextureNode, TextureType};
pub use uv::UvNode;

use crate::config::Precision;
use crate::generation::{NodeContext, NodeError};
use crate::generator::ShaderGenerator;
use crate::slot::{ConcreteSlotValueType, Slot, SlotDirection, SlotValueType};
use serde::{Deserialize, Serialize};

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Input nodes (constants, UVs)
    Input,
    /// Output nodes
    Output,
    /// Math operations
    Math,
    /// Texture operations
    Texture,
}

/// Static description of a slot a node kind requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDescriptor {
    /// Slot name
    pub name: &'static str,
    /// Slot direction
    pub direction: SlotDirection,
    /// Declared value type
    pub value_type: SlotValueType,
}

impl SlotDescriptor {
    /// Describe an input slot
    pub const fn input(name: &'static str, value_type: SlotValueType) -> Self {
        Self {
            name,
            direction: SlotDirection::Input,
            value_type,
        }
    }

    /// Describe an output slot
    pub const fn output(name: &'static str, value_type: SlotValueType) -> Self {
        Self {
            name,
            direction: SlotDirection::Output,
            value_type,
        }
    }

    /// Instantiate the slot
    pub fn to_slot(&self) -> Slot {
        Slot::new(self.name, self.direction, self.value_type)
    }
}

/// Code generation capabilities of a node kind.
///
/// All methods except [`NodeCodegen::generate_body`] default to emitting
/// nothing. `generate_body` runs first; when it fails the node contributes
/// nothing else to the pass.
pub trait NodeCodegen {
    /// Emit fragment-body statements
    fn generate_body(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) -> Result<(), NodeError>;

    /// Emit shared function definitions
    fn generate_functions(&self, _ctx: &NodeContext<'_>, _sink: &mut ShaderGenerator) {}

    /// Register material properties
    fn generate_property_block(&self, _ctx: &NodeContext<'_>, _sink: &mut ShaderGenerator) {}

    /// Emit uniform declarations for the properties
    fn generate_property_usages(&self, _ctx: &NodeContext<'_>, _sink: &mut ShaderGenerator) {}

    /// Emit vertex-stage statements
    fn generate_vertex_block(&self, _ctx: &NodeContext<'_>, _sink: &mut ShaderGenerator) {}

    /// Emit vertex-to-fragment interpolator fields
    fn generate_vertex_to_fragment_block(&self, _ctx: &NodeContext<'_>, _sink: &mut ShaderGenerator) {}

    /// Expression downstream nodes use to read `slot`
    fn output_variable(&self, ctx: &NodeContext<'_>, _slot: &Slot) -> String {
        ctx.node.output_variable_name()
    }
}

/// Kind of a node, with its kind-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// N-ary math function
    Function(FunctionNode),
    /// 2D texture sampler
    Texture(TextureNode),
    /// Mesh UV coordinates
    Uv(UvNode),
    /// Constant or material property value
    Constant(ConstantNode),
    /// Surface shader output
    SurfaceOutput(SurfaceOutputNode),
}

impl NodeKind {
    /// Slots this kind requires in its current configuration
    pub fn slot_descriptors(&self) -> Vec<SlotDescriptor> {
        match self {
            Self::Function(node) => node.slot_descriptors(),
            Self::Texture(_) => texture::SLOTS.to_vec(),
            Self::Uv(_) => uv::SLOTS.to_vec(),
            Self::Constant(node) => node.slot_descriptors(),
            Self::SurfaceOutput(_) => surface::SLOTS.to_vec(),
        }
    }

    /// Default display name for new nodes
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Function(node) => node.function.display_name(),
            Self::Texture(_) => "Texture",
            Self::Uv(_) => "UV",
            Self::Constant(node) => node.value.display_name(),
            Self::SurfaceOutput(_) => "Surface Output",
        }
    }

    /// Identifier prefix for emitted variables
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Function(node) => node.function.slug(),
            Self::Texture(_) => "texture",
            Self::Uv(_) => "uv",
            Self::Constant(node) => node.value.slug(),
            Self::SurfaceOutput(_) => "surface",
        }
    }

    /// Category for node menus
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::Function(_) => NodeCategory::Math,
            Self::Texture(_) => NodeCategory::Texture,
            Self::Uv(_) | Self::Constant(_) => NodeCategory::Input,
            Self::SurfaceOutput(_) => NodeCategory::Output,
        }
    }

    /// Code generation capabilities
    pub fn codegen(&self) -> &dyn NodeCodegen {
        match self {
            Self::Function(node) => node,
            Self::Texture(node) => node,
            Self::Uv(node) => node,
            Self::Constant(node) => node,
            Self::SurfaceOutput(node) => node,
        }
    }
}

/// One default-configured instance of every node kind
pub fn node_catalogue() -> Vec<NodeKind> {
    let mut kinds = vec![
        NodeKind::Uv(UvNode),
        NodeKind::Constant(ConstantNode::new(ConstantValue::Vector1(0.0))),
        NodeKind::Constant(ConstantNode::new(ConstantValue::Vector4([0.0; 4]))),
        NodeKind::Texture(TextureNode::default()),
    ];
    kinds.extend(
        MathFunction::ALL
            .iter()
            .map(|f| NodeKind::Function(FunctionNode::new(*f))),
    );
    kinds.push(NodeKind::SurfaceOutput(SurfaceOutputNode));
    kinds
}

/// Clamp a value into what a shader literal can hold: NaN becomes zero,
/// infinities saturate to the largest finite value
pub(crate) fn finite_value(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f32::MIN, f32::MAX)
    }
}

/// Format a vector literal, e.g. `0.5` or `half3(0, 0, 1)`
pub(crate) fn vector_literal(values: &[f32], ty: ConcreteSlotValueType, precision: Precision) -> String {
    let components = ty.components().max(1);
    let parts: Vec<String> = (0..components)
        .map(|i| {
            let value = values.get(i).or(values.last()).copied().unwrap_or(0.0);
            finite_value(value).to_string()
        })
        .collect();

    if components == 1 {
        parts[0].clone()
    } else {
        format!("{}({})", ty.type_name(precision), parts.join(", "))
    }
}
