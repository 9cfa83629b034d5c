// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constant value node.
//!
//! Emits an inline literal in surface shaders. When exposed, or when
//! generating a live preview, the value becomes a material property so it
//! can be tweaked without regenerating the shader.

use super::{finite_value, vector_literal, NodeCodegen, SlotDescriptor};
use crate::generation::{GenerationMode, NodeContext, NodeError};
use crate::generator::{PropertyKind, ShaderGenerator, ShaderProperty, ShaderSection};
use crate::slot::{ConcreteSlotValueType, Slot, SlotValueType};
use serde::{Deserialize, Serialize};

const VALUE_SLOT: &str = "Value";

/// Value held by a [`ConstantNode`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    /// Scalar
    Vector1(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector / Color
    Vector4([f32; 4]),
}

impl ConstantValue {
    /// Components of the value
    pub fn components(&self) -> &[f32] {
        match self {
            Self::Vector1(v) => std::slice::from_ref(v),
            Self::Vector2(v) => v,
            Self::Vector3(v) => v,
            Self::Vector4(v) => v,
        }
    }

    /// Concrete type of the value
    pub fn concrete_type(&self) -> ConcreteSlotValueType {
        ConcreteSlotValueType::from_components(self.components().len())
    }

    fn slot_type(&self) -> SlotValueType {
        match self {
            Self::Vector1(_) => SlotValueType::Vector1,
            Self::Vector2(_) => SlotValueType::Vector2,
            Self::Vector3(_) => SlotValueType::Vector3,
            Self::Vector4(_) => SlotValueType::Vector4,
        }
    }

    pub(super) fn display_name(&self) -> &'static str {
        match self {
            Self::Vector1(_) => "Vector 1",
            Self::Vector2(_) => "Vector 2",
            Self::Vector3(_) => "Vector 3",
            Self::Vector4(_) => "Vector 4",
        }
    }

    pub(super) fn slug(&self) -> &'static str {
        match self {
            Self::Vector1(_) => "vector1",
            Self::Vector2(_) => "vector2",
            Self::Vector3(_) => "vector3",
            Self::Vector4(_) => "vector4",
        }
    }
}

/// Constant value node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    /// Value
    pub value: ConstantValue,
    /// Whether the value is a material property
    pub exposed: bool,
}

impl ConstantNode {
    /// Create an inline constant
    pub fn new(value: ConstantValue) -> Self {
        Self { value, exposed: false }
    }

    /// Create a constant exposed as a material property
    pub fn exposed(value: ConstantValue) -> Self {
        Self { value, exposed: true }
    }

    pub(super) fn slot_descriptors(&self) -> Vec<SlotDescriptor> {
        vec![SlotDescriptor::output(VALUE_SLOT, self.value.slot_type())]
    }

    fn is_property(&self, ctx: &NodeContext<'_>) -> bool {
        self.exposed || ctx.mode == GenerationMode::Preview
    }
}

impl NodeCodegen for ConstantNode {
    fn generate_body(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) -> Result<(), NodeError> {
        let output = ctx.require_output(VALUE_SLOT)?;
        if self.is_property(ctx) {
            return Ok(());
        }

        let ty = self.value.concrete_type();
        sink.add_line(
            ShaderSection::Body,
            format!(
                "{} {} = {};",
                ty.type_name(ctx.precision),
                self.output_variable(ctx, output),
                vector_literal(self.value.components(), ty, ctx.precision)
            ),
        );
        Ok(())
    }

    fn generate_property_block(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        if !self.is_property(ctx) {
            return;
        }

        let kind = match self.value {
            ConstantValue::Vector1(v) => PropertyKind::Float(finite_value(v)),
            _ => {
                let mut padded = [0.0; 4];
                for (dst, src) in padded.iter_mut().zip(self.value.components()) {
                    *dst = finite_value(*src);
                }
                PropertyKind::Vector(padded)
            }
        };

        sink.add_property(ShaderProperty {
            name: ctx.node.property_name(),
            display_name: ctx.node.name.clone(),
            kind,
            exposed: self.exposed,
        });
    }

    fn generate_property_usages(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        if !self.is_property(ctx) {
            return;
        }

        sink.add_chunk(
            ShaderSection::PropertyUsages,
            format!(
                "{} {};",
                self.value.concrete_type().type_name(ctx.precision),
                ctx.node.property_name()
            ),
            true,
        );
    }

    fn output_variable(&self, ctx: &NodeContext<'_>, _slot: &Slot) -> String {
        if self.is_property(ctx) {
            ctx.node.property_name()
        } else {
            ctx.node.output_variable_name()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(ConstantValue::Vector1(2.0).concrete_type(), ConcreteSlotValueType::Vector1);
        assert_eq!(
            ConstantValue::Vector3([0.0, 1.0, 0.0]).concrete_type(),
            ConcreteSlotValueType::Vector3
        );
        assert_eq!(ConstantValue::Vector2([1.0, 2.0]).components(), &[1.0, 2.0]);
    }

    #[test]
    fn test_slot_type_follows_value() {
        let node = ConstantNode::new(ConstantValue::Vector2([0.0; 2]));
        assert_eq!(node.slot_descriptors()[0].value_type, SlotValueType::Vector2);
    }
}
