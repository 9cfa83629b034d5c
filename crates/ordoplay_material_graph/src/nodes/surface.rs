// SPDX-License-Identifier: MIT OR Apache-2.0
//! Surface shader output node.

use super::{NodeCodegen, SlotDescriptor};
use crate::generation::{GenerationMode, NodeContext, NodeError};
use crate::generator::{ShaderGenerator, ShaderSection};
use crate::slot::SlotValueType;
use serde::{Deserialize, Serialize};

pub(super) const SLOTS: &[SlotDescriptor] = &[
    SlotDescriptor::input("Albedo", SlotValueType::Vector3),
    SlotDescriptor::input("Normal", SlotValueType::Vector3),
    SlotDescriptor::input("Emission", SlotValueType::Vector3),
    SlotDescriptor::input("Metallic", SlotValueType::Vector1),
    SlotDescriptor::input("Smoothness", SlotValueType::Vector1),
    SlotDescriptor::input("Occlusion", SlotValueType::Vector1),
    SlotDescriptor::input("Alpha", SlotValueType::Vector1),
];

/// Writes connected values into the standard surface output struct.
/// Unconnected inputs keep the lighting model's defaults. Preview passes
/// render node outputs directly and skip the assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceOutputNode;

impl NodeCodegen for SurfaceOutputNode {
    fn generate_body(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) -> Result<(), NodeError> {
        let slots = SLOTS
            .iter()
            .map(|d| ctx.require_input(d.name))
            .collect::<Result<Vec<_>, _>>()?;
        if ctx.mode == GenerationMode::Preview {
            return Ok(());
        }

        for slot in slots {
            if ctx.upstream_variable(slot).is_some() {
                sink.add_line(
                    ShaderSection::Body,
                    format!("o.{} = {};", slot.name, ctx.input_value(slot, &[0.0])),
                );
            }
        }
        Ok(())
    }
}
