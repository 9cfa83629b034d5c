// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mesh UV node and the shared default-UV chunks.

use super::{NodeCodegen, SlotDescriptor};
use crate::config::Precision;
use crate::generation::{NodeContext, NodeError};
use crate::generator::{ShaderGenerator, ShaderSection};
use crate::slot::{Slot, SlotValueType};
use serde::{Deserialize, Serialize};

/// Expression reading the first UV set in the fragment stage
pub const MESH_UV: &str = "IN.meshUV0";

const UV_SLOT: &str = "UV";

pub(super) const SLOTS: &[SlotDescriptor] = &[SlotDescriptor::output(UV_SLOT, SlotValueType::Vector4)];

/// Interpolator carrying the mesh UVs to the fragment stage
pub(crate) fn generate_mesh_uv_interpolator(precision: Precision, sink: &mut ShaderGenerator) {
    sink.add_chunk(
        ShaderSection::VertexToFragment,
        format!("{}4 meshUV0;", precision.token()),
        true,
    );
}

/// Vertex-stage copy of the mesh UVs into the interpolator
pub(crate) fn generate_mesh_uv_vertex_block(sink: &mut ShaderGenerator) {
    sink.add_chunk(ShaderSection::Vertex, "o.meshUV0 = v.texcoord;", true);
}

/// Mesh UV coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UvNode;

impl NodeCodegen for UvNode {
    fn generate_body(&self, ctx: &NodeContext<'_>, _sink: &mut ShaderGenerator) -> Result<(), NodeError> {
        ctx.require_output(UV_SLOT)?;
        Ok(())
    }

    fn generate_vertex_block(&self, _ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        generate_mesh_uv_vertex_block(sink);
    }

    fn generate_vertex_to_fragment_block(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        generate_mesh_uv_interpolator(ctx.precision, sink);
    }

    fn output_variable(&self, _ctx: &NodeContext<'_>, _slot: &Slot) -> String {
        MESH_UV.to_string()
    }
}
