// SPDX-License-Identifier: MIT OR Apache-2.0
//! 2D texture sampler node.

use super::{uv, NodeCodegen, SlotDescriptor};
use crate::generation::{NodeContext, NodeError};
use crate::generator::{PropertyKind, ShaderGenerator, ShaderProperty, ShaderSection};
use crate::slot::{Slot, SlotValueType};
use serde::{Deserialize, Serialize};

const RGBA_SLOT: &str = "RGBA";
const R_SLOT: &str = "R";
const G_SLOT: &str = "G";
const B_SLOT: &str = "B";
const A_SLOT: &str = "A";
const UV_SLOT: &str = "UV";

pub(super) const SLOTS: &[SlotDescriptor] = &[
    SlotDescriptor::output(RGBA_SLOT, SlotValueType::Vector4),
    SlotDescriptor::output(R_SLOT, SlotValueType::Vector1),
    SlotDescriptor::output(G_SLOT, SlotValueType::Vector1),
    SlotDescriptor::output(B_SLOT, SlotValueType::Vector1),
    SlotDescriptor::output(A_SLOT, SlotValueType::Vector1),
    SlotDescriptor::input(UV_SLOT, SlotValueType::Vector2),
];

/// How the sampled texture is interpreted, and its fallback when no asset is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureType {
    /// Color texture, white fallback
    #[default]
    White,
    /// Color texture, gray fallback
    Gray,
    /// Color texture, black fallback
    Black,
    /// Tangent-space normal map
    Bump,
}

impl TextureType {
    /// Built-in texture name used as the property default
    pub fn default_texture_name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Gray => "gray",
            Self::Black => "black",
            Self::Bump => "bump",
        }
    }
}

/// Opaque reference to a texture asset, owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub String);

/// Texture sampler node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureNode {
    /// Texture bound to the material property by default
    pub texture: Option<TextureHandle>,
    /// Sampling interpretation
    pub texture_type: TextureType,
    /// Whether the property shows up in material inspectors
    pub exposed: bool,
}

impl Default for TextureNode {
    fn default() -> Self {
        Self {
            texture: None,
            texture_type: TextureType::White,
            exposed: true,
        }
    }
}

impl TextureNode {
    /// Create a texture node bound to an asset
    pub fn new(texture: TextureHandle, texture_type: TextureType) -> Self {
        Self {
            texture: Some(texture),
            texture_type,
            exposed: true,
        }
    }

    fn uses_default_uv(&self, ctx: &NodeContext<'_>) -> bool {
        match ctx.node.find_input_slot(UV_SLOT) {
            Some(slot) => ctx.upstream_variable(slot).is_none(),
            None => false,
        }
    }

    /// Two-component UV expression feeding the sampler
    fn uv_expression(&self, ctx: &NodeContext<'_>, uv_slot: &Slot) -> String {
        if ctx.upstream_variable(uv_slot).is_some() {
            ctx.input_value(uv_slot, &[0.0])
        } else {
            format!("{}.xy", uv::MESH_UV)
        }
    }
}

impl NodeCodegen for TextureNode {
    fn generate_body(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) -> Result<(), NodeError> {
        let uv_slot = ctx.require_input(UV_SLOT)?;
        ctx.require_output(RGBA_SLOT)?;

        let uv = self.uv_expression(ctx, uv_slot);
        let precision = ctx.precision.token();

        let mut sample = format!("tex2D({}, {})", ctx.node.property_name(), uv);
        if self.texture_type == TextureType::Bump {
            sample = format!("{precision}4(UnpackNormal({sample}), 0)");
        }

        sink.add_line(
            ShaderSection::Body,
            format!("{precision}4 {} = {};", ctx.node.output_variable_name(), sample),
        );
        Ok(())
    }

    fn generate_property_block(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        sink.add_property(ShaderProperty {
            name: ctx.node.property_name(),
            display_name: ctx.node.name.clone(),
            kind: PropertyKind::Texture {
                default_texture: self.texture.clone(),
                texture_type: self.texture_type,
            },
            exposed: self.exposed,
        });
    }

    fn generate_property_usages(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        sink.add_chunk(
            ShaderSection::PropertyUsages,
            format!("sampler2D {};", ctx.node.property_name()),
            true,
        );
    }

    fn generate_vertex_block(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        if self.uses_default_uv(ctx) {
            uv::generate_mesh_uv_vertex_block(sink);
        }
    }

    fn generate_vertex_to_fragment_block(&self, ctx: &NodeContext<'_>, sink: &mut ShaderGenerator) {
        if self.uses_default_uv(ctx) {
            uv::generate_mesh_uv_interpolator(ctx.precision, sink);
        }
    }

    fn output_variable(&self, ctx: &NodeContext<'_>, slot: &Slot) -> String {
        let channel = match slot.name.as_str() {
            R_SLOT => ".r",
            G_SLOT => ".g",
            B_SLOT => ".b",
            A_SLOT => ".a",
            _ => "",
        };
        format!("{}{}", ctx.node.output_variable_name(), channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texture_names() {
        assert_eq!(TextureType::default().default_texture_name(), "white");
        assert_eq!(TextureType::Bump.default_texture_name(), "bump");
    }

    #[test]
    fn test_new_binds_handle() {
        let node = TextureNode::new(TextureHandle("Textures/brick.png".into()), TextureType::Gray);
        assert_eq!(node.texture, Some(TextureHandle("Textures/brick.png".into())));
        assert!(node.exposed);
    }
}
