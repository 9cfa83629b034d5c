// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered text sections filled during a generation pass.
//!
//! Nodes append chunks to named sections; [`ShaderGenerator::assemble`]
//! stitches the sections into a surface shader.

use crate::config::GeneratorConfig;
use crate::nodes::{TextureHandle, TextureType};
use indexmap::IndexMap;
use std::fmt::Write;

/// Section of the generated shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderSection {
    /// Material property declarations
    Properties,
    /// Uniform declarations backing the properties
    PropertyUsages,
    /// Shared function definitions
    Functions,
    /// Fields of the vertex-to-fragment struct
    VertexToFragment,
    /// Vertex-stage statements
    Vertex,
    /// Fragment-stage statements
    Body,
}

impl ShaderSection {
    /// Every section, in assembly order
    pub const ALL: [ShaderSection; 6] = [
        Self::Properties,
        Self::PropertyUsages,
        Self::Functions,
        Self::VertexToFragment,
        Self::Vertex,
        Self::Body,
    ];
}

/// Kind and default of a material property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// 2D texture
    Texture {
        /// Texture bound by default, if the host assigned one
        default_texture: Option<TextureHandle>,
        /// Interpretation and fallback texture
        texture_type: TextureType,
    },
    /// Scalar
    Float(f32),
    /// Vector, padded to four components
    Vector([f32; 4]),
}

/// A material property contributed by a node
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProperty {
    /// Uniform name
    pub name: String,
    /// Inspector label
    pub display_name: String,
    /// Kind and default value
    pub kind: PropertyKind,
    /// Whether the property shows up in material inspectors
    pub exposed: bool,
}

impl ShaderProperty {
    /// Line in the `Properties` block
    pub fn declaration(&self) -> String {
        let mut line = String::new();
        if !self.exposed {
            line.push_str("[HideInInspector] ");
        }

        match &self.kind {
            PropertyKind::Texture { texture_type, .. } => {
                if *texture_type == TextureType::Bump {
                    line.push_str("[Normal] ");
                }
                let _ = write!(
                    line,
                    "{}(\"{}\", 2D) = \"{}\" {{}}",
                    self.name,
                    self.display_name,
                    texture_type.default_texture_name()
                );
            }
            PropertyKind::Float(value) => {
                let _ = write!(line, "{}(\"{}\", Float) = {}", self.name, self.display_name, value);
            }
            PropertyKind::Vector([x, y, z, w]) => {
                let _ = write!(
                    line,
                    "{}(\"{}\", Vector) = ({}, {}, {}, {})",
                    self.name, self.display_name, x, y, z, w
                );
            }
        }
        line
    }
}

/// Append-only ordered list of text chunks
#[derive(Debug, Clone, Default)]
pub struct ChunkList {
    chunks: Vec<String>,
}

impl ChunkList {
    /// Append a chunk. A unique chunk is skipped if an identical one exists.
    pub fn add_chunk(&mut self, text: impl Into<String>, unique: bool) {
        let text = text.into();
        if unique && self.chunks.contains(&text) {
            return;
        }
        self.chunks.push(text);
    }

    /// Chunks in insertion order
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Whether no chunk was added
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Write every line of every chunk at the given tab depth
    fn write_indented(&self, out: &mut String, depth: usize) {
        for chunk in &self.chunks {
            for line in chunk.lines() {
                for _ in 0..depth {
                    out.push('\t');
                }
                out.push_str(line);
                out.push('\n');
            }
        }
    }
}

/// Emission sink for one generation pass
#[derive(Debug, Clone)]
pub struct ShaderGenerator {
    sections: IndexMap<ShaderSection, ChunkList>,
    properties: Vec<ShaderProperty>,
}

impl ShaderGenerator {
    /// Create a sink with every section empty
    pub fn new() -> Self {
        Self {
            sections: ShaderSection::ALL
                .iter()
                .map(|section| (*section, ChunkList::default()))
                .collect(),
            properties: Vec::new(),
        }
    }

    /// Append a chunk to a section
    pub fn add_chunk(&mut self, section: ShaderSection, text: impl Into<String>, unique: bool) {
        self.sections.entry(section).or_default().add_chunk(text, unique);
    }

    /// Append a line to a section unconditionally
    pub fn add_line(&mut self, section: ShaderSection, text: impl Into<String>) {
        self.add_chunk(section, text, false);
    }

    /// Register a material property; later registrations of the same name are ignored
    pub fn add_property(&mut self, property: ShaderProperty) {
        if self.properties.iter().any(|p| p.name == property.name) {
            return;
        }
        self.add_line(ShaderSection::Properties, property.declaration());
        self.properties.push(property);
    }

    /// Contents of a section
    pub fn section(&self, section: ShaderSection) -> &[String] {
        match self.sections.get(&section) {
            Some(chunks) => chunks.chunks(),
            None => &[],
        }
    }

    /// Registered material properties
    pub fn properties(&self) -> &[ShaderProperty] {
        &self.properties
    }

    /// Take the registered properties
    pub fn into_properties(self) -> Vec<ShaderProperty> {
        self.properties
    }

    fn write_section(&self, out: &mut String, section: ShaderSection, depth: usize) {
        if let Some(chunks) = self.sections.get(&section) {
            chunks.write_indented(out, depth);
        }
    }

    fn has_section(&self, section: ShaderSection) -> bool {
        self.sections.get(&section).is_some_and(|c| !c.is_empty())
    }

    /// Stitch the sections into a surface shader
    pub fn assemble(&self, config: &GeneratorConfig) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Shader \"{}\" {{", config.shader_name);
        out.push_str("\tProperties {\n");
        self.write_section(&mut out, ShaderSection::Properties, 2);
        out.push_str("\t}\n");
        out.push_str("\tSubShader {\n");
        out.push_str("\t\tTags { \"RenderType\"=\"Opaque\" }\n");
        out.push_str("\t\tLOD 200\n\n");
        out.push_str("\t\tCGPROGRAM\n");
        out.push_str("\t\t#pragma surface surf Standard vertex:vert\n");
        out.push_str("\t\t#pragma target 3.0\n\n");

        if self.has_section(ShaderSection::Functions) {
            self.write_section(&mut out, ShaderSection::Functions, 2);
            out.push('\n');
        }
        if self.has_section(ShaderSection::PropertyUsages) {
            self.write_section(&mut out, ShaderSection::PropertyUsages, 2);
            out.push('\n');
        }

        out.push_str("\t\tstruct Input {\n");
        if self.has_section(ShaderSection::VertexToFragment) {
            self.write_section(&mut out, ShaderSection::VertexToFragment, 3);
        } else {
            // Surface shaders reject an empty Input struct
            let _ = writeln!(out, "\t\t\t{}4 color : COLOR;", config.precision.token());
        }
        out.push_str("\t\t};\n\n");

        out.push_str("\t\tvoid vert (inout appdata_full v, out Input o) {\n");
        out.push_str("\t\t\tUNITY_INITIALIZE_OUTPUT(Input, o);\n");
        self.write_section(&mut out, ShaderSection::Vertex, 3);
        out.push_str("\t\t}\n\n");

        out.push_str("\t\tvoid surf (Input IN, inout SurfaceOutputStandard o) {\n");
        self.write_section(&mut out, ShaderSection::Body, 3);
        out.push_str("\t\t}\n");
        out.push_str("\t\tENDCG\n");
        out.push_str("\t}\n");
        out.push_str("\tFallBack \"Diffuse\"\n");
        out.push_str("}\n");

        out
    }
}

impl Default for ShaderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_chunks_are_deduplicated() {
        let mut sink = ShaderGenerator::new();
        sink.add_chunk(ShaderSection::Vertex, "o.meshUV0 = v.texcoord;", true);
        sink.add_chunk(ShaderSection::Vertex, "o.meshUV0 = v.texcoord;", true);
        sink.add_line(ShaderSection::Body, "half a = 1;");
        sink.add_line(ShaderSection::Body, "half a = 1;");
        assert_eq!(sink.section(ShaderSection::Vertex).len(), 1);
        assert_eq!(sink.section(ShaderSection::Body).len(), 2);
    }

    #[test]
    fn test_property_declarations() {
        let texture = ShaderProperty {
            name: "_texture0".into(),
            display_name: "Albedo".into(),
            kind: PropertyKind::Texture {
                default_texture: None,
                texture_type: TextureType::Bump,
            },
            exposed: false,
        };
        assert_eq!(
            texture.declaration(),
            "[HideInInspector] [Normal] _texture0(\"Albedo\", 2D) = \"bump\" {}"
        );

        let float = ShaderProperty {
            name: "_vector11".into(),
            display_name: "Gloss".into(),
            kind: PropertyKind::Float(0.5),
            exposed: true,
        };
        assert_eq!(float.declaration(), "_vector11(\"Gloss\", Float) = 0.5");
    }

    #[test]
    fn test_properties_registered_once() {
        let mut sink = ShaderGenerator::new();
        let property = ShaderProperty {
            name: "_p".into(),
            display_name: "P".into(),
            kind: PropertyKind::Vector([1.0, 0.0, 0.0, 1.0]),
            exposed: true,
        };
        sink.add_property(property.clone());
        sink.add_property(property);
        assert_eq!(sink.properties().len(), 1);
        assert_eq!(sink.section(ShaderSection::Properties), ["_p(\"P\", Vector) = (1, 0, 0, 1)"]);
    }

    #[test]
    fn test_assemble_layout() {
        let mut sink = ShaderGenerator::new();
        sink.add_line(ShaderSection::Body, "half4 x = 1;");
        sink.add_chunk(ShaderSection::Functions, "inline half f(half a)\n{\n\treturn a;\n}", true);
        let text = sink.assemble(&GeneratorConfig::default());

        assert!(text.starts_with("Shader \"OrdoPlay/Material\" {\n"));
        assert!(text.contains("\t\t\thalf4 x = 1;\n"));
        assert!(text.contains("\t\tinline half f(half a)\n\t\t{\n\t\t\treturn a;\n\t\t}\n"));
        assert!(text.contains("\t\t\thalf4 color : COLOR;\n"));
        assert!(text.ends_with("}\n"));
    }
}
