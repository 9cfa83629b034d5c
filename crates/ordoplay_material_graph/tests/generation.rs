// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end generation scenarios.

use ordoplay_material_graph::nodes::{
    ConstantNode, ConstantValue, FunctionNode, MathFunction, SurfaceOutputNode, TextureNode, TextureType, UvNode,
};
use ordoplay_material_graph::{
    generate, GeneratedShader, GenerationError, GenerationMode, GeneratorConfig, Graph, GraphLoadError, Node, NodeError,
    NodeKind, PropertyKind,
};

fn function(f: MathFunction) -> NodeKind {
    NodeKind::Function(FunctionNode::new(f))
}

fn surface(graph: &Graph) -> GeneratedShader {
    generate(graph, GenerationMode::SurfaceShader, &GeneratorConfig::default()).unwrap()
}

fn position(source: &str, needle: &str) -> usize {
    source
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` missing from:\n{source}"))
}

#[test]
fn test_generation_is_deterministic() {
    let mut graph = Graph::new("Deterministic");
    let tex = graph.add(NodeKind::Texture(TextureNode::default()));
    let lerp = graph.add(function(MathFunction::Lerp));
    let out = graph.add(NodeKind::SurfaceOutput(SurfaceOutputNode));
    graph.connect(tex, "RGBA", lerp, "Input1").unwrap();
    graph.connect(lerp, "Output", out, "Albedo").unwrap();

    let first = surface(&graph);
    let second = surface(&graph);
    assert_eq!(first.source, second.source);

    let reloaded = Graph::from_ron(&graph.to_ron().unwrap()).unwrap();
    assert_eq!(surface(&reloaded).source, first.source);
}

#[test]
fn test_statements_follow_their_inputs() {
    let mut graph = Graph::new("Order");
    // Consumer added before its producer
    let sin = graph.add(function(MathFunction::Sin));
    let value = graph.add(NodeKind::Constant(ConstantNode::new(ConstantValue::Vector1(0.25))));
    graph.connect(value, "Value", sin, "Input1").unwrap();

    let shader = surface(&graph);
    let producer = position(&shader.source, "half vector11_out = 0.25;");
    let consumer = position(&shader.source, "half sin0_out = sin(vector11_out);");
    assert!(producer < consumer);
}

#[test]
fn test_unconnected_inputs_use_defaults() {
    let mut graph = Graph::new("Defaults");
    let tex = graph.add(NodeKind::Texture(TextureNode::default()));
    let lerp = graph.add(function(MathFunction::Lerp));
    graph.connect(tex, "R", lerp, "Input1").unwrap();

    let shader = surface(&graph);
    assert!(shader.is_clean());
    assert!(shader.source.contains("half lerp1_out = lerp(texture0_out.r, 1, 0.5);"));
}

#[test]
fn test_channels_share_one_sample() {
    let mut graph = Graph::new("Channels");
    let tex = graph.add(NodeKind::Texture(TextureNode::default()));
    let sin = graph.add(function(MathFunction::Sin));
    let cos = graph.add(function(MathFunction::Cos));
    graph.connect(tex, "G", sin, "Input1").unwrap();
    graph.connect(tex, "A", cos, "Input1").unwrap();

    let shader = surface(&graph);
    assert_eq!(shader.source.matches("tex2D(").count(), 1);
    assert!(shader.source.contains("half4 texture0_out = tex2D(_texture0, IN.meshUV0.xy);"));
    assert!(shader.source.contains("half sin1_out = sin(texture0_out.g);"));
    assert!(shader.source.contains("half cos2_out = cos(texture0_out.a);"));
}

#[test]
fn test_cycle_is_rejected() {
    let mut graph = Graph::new("Cycle");
    let a = graph.add(function(MathFunction::Sin));
    let b = graph.add(function(MathFunction::Cos));
    graph.connect(a, "Output", b, "Input1").unwrap();
    graph.connect(b, "Output", a, "Input1").unwrap();

    match generate(&graph, GenerationMode::SurfaceShader, &GeneratorConfig::default()) {
        Err(GenerationError::Cycle(err)) => {
            assert!(err.nodes.contains(&a));
            assert!(err.nodes.contains(&b));
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}

#[test]
fn test_invalid_slot_configuration_is_not_fatal() {
    let mut graph = Graph::new("Broken");
    let mut broken = Node::new(function(MathFunction::Lerp));
    let removed = broken.remove_slots_not_in(&["Input1", "Output"]);
    assert_eq!(removed, ["Input2", "Input3"]);
    let lerp = graph.add_node(broken);
    let sin = graph.add(function(MathFunction::Sin));
    graph.connect(lerp, "Output", sin, "Input1").unwrap();

    let shader = surface(&graph);
    assert_eq!(shader.errors.len(), 1);
    assert!(matches!(
        &shader.errors[0],
        NodeError::InvalidSlotConfiguration { node, slot, .. } if *node == lerp && slot == "Input2"
    ));
    assert!(!shader.source.contains("lerp0_out"));
    // Downstream of the failed node falls back to its default
    assert!(shader.source.contains("half4 sin1_out = sin(half4(0, 0, 0, 0));"));
}

#[test]
fn test_bump_textures_unpack_normals() {
    let mut graph = Graph::new("Bump");
    let mut node = TextureNode::default();
    node.texture_type = TextureType::Bump;
    graph.add(NodeKind::Texture(node));

    let shader = surface(&graph);
    assert!(shader
        .source
        .contains("half4 texture0_out = half4(UnpackNormal(tex2D(_texture0, IN.meshUV0.xy)), 0);"));
    assert!(shader.source.contains("[Normal] _texture0(\"Texture\", 2D) = \"bump\" {}"));
    assert!(matches!(
        shader.properties[0].kind,
        PropertyKind::Texture {
            texture_type: TextureType::Bump,
            ..
        }
    ));
}

#[test]
fn test_textures_share_default_uv() {
    let mut graph = Graph::new("Uv");
    graph.add(NodeKind::Texture(TextureNode::default()));
    graph.add(NodeKind::Texture(TextureNode::default()));

    let shader = surface(&graph);
    assert_eq!(shader.source.matches("half4 meshUV0;").count(), 1);
    assert_eq!(shader.source.matches("o.meshUV0 = v.texcoord;").count(), 1);
    assert_eq!(shader.source.matches("sampler2D _texture").count(), 2);
    assert_eq!(shader.properties.len(), 2);
}

#[test]
fn test_connected_uv_node() {
    let mut graph = Graph::new("Uv");
    let uv = graph.add(NodeKind::Uv(UvNode));
    let tex = graph.add(NodeKind::Texture(TextureNode::default()));
    graph.connect(uv, "UV", tex, "UV").unwrap();

    let shader = surface(&graph);
    assert!(shader.source.contains("tex2D(_texture1, IN.meshUV0.xy)"));
    assert_eq!(shader.source.matches("half4 meshUV0;").count(), 1);
}

#[test]
fn test_preview_exposes_constants() {
    let mut graph = Graph::new("Preview");
    let value = graph.add(NodeKind::Constant(ConstantNode::new(ConstantValue::Vector1(0.25))));
    let sin = graph.add(function(MathFunction::Sin));
    graph.connect(value, "Value", sin, "Input1").unwrap();

    let preview = generate(&graph, GenerationMode::Preview, &GeneratorConfig::default()).unwrap();
    assert_eq!(preview.properties.len(), 1);
    assert_eq!(preview.properties[0].name, "_vector10");
    assert!(preview.source.contains("[HideInInspector] _vector10(\"Vector 1\", Float) = 0.25"));
    assert!(preview.source.contains("half _vector10;"));
    assert!(preview.source.contains("half sin1_out = sin(_vector10);"));

    let final_pass = surface(&graph);
    assert!(final_pass.properties.is_empty());
}

#[test]
fn test_function_definitions_emitted_once() {
    let mut graph = Graph::new("Functions");
    graph.add(function(MathFunction::Add));
    graph.add(function(MathFunction::Add));

    let shader = surface(&graph);
    assert_eq!(
        shader
            .source
            .matches("inline half4 unity_add(half4 arg1, half4 arg2)")
            .count(),
        1
    );
    assert!(shader.source.contains("half4 add0_out = unity_add(half4(0, 0, 0, 0), half4(0, 0, 0, 0));"));
    assert!(shader.source.contains("half4 add1_out = unity_add("));
}

#[test]
fn test_surface_output_assignments() {
    let mut graph = Graph::new("Surface");
    let tex = graph.add(NodeKind::Texture(TextureNode::default()));
    let out = graph.add(NodeKind::SurfaceOutput(SurfaceOutputNode));
    graph.connect(tex, "RGBA", out, "Albedo").unwrap();
    graph.connect(tex, "A", out, "Alpha").unwrap();

    let shader = surface(&graph);
    assert!(shader.source.contains("o.Albedo = texture0_out.xyz;"));
    assert!(shader.source.contains("o.Alpha = texture0_out.a;"));
    assert!(!shader.source.contains("o.Metallic"));
}

#[test]
fn test_reconfigured_node_drops_stale_edges() {
    let mut graph = Graph::new("Reconfigure");
    let value = graph.add(NodeKind::Constant(ConstantNode::new(ConstantValue::Vector1(1.0))));
    let node = graph.add(function(MathFunction::Lerp));
    graph.connect(value, "Value", node, "Input3").unwrap();

    let change = graph
        .configure_node(node, |kind| *kind = function(MathFunction::Add))
        .unwrap();
    assert!(change.slots_changed);
    assert_eq!(change.removed_connections.len(), 1);

    let shader = surface(&graph);
    assert!(shader.is_clean());
    assert!(shader.source.contains("unity_add(half4(0, 0, 0, 0), half4(0, 0, 0, 0))"));
}

#[test]
fn test_scalar_uv_is_broadcast() {
    let mut graph = Graph::new("ScalarUv");
    let value = graph.add(NodeKind::Constant(ConstantNode::new(ConstantValue::Vector1(0.5))));
    let tex = graph.add(NodeKind::Texture(TextureNode::default()));
    graph.connect(value, "Value", tex, "UV").unwrap();

    let shader = surface(&graph);
    assert!(shader.source.contains("half vector10_out = 0.5;"));
    assert!(shader
        .source
        .contains("half4 texture1_out = tex2D(_texture1, half2(vector10_out, vector10_out));"));
    assert!(!shader.source.contains("vector10_out.xy"));
    // Connected UVs need no mesh interpolator
    assert!(!shader.source.contains("meshUV0"));
}

#[test]
fn test_wide_uv_is_narrowed() {
    let mut graph = Graph::new("WideUv");
    let value = graph.add(NodeKind::Constant(ConstantNode::new(ConstantValue::Vector3([0.0, 1.0, 2.0]))));
    let dot = graph.add(function(MathFunction::Dot));
    let first = graph.add(NodeKind::Texture(TextureNode::default()));
    let second = graph.add(NodeKind::Texture(TextureNode::default()));
    graph.connect(value, "Value", first, "UV").unwrap();
    graph.connect(value, "Value", dot, "Input1").unwrap();
    graph.connect(dot, "Output", second, "UV").unwrap();

    let shader = surface(&graph);
    assert!(shader.source.contains("tex2D(_texture2, vector30_out.xy)"));
    assert!(shader.source.contains("tex2D(_texture3, half2(dot1_out, dot1_out))"));
}

#[test]
fn test_non_finite_constants_stay_valid() {
    let mut graph = Graph::new("NonFinite");
    let value = graph.add(NodeKind::Constant(ConstantNode::new(ConstantValue::Vector2([f32::NAN, f32::INFINITY]))));
    let sin = graph.add(function(MathFunction::Sin));
    graph.connect(value, "Value", sin, "Input1").unwrap();

    let shader = surface(&graph);
    assert!(!shader.source.contains("NaN"));
    assert!(!shader.source.contains("inf"));

    let preview = generate(&graph, GenerationMode::Preview, &GeneratorConfig::default()).unwrap();
    assert_eq!(preview.properties[0].kind, PropertyKind::Vector([0.0, f32::MAX, 0.0, 0.0]));
}

#[test]
fn test_loaded_duplicate_serials_rejected() {
    let mut graph = Graph::new("Serials");
    graph.add(function(MathFunction::Sin));
    graph.add(function(MathFunction::Sin));

    let text = graph.to_ron().unwrap().replace("serial: 1", "serial: 0");
    assert!(matches!(
        Graph::from_ron(&text),
        Err(GraphLoadError::DuplicateSerial(0))
    ));
}
