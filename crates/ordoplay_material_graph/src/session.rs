// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared graph handle for editing and generating from several threads.
//!
//! Edits take the write lock; a generation pass holds the read lock for its
//! whole duration, so it always sees one consistent snapshot.

use crate::config::GeneratorConfig;
use crate::generation::{generate, GeneratedShader, GenerationError, GenerationMode};
use crate::graph::Graph;
use parking_lot::RwLock;

/// A material graph together with its generator configuration
pub struct MaterialGraphSession {
    graph: RwLock<Graph>,
    config: RwLock<GeneratorConfig>,
}

impl MaterialGraphSession {
    /// Wrap a graph
    pub fn new(graph: Graph, config: GeneratorConfig) -> Self {
        Self {
            graph: RwLock::new(graph),
            config: RwLock::new(config),
        }
    }

    /// Mutate the graph under the write lock
    pub fn edit<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        let mut graph = self.graph.write();
        f(&mut graph)
    }

    /// Inspect the graph under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        let graph = self.graph.read();
        f(&graph)
    }

    /// Run a generation pass over the current graph
    pub fn generate(&self, mode: GenerationMode) -> Result<GeneratedShader, GenerationError> {
        let config = self.config.read().clone();
        let graph = self.graph.read();
        generate(&graph, mode, &config)
    }

    /// Current configuration
    pub fn config(&self) -> GeneratorConfig {
        self.config.read().clone()
    }

    /// Replace the configuration used by later passes
    pub fn set_config(&self, config: GeneratorConfig) {
        *self.config.write() = config;
    }

    /// Take the graph back
    pub fn into_graph(self) -> Graph {
        self.graph.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Precision;
    use crate::nodes::{FunctionNode, MathFunction, NodeKind};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_edit_then_generate() {
        let session = MaterialGraphSession::new(Graph::new("Session"), GeneratorConfig::default());
        session.edit(|graph| graph.add(NodeKind::Function(FunctionNode::new(MathFunction::Sin))));

        let shader = session.generate(GenerationMode::SurfaceShader).unwrap();
        assert!(shader.source.contains("half4 sin0_out = sin(half4(0, 0, 0, 0));"));
        assert_eq!(session.read(Graph::node_count), 1);
    }

    #[test]
    fn test_config_applies_to_later_passes() {
        let session = MaterialGraphSession::new(Graph::new("Session"), GeneratorConfig::default());
        session.edit(|graph| graph.add(NodeKind::Function(FunctionNode::new(MathFunction::Cos))));
        session.set_config(GeneratorConfig {
            precision: Precision::Float,
            ..session.config()
        });

        let shader = session.generate(GenerationMode::SurfaceShader).unwrap();
        assert!(shader.source.contains("float4 cos0_out"));
    }

    #[test]
    fn test_concurrent_edits_and_passes() {
        let session = Arc::new(MaterialGraphSession::new(Graph::new("Session"), GeneratorConfig::default()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    for _ in 0..8 {
                        session.edit(|graph| graph.add(NodeKind::Function(FunctionNode::new(MathFunction::Abs))));
                        assert!(session.generate(GenerationMode::Preview).is_ok());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let graph = Arc::try_unwrap(session).ok().unwrap().into_graph();
        assert_eq!(graph.node_count(), 32);
    }
}
