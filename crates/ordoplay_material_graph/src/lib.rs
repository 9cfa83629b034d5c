// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material graph and surface shader generator for `OrdoPlay` Editor.
//!
//! A material is a directed graph of nodes whose typed slots are wired
//! output-to-input. Generation turns the graph into shader source text.
//!
//! ## Architecture
//!
//! - [`Graph`] owns nodes and connections and enforces one edge per input
//! - [`nodes`] holds the node kinds and their emission code
//! - [`resolve`] assigns concrete widths to dynamic slots
//! - [`ShaderGenerator`] collects text per shader section
//! - [`generate`] runs a pass in dependency order
//! - [`MaterialGraphSession`] shares a graph between editing and generation

pub mod config;
pub mod connection;
pub mod generation;
pub mod generator;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod resolve;
pub mod session;
pub mod slot;

pub use config::{ConfigError, GeneratorConfig, Precision};
pub use connection::{Connection, ConnectionId};
pub use generation::{generate, GeneratedShader, GenerationError, GenerationMode, NodeContext, NodeError};
pub use generator::{PropertyKind, ShaderGenerator, ShaderProperty, ShaderSection};
pub use graph::{ConnectionError, CycleError, Graph, GraphLoadError};
pub use node::{Node, NodeId};
pub use nodes::{NodeCategory, NodeCodegen, NodeKind};
pub use session::MaterialGraphSession;
pub use slot::{ConcreteSlotValueType, Slot, SlotDirection, SlotValueType};
