// SPDX-License-Identifier: MIT OR Apache-2.0
//! `ordoplay-matc`: compile a material graph document into a surface shader.

use clap::{Parser, ValueEnum};
use ordoplay_material_graph::nodes::node_catalogue;
use ordoplay_material_graph::{
    ConfigError, GenerationError, GenerationMode, GeneratorConfig, Graph, GraphLoadError, MaterialGraphSession,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "ordoplay-matc")]
#[command(about = "Material graph to surface shader compiler", version)]
struct Cli {
    /// Material graph document (.ron)
    #[arg(required_unless_present = "list_nodes")]
    graph: Option<PathBuf>,
    /// Generator configuration (.ron)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// What the shader is generated for
    #[arg(long, short, value_enum, default_value_t = Mode::Surface)]
    mode: Mode,
    /// Write the shader here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Fail when any node could not be emitted
    #[arg(long)]
    strict: bool,
    /// Print the available node kinds and exit
    #[arg(long)]
    list_nodes: bool,
    /// Verbose mode
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Final surface shader
    Surface,
    /// Live preview with every constant exposed
    Preview,
}

impl From<Mode> for GenerationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Surface => GenerationMode::SurfaceShader,
            Mode::Preview => GenerationMode::Preview,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to load graph: {0}")]
    Graph(#[from] GraphLoadError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} node(s) could not be emitted")]
    Strict(usize),

    #[error("No graph document given")]
    MissingGraph,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.list_nodes {
        list_nodes();
        return Ok(());
    }

    let graph_path = cli.graph.as_deref().ok_or(CliError::MissingGraph)?;
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let graph = Graph::load(graph_path)?;
    tracing::info!(
        "Compiling {} ({} nodes, {} connections)",
        graph.name,
        graph.node_count(),
        graph.connection_count()
    );

    let session = MaterialGraphSession::new(graph, config);
    let shader = session.generate(cli.mode.into())?;

    for error in &shader.errors {
        tracing::warn!("{error}");
    }
    if cli.strict && !shader.errors.is_empty() {
        return Err(CliError::Strict(shader.errors.len()));
    }

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &shader.source).map_err(|source| CliError::Output {
                path: path.clone(),
                source,
            })?;
            tracing::info!("Wrote {} ({} properties)", path.display(), shader.properties.len());
        }
        None => print!("{}", shader.source),
    }
    Ok(())
}

fn list_nodes() {
    for kind in node_catalogue() {
        let slots: Vec<String> = kind
            .slot_descriptors()
            .iter()
            .map(|d| format!("{} {:?} {:?}", d.name, d.direction, d.value_type))
            .collect();
        println!("{:<8} {:<16} {}", format!("{:?}", kind.category()), kind.display_name(), slots.join(", "));
    }
}
