// SPDX-License-Identifier: MIT OR Apache-2.0
//! Workflow editor command line.
//!
//! Runs the editor core without a window: check a saved workflow, run a test
//! entity through it, dump connection geometry, or write a starter workflow.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use workflow_editor_graph::routing;
use workflow_editor_graph::settings::SETTINGS_FILE_NAME;
use workflow_editor_graph::templates;
use workflow_editor_graph::{
    EditorSettings, NodeId, NodeKind, Simulation, TestEntity, WorkflowDocument, WorkflowGraph,
    WorkflowType,
};

#[derive(Parser, Debug)]
#[command(name = "workflow-editor", version, about = "Headless workflow graph editor")]
struct Cli {
    /// Path to the editor settings file
    #[arg(short, long, default_value = SETTINGS_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a workflow and report connections that break graph rules
    Validate {
        /// Workflow JSON file
        path: PathBuf,
    },
    /// Run a test entity from a trigger until the workflow ends
    Simulate {
        /// Workflow JSON file
        path: PathBuf,
        /// Trigger to start at; the first trigger if omitted
        #[arg(short, long)]
        trigger: Option<String>,
        /// Test entity name
        #[arg(short, long)]
        entity: Option<String>,
        /// Use the sample entity for the workflow type
        #[arg(long, conflicts_with = "entity")]
        sample: bool,
        /// Step limit; the configured auto-run limit if omitted
        #[arg(long)]
        max_steps: Option<usize>,
        /// Print the entity and the log as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print each connection's routed path as SVG path data
    Paths {
        /// Workflow JSON file
        path: PathBuf,
    },
    /// Write a starter workflow
    New {
        /// Kind of workflow
        #[arg(value_enum)]
        workflow_type: WorkflowTypeCli,
        /// Output file; stdout if omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorkflowTypeCli {
    Sales,
    Onboarding,
    Support,
    Engagement,
}

impl From<WorkflowTypeCli> for WorkflowType {
    fn from(value: WorkflowTypeCli) -> Self {
        match value {
            WorkflowTypeCli::Sales => WorkflowType::Sales,
            WorkflowTypeCli::Onboarding => WorkflowType::Onboarding,
            WorkflowTypeCli::Support => WorkflowType::Support,
            WorkflowTypeCli::Engagement => WorkflowType::Engagement,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("workflow_editor_graph=info,workflow_editor_cli=info,warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = EditorSettings::load_or_default(&cli.config);

    match cli.command {
        Commands::Validate { path } => validate(&path),
        Commands::Simulate {
            path,
            trigger,
            entity,
            sample,
            max_steps,
            json,
        } => {
            let document = load_document(&path)?;
            let (graph, _) = document.to_graph();
            let entity = if sample {
                TestEntity::sample(document.workflow_type)
            } else {
                TestEntity::new(entity.unwrap_or_else(|| settings.default_entity_label.clone()))
            };
            let max_steps = max_steps.unwrap_or(settings.auto_run_step_limit());
            simulate(&graph, trigger, entity, max_steps, json)
        }
        Commands::Paths { path } => paths(&path),
        Commands::New { workflow_type, out } => {
            let document = templates::starter(workflow_type.into());
            let json = document.to_json()?;
            match out {
                Some(out) => {
                    std::fs::write(&out, json)
                        .with_context(|| format!("writing {}", out.display()))?;
                    tracing::info!("Wrote {} starter to {}", document.workflow_type.display_name(), out.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

fn load_document(path: &Path) -> anyhow::Result<WorkflowDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    WorkflowDocument::from_json(&content).with_context(|| format!("parsing {}", path.display()))
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let document = load_document(path)?;
    let (graph, report) = document.to_graph();

    println!(
        "{}: {} nodes, {} connections",
        document.name, report.nodes_loaded, report.connections_loaded
    );
    for (id, err) in &report.rejected {
        println!("  rejected {id}: {err}");
    }

    let triggers = graph.triggers().count();
    if triggers == 0 {
        println!("  warning: no trigger node, the workflow cannot be tested");
    }
    for node in graph.nodes() {
        let dangling = node.kind != NodeKind::Exit && graph.outgoing(&node.id).next().is_none();
        if dangling {
            println!("  warning: {} ({}) has no outgoing connection", node.label, node.id);
        }
    }

    if !report.is_clean() {
        anyhow::bail!("{} invalid connection(s)", report.rejected.len());
    }
    Ok(())
}

fn simulate(
    graph: &WorkflowGraph,
    trigger: Option<String>,
    entity: TestEntity,
    max_steps: usize,
    json: bool,
) -> anyhow::Result<()> {
    let trigger_id = match trigger {
        Some(id) => NodeId::from(id),
        None => graph
            .triggers()
            .next()
            .map(|node| node.id.clone())
            .context("workflow has no trigger node")?,
    };

    let mut simulation = Simulation::new();
    simulation.start_with_entity(graph, &trigger_id, entity)?;
    simulation.run_to_completion(graph, max_steps);

    if json {
        println!("{}", serde_json::to_string_pretty(&json_report(&simulation))?);
        return Ok(());
    }
    if let Some(entity) = simulation.entity() {
        println!("Entity: {}", entity.summary());
    }
    for entry in simulation.log() {
        match &entry.result {
            Some(result) => println!("{:>3}  {}  [{}]", entry.index, entry.action, result),
            None => println!("{:>3}  {}", entry.index, entry.action),
        }
    }
    Ok(())
}

/// Entity and step log of a finished run
fn json_report(simulation: &Simulation) -> serde_json::Value {
    serde_json::json!({
        "entity": simulation.entity(),
        "log": simulation.log(),
    })
}

fn paths(path: &Path) -> anyhow::Result<()> {
    let document = load_document(path)?;
    let (graph, _) = document.to_graph();
    for connection in graph.connections() {
        match routing::route_connection(&graph, connection) {
            Some(route) => println!("{}\t{}", connection.id, route.to_svg()),
            None => println!("{}\t(unroutable: port {} missing)", connection.id, connection.from_port),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_flag_conflicts_with_entity() {
        let cli = Cli::try_parse_from(["workflow-editor", "simulate", "flow.json", "--sample"]).unwrap();
        assert!(matches!(cli.command, Commands::Simulate { sample: true, entity: None, .. }));
        assert!(Cli::try_parse_from([
            "workflow-editor", "simulate", "flow.json", "--sample", "--entity", "Acme Corp"
        ])
        .is_err());
    }

    #[test]
    fn json_report_carries_entity_attributes() {
        let (graph, _) = templates::starter(WorkflowType::Sales).to_graph();
        let trigger = graph.triggers().next().map(|n| n.id.clone()).unwrap();
        let mut simulation = Simulation::new();
        simulation
            .start_with_entity(&graph, &trigger, TestEntity::sample(WorkflowType::Sales))
            .unwrap();
        simulation.run_to_completion(&graph, 20);

        let report = json_report(&simulation);
        assert_eq!(report["entity"]["label"], "Acme Corp");
        assert_eq!(report["entity"]["attributes"]["leadScore"], 75);
        assert_eq!(report["entity"]["attributes"]["dealValue"], 50_000);
        assert_eq!(report["log"][0]["action"], "Acme Corp entered workflow");
        assert_eq!(report["log"].as_array().map(Vec::len), Some(simulation.log().len()));
    }
}
