use anyhow::{bail, Context, Result as AnyhowResult};
use clap::Parser;
use concept_tree::config::{Preferences, TreeConfig};
use concept_tree::services::source::{HierarchyDocument, MemorySource};
use concept_tree::services::tracing_setup;
use concept_tree::services::warning_log::WarningLogHandle;
use concept_tree::view::concept_tree::{
    render_text, ConceptTreeController, NodeId, TreeError, TreeEvent,
};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

/// Browse a knowledge-base concept hierarchy as a lazily loaded tree
#[derive(Parser, Debug)]
#[command(name = "concept-tree")]
#[command(about = "Render a concept hierarchy with expansion and selection", long_about = None)]
#[command(version)]
struct Args {
    /// JSON hierarchy document to browse
    #[arg(
        value_name = "HIERARCHY",
        required_unless_present_any = ["dump_config", "dump_schema"]
    )]
    hierarchy: Option<PathBuf>,

    /// Show concepts from implicit namespaces (RDF, RDFS, OWL, XSD)
    #[arg(long)]
    show_all: bool,

    /// Expand a concept; repeat in tree order to open nested branches
    #[arg(long = "expand", value_name = "ID")]
    expand: Vec<String>,

    /// Select a concept after expanding
    #[arg(long, value_name = "ID")]
    select: Option<String>,

    /// Request creation of a new concept
    #[arg(long)]
    new_concept: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the configuration JSON Schema and exit
    #[arg(long)]
    dump_schema: bool,
}

fn load_config(args: &Args) -> AnyhowResult<TreeConfig> {
    let config = match &args.config {
        Some(path) => TreeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TreeConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn describe(id: Option<&NodeId>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn print_event(event: &TreeEvent, print_warnings: bool) {
    match event {
        TreeEvent::SelectionChanged { previous, current } => {
            println!(
                "selection changed: {} -> {}",
                describe(previous.as_ref()),
                describe(current.as_ref())
            );
        }
        TreeEvent::NewEntityRequested => println!("new concept requested"),
        TreeEvent::Warning(msg) if print_warnings => eprintln!("warning: {msg}"),
        TreeEvent::Warning(_) => {}
    }
}

/// Captured warnings still to be shown on stderr
///
/// When logging goes to stderr the fmt layer has printed them already.
fn pending_warnings(handle: Option<&WarningLogHandle>, logs_to_stderr: bool) -> Vec<String> {
    match handle {
        Some(handle) if !logs_to_stderr => handle.drain(),
        _ => Vec::new(),
    }
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if args.dump_schema {
        println!("{}", TreeConfig::schema_json()?);
        return Ok(());
    }

    let warning_handle = tracing_setup::init_global(args.log_file.as_deref(), &config.logging);

    let Some(path) = &args.hierarchy else {
        bail!("No hierarchy document given");
    };
    let document = HierarchyDocument::load_from_file(path)
        .with_context(|| format!("Failed to read hierarchy from {}", path.display()))?;
    tracing::info!(
        "Loaded {} concepts from {}",
        document.concepts.len(),
        path.display()
    );

    let source = MemorySource::from_document(&document).with_filter(config.namespace_filter());
    let mut controller =
        ConceptTreeController::from_config(Arc::new(source), document.knowledge_base(), &config);
    let (tx, rx) = mpsc::channel();
    controller.subscribe(tx);

    if args.show_all {
        controller.change_preferences(Preferences {
            show_all_concepts: true,
        });
    }

    controller.roots()?;
    for id in &args.expand {
        controller
            .expand(&NodeId::from(id.as_str()))
            .with_context(|| format!("Cannot expand {id}"))?;
    }
    if let Some(id) = &args.select {
        controller
            .click(&NodeId::from(id.as_str()))
            .with_context(|| format!("Cannot select {id}"))?;
    }
    if args.new_concept {
        match controller.request_new_entity() {
            Err(TreeError::ReadOnly) => {
                eprintln!("warning: {} is read-only", controller.scope().name)
            }
            other => other?,
        }
    }

    let rows = controller.rows()?;
    print!("{}", render_text(&rows));

    // Warnings reach stderr through logging when a subscriber is installed
    for event in rx.try_iter() {
        print_event(&event, warning_handle.is_none());
    }
    for line in pending_warnings(warning_handle.as_ref(), args.log_file.is_none()) {
        eprintln!("{line}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concept_tree::services::warning_log;
    use std::time::Duration;

    #[test]
    fn test_warnings_are_printed_once() {
        let (layer, handle) = warning_log::create(Duration::from_secs(5));
        let subscriber = tracing_setup::build_subscriber(std::io::sink, "info", Some(layer));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Listing children of B failed: offline");
        });

        // Already on stderr through the fmt layer
        assert!(pending_warnings(Some(&handle), true).is_empty());

        let lines = pending_warnings(Some(&handle), false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Listing children of B failed"));

        assert!(pending_warnings(None, false).is_empty());
    }
}
