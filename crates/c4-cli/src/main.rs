#![forbid(unsafe_code)]

//! c4lens CLI - parse, lay out and validate architecture DSL documents.
//!
//! # Commands
//!
//! - `parse`: Output the parsed workspace (or a summary) as JSON
//! - `layout`: Filter a workspace for one view and output positioned nodes and edges
//! - `views`: List the views worth showing for a workspace
//! - `validate`: Check a document and report line-numbered diagnostics

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use c4_core::{ViewType, Workspace};
use c4_layout::{LayoutConfig, available_views, layout_view_with_config};
use c4_parser::{ParseResult, parse_guarded, parse_summary_json};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Parse, lay out and check C4-style architecture workspaces.
///
/// Bad lines are reported with their line number and skipped, so a partly
/// broken document still yields every view it can.
#[derive(Debug, Parser)]
#[command(name = "c4lens", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    logging: Logging,
}

#[derive(Debug, Args)]
struct Logging {
    /// Log more: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl Logging {
    fn filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print element, relationship and error counts, or the whole model.
    Parse {
        /// DSL file, `-` for stdin, or the document text itself
        #[arg(default_value = "-")]
        input: String,

        /// Print the parsed workspace, styles and errors instead of counts
        #[arg(long)]
        full: bool,

        /// Indent the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Position the elements of one view and print nodes, edges and bounds.
    Layout {
        /// DSL file, `-` for stdin, or the document text itself
        #[arg(default_value = "-")]
        input: String,

        /// View type (systemContext, container, component, dynamic, deployment)
        #[arg(long, default_value = "systemContext")]
        view: ViewType,

        /// TOML file whose [layout] table overrides the layout constants
        #[arg(long)]
        config: Option<String>,

        /// Indent the JSON
        #[arg(long)]
        pretty: bool,

        /// Write the layout here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the view types this workspace can show and the views it declares.
    Views {
        /// DSL file, `-` for stdin, or the document text itself
        #[arg(default_value = "-")]
        input: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Report every bad line; exits with status 1 if there is one.
    Validate {
        /// DSL file, `-` for stdin, or the document text itself
        #[arg(default_value = "-")]
        input: String,

        /// Report errors with their codes as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    layout: LayoutConfig,
}

#[derive(Debug, Serialize)]
struct ViewEntry {
    view_type: ViewType,
    label: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct DeclaredView {
    id: String,
    view_type: ViewType,
    element_id: String,
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct ViewsResult {
    available: Vec<ViewEntry>,
    declared: Vec<DeclaredView>,
}

/// Result of validating a document.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    workspace: String,
    element_count: usize,
    relationship_count: usize,
    view_count: usize,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
    line: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.logging.filter());

    match cli.command {
        Command::Parse {
            input,
            full,
            pretty,
        } => cmd_parse(&input, full, pretty),

        Command::Layout {
            input,
            view,
            config,
            pretty,
            output,
        } => cmd_layout(&input, view, config.as_deref(), pretty, output.as_deref()),

        Command::Views { input, json } => cmd_views(&input, json),

        Command::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

/// Anything that is neither `-` nor an existing file is the DSL itself.
fn load_input(input: &str) -> Result<String> {
    match input {
        "-" => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read DSL from stdin")?;
            Ok(source)
        }
        path if Path::new(path).is_file() => {
            std::fs::read_to_string(path).context(format!("Failed to read DSL file: {path}"))
        }
        text => Ok(text.to_string()),
    }
}

fn load_layout_config(path: Option<&str>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let text =
        std::fs::read_to_string(path).context(format!("Failed to read config file: {path}"))?;
    let config: CliConfig =
        toml::from_str(&text).context(format!("Invalid layout config in: {path}"))?;
    debug!("Loaded layout config from {path}");
    Ok(config.layout)
}

fn write_output(output: Option<&str>, json: &str) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, json).context(format!("Failed to write layout to {path}"))?;
        info!(%path, bytes = json.len(), "layout written");
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("Failed to write to stdout")
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(encoded)
}

fn parse_source(input: &str) -> Result<ParseResult> {
    let source = load_input(input)?;
    let start = Instant::now();
    let parsed = parse_guarded(&source);
    debug!(
        "Parsed {} elements, {} relationships in {:.2}ms",
        parsed.workspace.elements.len(),
        parsed.workspace.relationships.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    for error in &parsed.errors {
        warn!("{error}");
    }
    Ok(parsed)
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, full: bool, pretty: bool) -> Result<()> {
    let parsed = parse_source(input)?;

    let output = if full {
        to_json(&parsed, pretty)?
    } else if pretty {
        let value: serde_json::Value = serde_json::from_str(&parse_summary_json(&parsed))?;
        serde_json::to_string_pretty(&value)?
    } else {
        parse_summary_json(&parsed)
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: layout
// =============================================================================

fn cmd_layout(
    input: &str,
    view: ViewType,
    config_path: Option<&str>,
    pretty: bool,
    output: Option<&str>,
) -> Result<()> {
    let config = load_layout_config(config_path)?;
    let parsed = parse_source(input)?;

    let start = Instant::now();
    let layout = layout_view_with_config(&parsed.workspace, view, &config);
    info!(
        "Laid out {} view: {} nodes, {} edges in {:.2}ms",
        view.label(),
        layout.stats.node_count,
        layout.stats.edge_count,
        start.elapsed().as_secs_f64() * 1000.0
    );
    if layout.stats.fallback_components > 0 {
        info!(
            "{} components had no container in the view",
            layout.stats.fallback_components
        );
    }

    write_output(output, &to_json(&layout, pretty)?)
}

// =============================================================================
// Command: views
// =============================================================================

fn views_result(workspace: &Workspace) -> ViewsResult {
    ViewsResult {
        available: available_views(workspace)
            .into_iter()
            .map(|view_type| ViewEntry {
                view_type,
                label: view_type.label(),
                description: view_type.description(),
            })
            .collect(),
        declared: workspace
            .views
            .iter()
            .map(|view| DeclaredView {
                id: view.id.clone(),
                view_type: view.view_type,
                element_id: view.element_id.clone(),
                title: view.title.clone(),
            })
            .collect(),
    }
}

fn cmd_views(input: &str, json_output: bool) -> Result<()> {
    let parsed = parse_source(input)?;
    let result = views_result(&parsed.workspace);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.available.is_empty() {
        println!("No views available (workspace has no elements)");
    }
    for entry in &result.available {
        println!(
            "{:<14} {:<15} {}",
            entry.view_type.as_str(),
            entry.label,
            entry.description
        );
    }
    if !result.declared.is_empty() {
        println!("\nDeclared:");
        for view in &result.declared {
            match &view.title {
                Some(title) => println!("  {} \"{title}\"", view.id),
                None => println!("  {}", view.id),
            }
        }
    }

    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn validate_result(parsed: &ParseResult) -> ValidateResult {
    let errors: Vec<ValidationError> = parsed
        .errors
        .iter()
        .map(|error| ValidationError {
            code: error.code().as_str().to_string(),
            message: error.to_string(),
            line: error.line(),
        })
        .collect();

    ValidateResult {
        valid: errors.is_empty(),
        workspace: parsed.workspace.name.clone(),
        element_count: parsed.workspace.elements.len(),
        relationship_count: parsed.workspace.relationships.len(),
        view_count: parsed.workspace.views.len(),
        errors,
    }
}

fn cmd_validate(input: &str, json_output: bool) -> Result<()> {
    let parsed = parse_source(input)?;
    let result = validate_result(&parsed);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if result.valid {
            println!("✓ Valid workspace \"{}\"", result.workspace);
        } else {
            println!("✗ Invalid workspace");
        }

        println!("  Elements: {}", result.element_count);
        println!("  Relationships: {}", result.relationship_count);
        println!("  Views: {}", result.view_count);

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for err in &result.errors {
                println!("  [{}] {}", err.code, err.message);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}
