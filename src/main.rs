//! FlowCanvas CLI Entry Point
//!
//! Compiles a workflow document into a positioned graph and prints it.
//!
//! # Usage
//!
//! ```bash
//! # Preview a workflow
//! flowcanvas recon.yaml
//!
//! # Left-to-right layout without summaries
//! flowcanvas recon.yaml --orientation LR --no-details
//!
//! # Emit the render payload as JSON
//! flowcanvas recon.yaml --json --select fetch-subdomains
//! ```

use std::env;
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info, warn};

use flowcanvas::canvas::{CanvasGraph, CanvasSession, EdgeStyle};
use flowcanvas::config::load_view_options;
use flowcanvas::{load_document, validate_document, Orientation, ViewOptions, APP_NAME, VERSION};

/// Default workflow file used when none is specified.
const DEFAULT_WORKFLOW: &str = "workflow.yaml";

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    workflow_path: Option<String>,
    options_path: Option<String>,
    orientation: Option<Orientation>,
    no_details: bool,
    wrap: bool,
    hide_minimap: bool,
    select: Option<String>,
    json: bool,
    verbose: bool,
}

impl Config {
    fn workflow_path(&self) -> &str {
        self.workflow_path.as_deref().unwrap_or(DEFAULT_WORKFLOW)
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME.bold(), VERSION);
    println!("Workflow Graph Compiler and Layout Engine");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: flowcanvas [OPTIONS] <WORKFLOW_FILE>");
    println!();
    println!("Arguments:");
    println!("  <WORKFLOW_FILE>        Path to workflow YAML file (default: {})", DEFAULT_WORKFLOW);
    println!();
    println!("Options:");
    println!("  --orientation TB|LR    Layout direction (default: TB)");
    println!("  --options FILE         Load view options from a YAML file");
    println!("  --no-details           Hide node summary lines");
    println!("  --wrap                 Wrap long summary text");
    println!("  --hide-minimap         Hide the canvas minimap");
    println!("  --select ID            Mark a node as selected");
    println!("  --json                 Print the render payload as JSON");
    println!("  --verbose              Enable debug logging");
    println!("  --help                 Show this help message");
    println!("  --version              Show version information");
    println!();
    println!("Examples:");
    println!("  flowcanvas recon.yaml");
    println!("  flowcanvas recon.yaml --orientation LR --no-details");
    println!("  flowcanvas recon.yaml --json > canvas.json");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--no-details" => config.no_details = true,
            "--wrap" => config.wrap = true,
            "--hide-minimap" => config.hide_minimap = true,
            "--json" => config.json = true,
            "--verbose" | "-v" => config.verbose = true,
            "--orientation" | "--options" | "--select" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err(format!("{} requires an argument", arg));
                };
                match arg.as_str() {
                    "--orientation" => config.orientation = Some(value.parse()?),
                    "--options" => config.options_path = Some(value.clone()),
                    _ => config.select = Some(value.clone()),
                }
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if config.workflow_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                config.workflow_path = Some(arg.clone());
            }
        }
        i += 1;
    }

    Ok(config)
}

/// View options from the options file, overridden by flags.
fn resolve_view_options(config: &Config) -> Result<ViewOptions, Box<dyn std::error::Error>> {
    let mut options = match &config.options_path {
        Some(path) => load_view_options(path)?,
        None => ViewOptions::default(),
    };

    if let Some(orientation) = config.orientation {
        options.orientation = orientation;
    }
    if config.no_details {
        options.show_details = false;
    }
    if config.wrap {
        options.wrap_long_text = true;
    }
    if config.hide_minimap {
        options.hide_mini_map = true;
    }

    Ok(options)
}

/// Prints a colored, human-readable view of the canvas.
fn print_preview(canvas: &CanvasGraph) {
    println!("{}", "Nodes:".bold());
    for node in &canvas.nodes {
        let marker = if node.selected { "*".green().bold() } else { " ".normal() };
        println!(
            "{} {:<10} {:<28} ({:>7.1}, {:>7.1})",
            marker,
            format!("[{}]", node.node_type).cyan(),
            node.data.label,
            node.position.x,
            node.position.y
        );
        for line in &node.data.summary_lines {
            println!("      {}", line.dimmed());
        }
    }

    println!();
    println!("{}", "Edges:".bold());
    for edge in &canvas.edges {
        match (&edge.style, &edge.label) {
            (EdgeStyle::Branch, Some(label)) => println!(
                "  {} -> {} {}",
                edge.source,
                edge.target,
                format!("[{}]", label).yellow()
            ),
            (EdgeStyle::Branch, None) => {
                println!("  {} -> {} {}", edge.source, edge.target, "(branch)".yellow())
            }
            (EdgeStyle::Sequential, _) => println!("  {} -> {}", edge.source, edge.target),
        }
    }
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // JSON output stays clean on stdout
    setup_logging(config.verbose);
    if !config.json {
        print_banner();
    }

    let options = resolve_view_options(&config)?;
    info!("Orientation: {}", options.orientation);

    // Load workflow
    let path = config.workflow_path();
    let document = load_document(path).map_err(|e| {
        error!("Failed to load workflow: {}", e);
        format!("Could not load workflow from '{}': {}", path, e)
    })?;

    let problems = validate_document(&document);
    for problem in problems.iter().skip(1) {
        warn!("{}", problem);
    }

    // Compile and lay out
    let mut session = CanvasSession::new(options);
    session.update(&document)?;

    if let Some(id) = config.select.as_deref() {
        if session.canvas().node(id).is_none() {
            warn!("No node named '{}' to select", id);
        }
        session.select(Some(id));
    }

    if config.json {
        println!("{}", serde_json::to_string_pretty(session.canvas())?);
    } else {
        print_preview(session.canvas());
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("flowcanvas")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse_arguments(&args(&[])).unwrap();
        assert_eq!(config.workflow_path(), DEFAULT_WORKFLOW);
        assert!(!config.json);
        assert_eq!(config.orientation, None);
    }

    #[test]
    fn test_parse_flags() {
        let config = parse_arguments(&args(&[
            "recon.yaml",
            "--orientation",
            "lr",
            "--no-details",
            "--select",
            "scan",
            "--json",
        ]))
        .unwrap();

        assert_eq!(config.workflow_path(), "recon.yaml");
        assert_eq!(config.orientation, Some(Orientation::LeftToRight));
        assert!(config.no_details);
        assert_eq!(config.select.as_deref(), Some("scan"));
        assert!(config.json);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_arguments(&args(&["--orientation"])).is_err());
        assert!(parse_arguments(&args(&["--orientation", "up"])).is_err());
        assert!(parse_arguments(&args(&["--frobnicate"])).is_err());
        assert!(parse_arguments(&args(&["a.yaml", "b.yaml"])).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse_arguments(&args(&["--wrap", "--hide-minimap", "--orientation", "LR"])).unwrap();
        let options = resolve_view_options(&config).unwrap();
        assert!(options.wrap_long_text);
        assert!(options.hide_mini_map);
        assert!(options.show_details);
        assert_eq!(options.orientation, Orientation::LeftToRight);
    }
}
