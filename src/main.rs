//! HiFi Exporter CLI
//!
//! Command-line front end: export scene nodes to FBX files plus a JSON
//! entity manifest, inspect scene files, and preview manifests.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use hifi_core::Prompt;
use hifi_export::logging::{self, TracingConfig};
use hifi_export::paths::{self, DEFAULT_MANIFEST_NAME};
use hifi_export::{
    preview_manifest, ExportError, ExportOutcome, ExportPolicy, ExportSession, ExporterConfig,
    FbxAsciiWriter, FixedPaths, ManifestOptions, ProjectLayout,
};
use hifi_scene::{NodeId, Resolved, SceneDescription, SceneForest, Selection, SelectionResolver};

/// HiFi Exporter - export scene nodes to FBX models and an entity manifest
#[derive(Parser)]
#[command(name = "hifi-export")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export selected nodes to FBX files and write the manifest
    Export(ExportArgs),

    /// Show the node hierarchy of a scene file
    Inspect(InspectArgs),

    /// Print the manifest an export would write, without writing files
    Manifest(ManifestArgs),
}

/// Options shared by commands that work on a selection
#[derive(Args)]
struct SelectionArgs {
    /// Scene description file (.yaml, .yml or .json)
    #[arg(short, long)]
    scene: PathBuf,

    /// Exporter config file (.yaml, .yml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// The project's Assets directory
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Export mode: single (children embedded) or separate (one file per node)
    #[arg(short, long)]
    mode: Option<ExportPolicy>,

    /// Node name, name path or glob to select (can be repeated)
    #[arg(long = "select")]
    select: Vec<String>,

    /// Model folder; must lie inside the Assets directory
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Answer yes to confirmation questions
    #[arg(short, long)]
    yes: bool,

    /// Pretty-print the manifest
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Manifest file, relative to the project root unless absolute
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Copy materials next to the exported models
    #[arg(long)]
    copy_materials: bool,

    /// Copy textures as well
    #[arg(long)]
    copy_textures: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Scene description file (.yaml, .yml or .json)
    #[arg(short, long)]
    scene: PathBuf,
}

#[derive(Args)]
struct ManifestArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

/// Prompt on the terminal, or answer yes without asking
struct TerminalPrompt {
    assume_yes: bool,
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            debug!(title, "Confirmed by --yes");
            return true;
        }

        eprint!("{}: {} [y/N] ", title, message);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&self, title: &str, message: &str) {
        eprintln!("[{}] {}", title, message);
    }
}

fn setup_logging(verbosity: u8) {
    logging::init_with_config(TracingConfig {
        show_target: verbosity >= 2,
        show_thread_ids: verbosity >= 3,
        ..TracingConfig::for_verbosity(verbosity)
    });
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => cmd_export(args, cli.format),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
        Commands::Manifest(args) => cmd_manifest(args),
    }
}

/// Config file values with command-line overrides applied
fn load_settings(args: &SelectionArgs) -> Result<ExporterConfig> {
    let mut config = match &args.config {
        Some(path) => ExporterConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExporterConfig::default(),
    };

    if let Some(data_path) = &args.data_path {
        config.data_path = Some(data_path.clone());
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(folder) = &args.folder {
        config.folder = Some(paths::to_slash(folder));
    }
    config.pretty |= args.pretty;
    Ok(config)
}

fn load_layout(config: &ExporterConfig) -> Result<ProjectLayout> {
    let Some(data_path) = &config.data_path else {
        bail!("No Assets directory given; pass --data-path or set data_path in the config");
    };
    Ok(ProjectLayout::new(data_path)?)
}

fn load_scene(path: &Path) -> Result<SceneForest> {
    SceneForest::load(path).with_context(|| format!("Failed to load scene {}", path.display()))
}

fn cmd_export(args: ExportArgs, format: OutputFormat) -> Result<()> {
    let mut config = load_settings(&args.selection)?;
    if let Some(manifest) = &args.manifest {
        config.manifest = Some(manifest.clone());
    }
    config.export.copy_materials |= args.copy_materials;
    config.export.copy_textures |= args.copy_textures;

    let layout = load_layout(&config)?;
    let mut scene = load_scene(&args.selection.scene)?;
    let selection = Selection::from_tokens(&scene, &args.selection.select);

    let chooser = FixedPaths {
        folder: Some(
            config
                .folder
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| layout.data_path().to_path_buf()),
        ),
        file: Some(
            config
                .manifest
                .clone()
                .unwrap_or_else(|| PathBuf::from(paths::ASSETS_DIR).join(DEFAULT_MANIFEST_NAME)),
        ),
    };
    let prompt = TerminalPrompt {
        assume_yes: args.selection.yes,
    };
    let mut writer = FbxAsciiWriter::new();

    info!(mode = %config.mode, scene = %args.selection.scene.display(), "Exporting");
    let outcome = ExportSession::new(layout, &prompt, &chooser, &mut writer)
        .with_options(config.export.clone())
        .with_manifest_options(config.manifest_options())
        .run(&mut scene, &selection, config.mode);

    let report = match outcome {
        Ok(ExportOutcome::Completed(report)) => report,
        Ok(ExportOutcome::Cancelled) => {
            println!("Export cancelled");
            return Ok(());
        }
        Err(ExportError::InvalidSelection { item }) => {
            bail!("'{}' does not name a node in the scene", item)
        }
        Err(e) => return Err(e).context("Export failed"),
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "mode": report.policy.to_string(),
                "folder": report.folder,
                "manifest": report.manifest_path,
                "exported": report.exported,
                "failed": report.failed,
                "entities": report.manifest.len(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Exported {} model(s) to {}", report.exported_count(), report.folder);
            for path in &report.exported {
                println!("  {}", path.display());
            }
            if !report.failed.is_empty() {
                println!("Failed: {}", report.failed.join(", "));
            }
            println!(
                "Manifest: {} ({} entities)",
                report.manifest_path.display(),
                report.manifest.len()
            );
        }
    }

    if report.failed_count() > 0 {
        warn!(failed = report.failed_count(), "Some models could not be exported");
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let scene = load_scene(&args.scene)?;

    match format {
        OutputFormat::Json => {
            let description = SceneDescription::from_forest(&scene);
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        OutputFormat::Text => {
            println!("Scene: {}", args.scene.display());
            println!("  Nodes:  {}", scene.len());
            println!("  Roots:  {}", scene.roots().len());
            println!("  Active: {}", scene.active_nodes().len());
            println!();
            for root in scene.roots() {
                print_node(&scene, root, 0)?;
            }
        }
    }

    Ok(())
}

fn print_node(scene: &SceneForest, id: NodeId, depth: usize) -> Result<()> {
    let node = scene.node(id)?;
    let mut tags = Vec::new();
    if node.has_mesh() {
        tags.push("mesh");
    }
    if node.components.renderer.is_some() {
        tags.push("renderer");
    }
    if node.components.collider.is_some() {
        tags.push("collider");
    }
    if node.has_light() {
        tags.push("light");
    }
    if node.has_camera() {
        tags.push("camera");
    }
    if !node.active {
        tags.push("inactive");
    }

    let position = scene.world_position(id)?;
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };
    println!(
        "{}{}{}  ({:.3}, {:.3}, {:.3})",
        "  ".repeat(depth),
        node.name,
        tags,
        position.x,
        position.y,
        position.z
    );

    for child in node.children() {
        print_node(scene, *child, depth + 1)?;
    }
    Ok(())
}

fn cmd_manifest(args: ManifestArgs) -> Result<()> {
    let config = load_settings(&args.selection)?;
    let layout = load_layout(&config)?;
    let scene = load_scene(&args.selection.scene)?;
    let selection = Selection::from_tokens(&scene, &args.selection.select);
    let prompt = TerminalPrompt {
        assume_yes: args.selection.yes,
    };

    let nodes = match SelectionResolver::new(&scene, &prompt).resolve(&selection)? {
        Resolved::Nodes(nodes) => nodes,
        Resolved::Cancelled => {
            println!("Cancelled");
            return Ok(());
        }
    };

    let folder = config
        .folder
        .as_deref()
        .and_then(paths::asset_relative)
        .unwrap_or_else(|| paths::ASSETS_DIR.to_string());
    let locator = layout.locator(folder);

    let manifest = preview_manifest(&scene, &nodes, config.mode, &locator)?;
    let options = ManifestOptions {
        pretty: config.pretty,
    };
    println!("{}", manifest.to_json_string(&options)?);
    Ok(())
}
