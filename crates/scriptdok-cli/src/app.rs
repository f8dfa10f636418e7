//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, warn};

use scriptdok_ast::{RevisionColor, TextLine};
use scriptdok_core::format_eighths;
use scriptdok_import::{
    detect, ImportOutcome, JsonFileStore, ProgressEvent, RevisionRequest, RevisionTracker,
    SceneStore, ScratchArchive, ScriptImporter, SourceFormat,
};

use crate::settings::{Settings, CONFIG_FILE_NAME};

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "scriptdok")]
#[command(author, version, about = "Screenplay import and scene breakdown", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./scriptdok.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a screenplay and print its scenes
    Import {
        /// Input screenplay (FDX, OSF, Celtx, Fade In, HTML, PDF or text)
        input: PathBuf,

        /// Pre-extracted PDF lines (JSON array of positioned lines)
        #[arg(short, long)]
        lines: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Project store to commit the import into
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Revision name (defaults to "<Color> Revision")
        #[arg(short, long)]
        revision: Option<String>,

        /// Revision color (white, blue, pink, ...)
        #[arg(long)]
        color: Option<String>,

        /// Who is running the import
        #[arg(long)]
        imported_by: Option<String>,

        /// Do not record a revision
        #[arg(long)]
        no_track: bool,
    },

    /// Report the detected format of a file
    Detect {
        /// Input file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the revisions recorded in a project store
    Revisions {
        /// Project store (JSON)
        store: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Options of one import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub input: PathBuf,
    pub lines: Option<PathBuf>,
    pub format: OutputFormat,
    pub store: Option<PathBuf>,
    pub revision: Option<String>,
    pub color: Option<String>,
    pub imported_by: Option<String>,
    pub no_track: bool,
}

impl ImportOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_store(mut self, store: impl Into<PathBuf>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn with_lines(mut self, lines: impl Into<PathBuf>) -> Self {
        self.lines = Some(lines.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// A revision is recorded when importing into a store, or when a name
    /// or color is asked for, unless tracking is switched off
    fn tracks_revision(&self, settings: &Settings) -> bool {
        !self.no_track
            && settings.revision.track
            && (self.store.is_some() || self.revision.is_some() || self.color.is_some())
    }
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Import {
            input,
            lines,
            format,
            store,
            revision,
            color,
            imported_by,
            no_track,
        } => {
            let options = ImportOptions {
                input,
                lines,
                format,
                store,
                revision,
                color,
                imported_by,
                no_track,
            };
            import_command(&options, &settings)?;
        }
        Commands::Detect { input, format } => {
            detect_command(&input, format, &settings)?;
        }
        Commands::Revisions { store, format } => {
            revisions_command(&store, format)?;
        }
    }

    Ok(())
}

/// Load settings from an explicit path, or from `scriptdok.toml` when present
fn load_settings(config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::load(path)
        }
        None => Settings::load(Path::new(CONFIG_FILE_NAME)),
    }
}

/// Parse a revision color name
fn parse_color(name: &str) -> Result<RevisionColor> {
    match RevisionColor::from_name(name) {
        Some(color) => Ok(color),
        None => {
            let known: Vec<&str> = RevisionColor::PALETTE.iter().map(|c| c.name()).collect();
            anyhow::bail!(
                "Unknown revision color '{}' (expected one of: {})",
                name,
                known.join(", ")
            )
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Execute the import command
pub fn import_command(options: &ImportOptions, settings: &Settings) -> Result<ImportOutcome> {
    let input = &options.input;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let bytes =
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let file_name = file_name_of(input);

    let mut importer = ScriptImporter::new()
        .with_layout(settings.pdf.clone())
        .with_tracker(RevisionTracker::new(settings.revision.default_name.clone()));
    if let Some(root) = &settings.import.scratch_dir {
        importer = importer.with_scratch_root(root);
    }

    if let Some(lines_path) = &options.lines {
        let content = fs::read_to_string(lines_path)
            .with_context(|| format!("Failed to read lines file: {}", lines_path.display()))?;
        let lines: Vec<TextLine> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse lines file: {}", lines_path.display()))?;
        debug!("Loaded {} positioned lines", lines.len());
        importer = importer.with_line_source(lines);
    }

    if options.tracks_revision(settings) {
        let imported_by = options
            .imported_by
            .clone()
            .unwrap_or_else(|| settings.import.imported_by.clone());
        let mut request = RevisionRequest::new(imported_by);
        if let Some(name) = &options.revision {
            request = request.with_name(name.clone());
        }
        if let Some(color) = &options.color {
            request = request.with_color(parse_color(color)?);
        }
        importer = importer.track_revisions(request);
    } else if options.revision.is_some() || options.color.is_some() {
        warn!("Revision tracking is off; ignoring revision name and color");
    }

    let text_output = options.format == OutputFormat::Text;
    if text_output {
        println!("scriptdok v{}", scriptdok_import::VERSION);
        println!("Importing: {}", input.display());
    }
    let progress = |event: ProgressEvent| {
        if text_output {
            println!("  [{}] {}", event.stage.name(), event.status);
        }
    };

    let outcome = match &options.store {
        Some(store_path) => {
            let mut store = JsonFileStore::new(store_path);
            importer
                .import_into(&mut store, &bytes, &file_name, &progress)
                .with_context(|| {
                    format!(
                        "Failed to import {} into {}",
                        input.display(),
                        store_path.display()
                    )
                })?
        }
        None => importer
            .import(&bytes, &file_name, &progress)
            .with_context(|| format!("Failed to import {}", input.display()))?,
    };

    match options.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .context("Failed to serialize import to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_outcome(&outcome),
    }

    Ok(outcome)
}

fn print_outcome(outcome: &ImportOutcome) {
    println!();
    match &outcome.document {
        Some(entry) => println!(
            "Format: {} (from archive entry {}), strategy: {}",
            outcome.format, entry, outcome.strategy
        ),
        None => println!("Format: {}, strategy: {}", outcome.format, outcome.strategy),
    }
    println!("Confidence: {:.2}", outcome.confidence);
    println!();

    println!("{:>5}  {:<6}  {:>7}  HEADING", "#", "NUMBER", "LENGTH");
    for scene in outcome.drafts() {
        println!(
            "{:>5}  {:<6}  {:>7}  {}",
            scene.ordinal,
            scene.number,
            format_eighths(scene.page_length_eighths),
            scene.heading
        );
    }
    let total = u32::try_from(outcome.total_eighths()).unwrap_or(u32::MAX);
    println!();
    println!(
        "{} scene(s), {} page(s)",
        outcome.scenes.len(),
        format_eighths(total)
    );

    for diag in &outcome.warnings {
        println!();
        println!("{}", diag);
    }

    if let Some(revision) = &outcome.revision {
        println!();
        println!(
            "Revision: {} ({}) by {}",
            revision.revision_name, revision.color, revision.imported_by
        );
    }
}

/// Execute the detect command
pub fn detect_command(input: &Path, format: OutputFormat, settings: &Settings) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let file_name = file_name_of(input);

    let detection = detect(&bytes, &file_name)
        .with_context(|| format!("Failed to detect format: {}", input.display()))?;

    // For archives, report the document an import would read
    let inner = if detection.format == SourceFormat::Archive {
        let archive = ScratchArchive::extract(&bytes, settings.import.scratch_dir.as_deref())
            .with_context(|| format!("Failed to open archive: {}", input.display()))?;
        let (entry, document) = archive
            .script_document()
            .with_context(|| format!("Failed to locate script in: {}", input.display()))?;
        let inner = detect(&document, &entry)
            .with_context(|| format!("Failed to detect format of entry: {}", entry))?;
        Some((entry, inner.format))
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "file": file_name,
                "format": detection.format,
                "document": inner.as_ref().map(|(entry, _)| entry),
                "document_format": inner.as_ref().map(|(_, format)| format),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => match inner {
            Some((entry, inner_format)) => {
                println!("{}: {} ({}: {})", file_name, detection.format, entry, inner_format)
            }
            None => println!("{}: {}", file_name, detection.format),
        },
    }

    Ok(())
}

/// Execute the revisions command
pub fn revisions_command(store_path: &Path, format: OutputFormat) -> Result<()> {
    if !store_path.exists() {
        anyhow::bail!("Store not found: {}", store_path.display());
    }
    let store = JsonFileStore::new(store_path);
    let revisions = store
        .revisions()
        .with_context(|| format!("Failed to read store: {}", store_path.display()))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&revisions)
                .context("Failed to serialize revisions to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if revisions.is_empty() {
                println!("No revisions recorded in {}", store_path.display());
            }
            for revision in &revisions {
                println!(
                    "{}  {:<10} {:<24} {:>4} scene(s) {:>7.3} page(s)  {} by {}",
                    revision.timestamp.format("%Y-%m-%d %H:%M"),
                    revision.color.name(),
                    revision.revision_name,
                    revision.scene_count,
                    revision.page_count,
                    revision.file_name,
                    revision.imported_by
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_import() {
        let args = vec![
            "scriptdok",
            "import",
            "pilot.fdx",
            "--store",
            "project.json",
            "--color",
            "blue",
            "--imported-by",
            "editor",
            "--format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Import {
                input,
                store,
                color,
                imported_by,
                format,
                no_track,
                ..
            } => {
                assert_eq!(input, PathBuf::from("pilot.fdx"));
                assert_eq!(store, Some(PathBuf::from("project.json")));
                assert_eq!(color.as_deref(), Some("blue"));
                assert_eq!(imported_by.as_deref(), Some("editor"));
                assert_eq!(format, OutputFormat::Json);
                assert!(!no_track);
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_cli_parse_import_defaults() {
        let args = vec!["scriptdok", "import", "pilot.pdf", "--lines", "lines.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);

        match cli.command {
            Commands::Import {
                lines,
                format,
                store,
                revision,
                ..
            } => {
                assert_eq!(lines, Some(PathBuf::from("lines.json")));
                assert_eq!(format, OutputFormat::Text);
                assert!(store.is_none());
                assert!(revision.is_none());
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let args = vec![
            "scriptdok",
            "import",
            "pilot.fdx",
            "--no-track",
            "--verbose",
            "--config",
            "custom.toml",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Import { no_track, .. } => assert!(no_track),
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_cli_parse_detect() {
        let args = vec!["scriptdok", "detect", "pilot.celtx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Detect { input, format } => {
                assert_eq!(input, PathBuf::from("pilot.celtx"));
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_cli_parse_revisions() {
        let args = vec!["scriptdok", "revisions", "project.json", "-f", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Revisions { store, format } => {
                assert_eq!(store, PathBuf::from("project.json"));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("Expected Revisions command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let args = vec!["scriptdok", "import", "pilot.fdx", "--format", "xml"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("Goldenrod").unwrap(), RevisionColor::Goldenrod);
        let err = parse_color("mauve").unwrap_err();
        assert!(err.to_string().contains("White"));
    }

    #[test]
    fn test_revision_tracking_rules() {
        let settings = Settings::default();
        assert!(!ImportOptions::new("a.fdx").tracks_revision(&settings));
        assert!(ImportOptions::new("a.fdx")
            .with_store("p.json")
            .tracks_revision(&settings));
        assert!(ImportOptions::new("a.fdx")
            .with_color("blue")
            .tracks_revision(&settings));

        let mut off = ImportOptions::new("a.fdx").with_store("p.json");
        off.no_track = true;
        assert!(!off.tracks_revision(&settings));

        let mut settings = Settings::default();
        settings.revision.track = false;
        assert!(!ImportOptions::new("a.fdx")
            .with_store("p.json")
            .tracks_revision(&settings));
    }
}
