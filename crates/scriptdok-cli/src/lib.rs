//! scriptdok CLI - Command-line interface library
//!
//! This library provides the CLI functionality for scriptdok:
//! - Import: Parse a screenplay into scenes, optionally into a project store
//! - Detect: Report the detected source format
//! - Revisions: List the revisions recorded in a project store
//!
//! # Library Usage
//!
//! ```ignore
//! use scriptdok_cli::{import_command, ImportOptions, OutputFormat, Settings};
//!
//! let options = ImportOptions::new("pilot.fdx").with_format(OutputFormat::Json);
//! import_command(&options, &Settings::default())?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Import a Final Draft file and print its scenes
//! scriptdok import pilot.fdx
//!
//! # Import into a project, recording a Blue revision
//! scriptdok import pilot.fdx --store project.json --color blue
//!
//! # Import a PDF from lines extracted by another tool
//! scriptdok import pilot.pdf --lines pilot-lines.json --format json
//! ```

pub mod app;
pub mod settings;

pub use app::{detect_command, import_command, revisions_command};
pub use app::{run_cli, ImportOptions, OutputFormat};
pub use settings::{ImportSettings, RevisionSettings, Settings, CONFIG_FILE_NAME};
