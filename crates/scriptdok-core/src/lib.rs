//! scriptdok-core - Shared screenplay grammar
//!
//! Every scriptdok import path runs its headings and page lengths through
//! this crate, so the same heading yields the same components whatever
//! format it was read from.
//!
//! # Example
//!
//! ```
//! use scriptdok_core::{format_eighths, parse_eighths, parse_heading_components};
//!
//! let heading = parse_heading_components("12 EXT. PARK - NIGHT");
//! assert_eq!(heading.as_tuple(), ("EXT", "PARK", "NIGHT"));
//!
//! assert_eq!(parse_eighths("1 3/8"), 11);
//! assert_eq!(format_eighths(11), "1 3/8");
//! ```

pub mod diagnostics;
pub mod eighths;
pub mod heading;

pub use diagnostics::{Diagnostic, Location, Severity};
pub use eighths::{format_eighths, pages_from_eighths, parse_eighths, EIGHTHS_PER_PAGE};
pub use heading::{
    has_struck_text, is_scene_heading, leading_scene_number, parse_heading_components,
    split_scene_number, visible_text, HeadingComponents, STRIKE_CLOSE, STRIKE_OPEN,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
