//! Scene heading grammar
//!
//! Every import path normalizes its headings through this module, so a
//! heading read from XML, HTML, PDF or plain text yields the same
//! `(location type, location, time of day)` triple.
//!
//! ```text
//! [scene number] PREFIX location - time of day
//!  12             EXT.   PARK     - NIGHT
//! ```

use std::sync::OnceLock;

use regex::Regex;
use scriptdok_ast::LocationType;

/// Opens a struck-through (deleted) span inside heading or body text
pub const STRIKE_OPEN: &str = "\u{27E6}";
/// Closes a struck-through span
pub const STRIKE_CLOSE: &str = "\u{27E7}";

/// The parts of a scene heading
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeadingComponents {
    pub location_type: Option<LocationType>,
    pub location: String,
    pub time_of_day: String,
}

impl HeadingComponents {
    /// The components as `(type label, location, time of day)`; the type
    /// label is empty when the heading had no INT/EXT prefix
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (
            self.location_type.map(LocationType::as_str).unwrap_or(""),
            &self.location,
            &self.time_of_day,
        )
    }
}

fn scene_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*#?(\d+[A-Za-z]{0,2})(?:\.\s*|:\s*|\s+)").expect("valid scene number regex")
    })
}

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(INT\.?\s*/\s*EXT|EXT\.?\s*/\s*INT|I\s*/\s*E|E\s*/\s*I|INT|EXT)(?:\.\s*|\s+|$)",
        )
        .expect("valid heading prefix regex")
    })
}

/// Remove struck-through spans, sentinels included.
///
/// An unterminated span runs to the end of the text.
pub fn visible_text(text: &str) -> String {
    if !text.contains(STRIKE_OPEN) {
        return text.replace(STRIKE_CLOSE, "");
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(STRIKE_OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + STRIKE_OPEN.len()..];
        match after.find(STRIKE_CLOSE) {
            Some(end) => rest = &after[end + STRIKE_CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the text carries a struck-through span
pub fn has_struck_text(text: &str) -> bool {
    text.contains(STRIKE_OPEN)
}

/// Split a leading bare scene-number token ("12", "12A", "#12", "12.")
/// from the heading. The token is only split off when something follows it.
pub fn split_scene_number(heading: &str) -> (Option<String>, &str) {
    if let Some(caps) = scene_number_re().captures(heading) {
        let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let rest = &heading[whole..];
        if !rest.trim().is_empty() {
            return (caps.get(1).map(|m| m.as_str().to_string()), rest);
        }
    }
    (None, heading)
}

/// The leading scene number of a heading, if it has one
pub fn leading_scene_number(heading: &str) -> Option<String> {
    split_scene_number(&visible_text(heading)).0
}

/// Split a recognized INT/EXT prefix from the heading
fn split_prefix(heading: &str) -> (Option<LocationType>, &str) {
    let Some(caps) = prefix_re().captures(heading) else {
        return (None, heading);
    };
    let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
    let prefix: String = caps
        .get(1)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '/')
        .flat_map(char::to_uppercase)
        .collect();

    let location_type = match prefix.as_str() {
        "INT" => LocationType::Int,
        "EXT" => LocationType::Ext,
        _ => LocationType::IntExt,
    };
    (Some(location_type), &heading[whole..])
}

/// Whether a line reads as a scene heading: an optional scene number, a
/// known INT/EXT prefix and something after the prefix.
pub fn is_scene_heading(line: &str) -> bool {
    let (_, rest) = split_scene_number(line.trim());
    match split_prefix(rest) {
        (Some(_), remainder) => !remainder.trim().is_empty(),
        (None, _) => false,
    }
}

/// Break a heading into location type, location and time of day.
///
/// Struck text and a leading scene number are ignored. The remainder after
/// the prefix is split on its final `" - "`: everything before is the
/// location, everything after is the time of day.
pub fn parse_heading_components(heading: &str) -> HeadingComponents {
    let visible = visible_text(heading);
    let (_, rest) = split_scene_number(visible.trim());
    let (location_type, rest) = split_prefix(rest.trim_start());
    let rest = rest.trim();

    let split = [" - ", " \u{2013} ", " \u{2014} "]
        .iter()
        .filter_map(|sep| rest.rfind(sep).map(|pos| (pos, sep.len())))
        .max_by_key(|(pos, _)| *pos);

    let (location, time_of_day) = match split {
        Some((pos, len)) => (&rest[..pos], &rest[pos + len..]),
        None => (rest, ""),
    };

    HeadingComponents {
        location_type,
        location: location.trim().trim_end_matches('-').trim().to_string(),
        time_of_day: time_of_day.trim().to_string(),
    }
}
