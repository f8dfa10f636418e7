//! Page geometry for layout classification

use serde::{Deserialize, Serialize};

/// Standard screenplay indent columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Action,
    Dialogue,
    Parenthetical,
    Character,
    Transition,
}

/// Indent columns and page bands, in points.
///
/// Defaults describe a US Letter page set in 12pt Courier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub action_indent: f32,
    pub dialogue_indent: f32,
    pub parenthetical_indent: f32,
    pub character_indent: f32,
    pub transition_indent: f32,
    /// How far a line may sit from a column and still be on it
    pub indent_tolerance: f32,
    pub page_height: f32,
    /// Height of the header and footer bands where page numbers live
    pub margin_band: f32,
    /// Largest vertical gap between lines of one paragraph
    pub max_line_gap: f32,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            action_indent: 108.0,
            dialogue_indent: 180.0,
            parenthetical_indent: 223.0,
            character_indent: 266.0,
            transition_indent: 396.0,
            indent_tolerance: 18.0,
            page_height: 792.0,
            margin_band: 54.0,
            max_line_gap: 16.0,
        }
    }
}

impl ColumnLayout {
    /// Indent of a column
    pub fn indent(&self, column: Column) -> f32 {
        match column {
            Column::Action => self.action_indent,
            Column::Dialogue => self.dialogue_indent,
            Column::Parenthetical => self.parenthetical_indent,
            Column::Character => self.character_indent,
            Column::Transition => self.transition_indent,
        }
    }

    /// Whether an indent sits on the column, within tolerance
    pub fn is_at(&self, indent: f32, column: Column) -> bool {
        (indent - self.indent(column)).abs() <= self.indent_tolerance
    }

    /// Whether a vertical position falls in the header or footer band
    pub fn in_margin(&self, y: f32) -> bool {
        y <= self.margin_band || y >= self.page_height - self.margin_band
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_with_tolerance() {
        let layout = ColumnLayout::default();
        assert!(layout.is_at(266.0, Column::Character));
        assert!(layout.is_at(252.0, Column::Character));
        assert!(!layout.is_at(223.0, Column::Character));
        assert!(layout.is_at(190.0, Column::Dialogue));
        assert!(!layout.is_at(223.0, Column::Dialogue));
    }

    #[test]
    fn test_margin_bands() {
        let layout = ColumnLayout::default();
        assert!(layout.in_margin(36.0));
        assert!(layout.in_margin(760.0));
        assert!(!layout.in_margin(400.0));
    }

    #[test]
    fn test_partial_layout_uses_defaults() {
        let layout: ColumnLayout = serde_json::from_str(r#"{"character_indent": 252.0}"#).unwrap();
        assert_eq!(layout.character_indent, 252.0);
        assert_eq!(layout.dialogue_indent, 180.0);
    }
}
