//! Terminal styling for usertag output.

use comfy_table::{Cell, Color};
use console::Style;

use usertag_core::identity::FullUsername;

pub fn success(msg: &str) -> String {
    format!("{} {}", Style::new().green().apply_to("✓"), msg)
}

pub fn error(msg: &str) -> String {
    format!("{} {}", Style::new().red().apply_to("✗"), msg)
}

pub fn warn(msg: &str) -> String {
    format!("{} {}", Style::new().yellow().apply_to("⚠"), msg)
}

pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// The administrator account as printed by `usertag resolve`.
pub fn administrator(name: &str) -> String {
    format!("{} {}", name, dim("(administrator)"))
}

/// Health of one cached `key -> full username` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Ok,
    /// Well-formed, but the base segment is not the key it is stored under.
    WrongBase,
    Malformed,
}

impl EntryStatus {
    pub fn of(key: &str, full: &str) -> Self {
        match FullUsername::parse(full) {
            Ok(u) if u.has_base(key) => EntryStatus::Ok,
            Ok(_) => EntryStatus::WrongBase,
            Err(_) => EntryStatus::Malformed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryStatus::Ok => "✓ ok",
            EntryStatus::WrongBase => "✗ wrong base",
            EntryStatus::Malformed => "✗ malformed",
        }
    }

    /// Table cell for the `list` status column.
    pub fn cell(self) -> Cell {
        let color = match self {
            EntryStatus::Ok => Color::Green,
            EntryStatus::WrongBase | EntryStatus::Malformed => Color::Red,
        };
        Cell::new(self.label()).fg(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_status() {
        assert_eq!(EntryStatus::of("alice", "alice#7421"), EntryStatus::Ok);
        assert_eq!(EntryStatus::of("alice", "Alice#7421"), EntryStatus::Ok);
        assert_eq!(EntryStatus::of("alice", "bob#1111"), EntryStatus::WrongBase);
        assert_eq!(EntryStatus::of("alice", "alice"), EntryStatus::Malformed);
        assert_eq!(EntryStatus::of("alice", "a#b#c"), EntryStatus::Malformed);
    }

    #[test]
    fn test_entry_status_labels() {
        assert_eq!(EntryStatus::Ok.label(), "✓ ok");
        assert_eq!(EntryStatus::WrongBase.label(), "✗ wrong base");
        assert_eq!(EntryStatus::Malformed.label(), "✗ malformed");
    }

    #[test]
    fn test_administrator_label() {
        let label = administrator("root");
        assert!(label.starts_with("root "));
        assert!(label.contains("(administrator)"));
    }
}
