//! Display surfaces
//!
//! A surface is addressed by field identifiers (feed column keys, total
//! fields, clock fields). It receives finished strings and flags only.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::{Table, Tabled};

/// Somewhere the board is shown
pub trait DisplaySurface: Send + Sync {
    /// Replace a field's text
    fn set_text(&self, field: &str, text: &str);

    /// Replace a field with separately rendered labels
    fn set_labels(&self, field: &str, parts: &[String]);

    /// Turn a named flag (e.g. `winner`) on or off for a field
    fn set_flag(&self, field: &str, flag: &str, on: bool);

    /// Called after a batch of updates
    fn flush(&self) {}
}

/// Field-keyed in-memory surface
#[derive(Debug, Default)]
pub struct MemorySurface {
    texts: DashMap<String, String>,
    labels: DashMap<String, Vec<String>>,
    flags: DashMap<String, BTreeSet<String>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.texts.get(field).map(|v| v.value().clone())
    }

    pub fn labels(&self, field: &str) -> Option<Vec<String>> {
        self.labels.get(field).map(|v| v.value().clone())
    }

    pub fn has_flag(&self, field: &str, flag: &str) -> bool {
        self.flags
            .get(field)
            .map(|flags| flags.contains(flag))
            .unwrap_or(false)
    }

    /// All fields with their current single-line text, sorted by field
    pub fn rows(&self) -> Vec<FieldRow> {
        let mut rows: Vec<FieldRow> = self
            .texts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .chain(
                self.labels
                    .iter()
                    .map(|entry| (entry.key().clone(), entry.value().join(", "))),
            )
            .map(|(field, value)| {
                let flags = self
                    .flags
                    .get(&field)
                    .map(|f| f.iter().cloned().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                FieldRow { field, value, flags }
            })
            .collect();
        rows.sort_by(|a, b| a.field.cmp(&b.field));
        rows
    }
}

impl DisplaySurface for MemorySurface {
    fn set_text(&self, field: &str, text: &str) {
        self.labels.remove(field);
        self.texts.insert(field.to_string(), text.to_string());
    }

    fn set_labels(&self, field: &str, parts: &[String]) {
        self.texts.remove(field);
        self.labels.insert(field.to_string(), parts.to_vec());
    }

    fn set_flag(&self, field: &str, flag: &str, on: bool) {
        let mut flags = self.flags.entry(field.to_string()).or_default();
        if on {
            flags.insert(flag.to_string());
        } else {
            flags.remove(flag);
        }
    }
}

/// One rendered field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct FieldRow {
    pub field: String,
    pub value: String,
    pub flags: String,
}

/// Terminal surface: redraws the whole field table on every flush
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    fields: MemorySurface,
    clear_screen: bool,
}

impl ConsoleSurface {
    pub fn new(clear_screen: bool) -> Self {
        Self {
            fields: MemorySurface::new(),
            clear_screen,
        }
    }

    pub fn render(&self) -> String {
        Table::new(self.fields.rows()).to_string()
    }
}

impl DisplaySurface for ConsoleSurface {
    fn set_text(&self, field: &str, text: &str) {
        self.fields.set_text(field, text);
    }

    fn set_labels(&self, field: &str, parts: &[String]) {
        self.fields.set_labels(field, parts);
    }

    fn set_flag(&self, field: &str, flag: &str, on: bool) {
        self.fields.set_flag(field, flag, on);
    }

    fn flush(&self) {
        if self.clear_screen {
            // ANSI clear + home
            print!("\x1b[2J\x1b[H");
        }
        println!("{}", self.render());
    }
}
