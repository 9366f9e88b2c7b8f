use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// Parsed numeric value.
///
/// Values inside `Decimal`'s range are exact. Larger or smaller magnitudes
/// are kept as a finite `f64`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Exact(Decimal),
    Wide(f64),
}

impl Amount {
    /// `None` for NaN and infinities
    pub fn wide(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        if value == 0.0 {
            return Some(Amount::Exact(Decimal::ZERO));
        }
        Some(Amount::Wide(value))
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Amount::Exact(value) => value.to_f64().unwrap_or_default(),
            Amount::Wide(value) => value,
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Exact(value)
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Amount::Exact(a), Amount::Exact(b)) => a.cmp(b),
            _ => self.to_f64().total_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// Wide values are finite and never negative zero
impl Eq for Amount {}

/// A raw feed value after normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericCell {
    /// Parsed as a finite number
    Numeric {
        /// Grouped display form, e.g. `1,000.00`
        display: String,
        /// Parsed value used for comparisons
        value: Amount,
    },
    /// Not a number; the comma-separated parts, trimmed
    MultiLabel { parts: Vec<String> },
}

impl NumericCell {
    pub fn is_numeric(&self) -> bool {
        matches!(self, NumericCell::Numeric { .. })
    }

    /// Numeric interpretation, if any
    pub fn value(&self) -> Option<Amount> {
        match self {
            NumericCell::Numeric { value, .. } => Some(*value),
            NumericCell::MultiLabel { .. } => None,
        }
    }

    /// Single-line text for surfaces that cannot show separate labels
    pub fn display_text(&self) -> String {
        match self {
            NumericCell::Numeric { display, .. } => display.clone(),
            NumericCell::MultiLabel { parts } => parts.join(", "),
        }
    }
}

impl std::fmt::Display for NumericCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_text())
    }
}
