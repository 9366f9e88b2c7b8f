use serde::{Deserialize, Serialize};

use super::cell::NumericCell;

/// Which of the two competing parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scored comparison between the two parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCategory {
    /// Stable identifier, used for the points label field
    pub id: String,
    /// Human readable name
    #[serde(default)]
    pub label: String,
    /// Feed column holding the left party's value
    pub left_key: String,
    /// Feed column holding the right party's value
    pub right_key: String,
    /// Points awarded to the strict winner
    pub points: u32,
    /// Render both values as money (two fractional digits)
    #[serde(default)]
    pub currency: bool,
}

impl ScoreCategory {
    pub fn new(id: &str, left_key: &str, right_key: &str, points: u32) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            left_key: left_key.to_string(),
            right_key: right_key.to_string(),
            points,
            currency: false,
        }
    }

    pub fn with_currency(mut self, currency: bool) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn key(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_key,
            Side::Right => &self.right_key,
        }
    }
}

/// Per-category result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Left,
    Right,
    Neither,
}

impl Winner {
    pub fn side(&self) -> Option<Side> {
        match self {
            Winner::Left => Some(Side::Left),
            Winner::Right => Some(Side::Right),
            Winner::Neither => None,
        }
    }

    pub fn is(&self, side: Side) -> bool {
        self.side() == Some(side)
    }
}

/// A category evaluated against one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    pub id: String,
    pub label: String,
    pub left_key: String,
    pub right_key: String,
    pub left: NumericCell,
    pub right: NumericCell,
    pub winner: Winner,
    pub points: u32,
}

impl CategoryResult {
    pub fn cell(&self, side: Side) -> &NumericCell {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Points this category contributes to `side`
    pub fn points_for(&self, side: Side) -> u32 {
        if self.winner.is(side) {
            self.points
        } else {
            0
        }
    }
}

/// Point totals for both parties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateTotals {
    pub left: u32,
    pub right: u32,
}

impl AggregateTotals {
    pub fn new(left: u32, right: u32) -> Self {
        Self { left, right }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Everything derived from one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub categories: Vec<CategoryResult>,
    /// Feed columns no category references, normalized for display
    pub extras: Vec<(String, NumericCell)>,
    pub totals: AggregateTotals,
}

impl Scoreboard {
    pub fn category(&self, id: &str) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn numeric(v: rust_decimal::Decimal) -> NumericCell {
        NumericCell::Numeric {
            display: v.to_string(),
            value: v.into(),
        }
    }

    #[test]
    fn test_points_for_winner_only() {
        let result = CategoryResult {
            id: "donors".into(),
            label: "Most donors".into(),
            left_key: "donorsUVA".into(),
            right_key: "donorsTech".into(),
            left: numeric(dec!(10)),
            right: numeric(dec!(5)),
            winner: Winner::Left,
            points: 3,
        };

        assert_eq!(result.points_for(Side::Left), 3);
        assert_eq!(result.points_for(Side::Right), 0);
        assert_eq!(result.cell(Side::Right).value(), Some(dec!(5).into()));
    }

    #[test]
    fn test_neither_has_no_side() {
        assert_eq!(Winner::Neither.side(), None);
        assert!(!Winner::Neither.is(Side::Left));
        assert!(Winner::Right.is(Side::Right));
    }

    #[test]
    fn test_category_key_lookup() {
        let category =
            ScoreCategory::new("raised", "raisedUVA", "raisedTech", 5).with_currency(true);
        assert_eq!(category.key(Side::Left), "raisedUVA");
        assert_eq!(category.key(Side::Right), "raisedTech");
        assert!(category.currency);
    }
}
