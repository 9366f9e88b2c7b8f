//! Per-category winners and point totals for one snapshot.

use std::collections::HashSet;

use crate::domain::{
    AggregateTotals, CategoryResult, NumericCell, RawRecord, ScoreCategory, Scoreboard, Side,
    Winner,
};

use super::number::normalize;

/// Evaluate every category against `record`.
///
/// Totals are built from scratch on each call. A category awards points only
/// when both sides are numeric and strictly different.
pub fn aggregate(record: &RawRecord, categories: &[ScoreCategory]) -> Scoreboard {
    let mut totals = AggregateTotals::default();
    let mut results = Vec::with_capacity(categories.len());

    for category in categories {
        let result = evaluate(record, category);
        totals.left += result.points_for(Side::Left);
        totals.right += result.points_for(Side::Right);
        results.push(result);
    }

    let referenced: HashSet<&str> = categories
        .iter()
        .flat_map(|c| [c.left_key.as_str(), c.right_key.as_str()])
        .collect();
    let extras = record
        .iter()
        .filter(|(key, _)| !referenced.contains(key))
        .map(|(key, value)| (key.to_string(), normalize(value, false)))
        .collect();

    Scoreboard {
        categories: results,
        extras,
        totals,
    }
}

/// Evaluate a single category
pub fn evaluate(record: &RawRecord, category: &ScoreCategory) -> CategoryResult {
    let left = normalize(record.get(&category.left_key).unwrap_or(""), category.currency);
    let right = normalize(record.get(&category.right_key).unwrap_or(""), category.currency);
    let winner = decide_winner(&left, &right);

    CategoryResult {
        id: category.id.clone(),
        label: category.label.clone(),
        left_key: category.left_key.clone(),
        right_key: category.right_key.clone(),
        left,
        right,
        winner,
        points: category.points,
    }
}

/// Strict numeric comparison; labels never win.
pub fn decide_winner(left: &NumericCell, right: &NumericCell) -> Winner {
    match (left.value(), right.value()) {
        (Some(l), Some(r)) if l > r => Winner::Left,
        (Some(l), Some(r)) if l < r => Winner::Right,
        _ => Winner::Neither,
    }
}

/// Label shown next to a category, e.g. `(5 Points)`
pub fn points_label(points: u32) -> String {
    if points == 1 {
        "(1 Point)".to_string()
    } else {
        format!("({points} Points)")
    }
}
