//! Heuristic recommendation score for a single rating action.
//!
//! The score is a weighted sum of three factors: the analyst's rating transition, the kind of
//! action taken, and the relative change of the price target. Unknown or malformed inputs
//! contribute zero, so scoring never fails.

use crate::domain::record::Record;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const RATING_WEIGHT: f64 = 0.4;
pub const ACTION_WEIGHT: f64 = 0.3;
pub const GROWTH_WEIGHT: f64 = 0.3;

// Ordered (rating_from, rating_to) pairs. The table is not antisymmetric; keep values as listed.
const RATING_TRANSITIONS: &[((&str, &str), f64)] = &[
    (("Sell", "Buy"), 10.0),
    (("Sell", "Overweight"), 8.0),
    (("Sell", "Neutral"), 5.0),
    (("Neutral", "Buy"), 5.0),
    (("Neutral", "Overweight"), 4.0),
    (("Underweight", "Overweight"), 9.0),
    (("Underweight", "Neutral"), 4.0),
    (("Buy", "Neutral"), -5.0),
    (("Overweight", "Neutral"), -4.0),
    (("Buy", "Sell"), -10.0),
    (("Overweight", "Sell"), -8.0),
    (("Neutral", "Sell"), -5.0),
    (("Underweight", "Sell"), -7.0),
    (("Overweight", "Underweight"), -9.0),
    (("Buy", "Overweight"), 3.0),
    (("Neutral", "Neutral"), 0.0),
    (("Buy", "Buy"), 3.0),
];

const ACTIONS: &[(&str, f64)] = &[
    ("upgraded by", 4.0),
    ("downgraded by", -4.0),
    ("target raised by", 3.0),
    ("target lowered by", -3.0),
    ("reiterated by", 1.0),
];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₩', '₹'];

type RatingTable = HashMap<&'static str, HashMap<&'static str, f64>>;

// rating_from -> rating_to -> score
fn rating_table() -> &'static RatingTable {
    static TABLE: OnceLock<RatingTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = RatingTable::new();
        for &((from, to), value) in RATING_TRANSITIONS {
            table.entry(from).or_default().insert(to, value);
        }
        table
    })
}

fn action_table() -> &'static HashMap<&'static str, f64> {
    static TABLE: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    TABLE.get_or_init(|| ACTIONS.iter().copied().collect())
}

/// Per-factor view of a score. Factor values are unweighted; `total` is the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub rating: f64,
    pub action: f64,
    pub growth: f64,
    pub total: f64,
}

pub fn score(record: &Record) -> f64 {
    breakdown(record).total
}

pub fn breakdown(record: &Record) -> ScoreBreakdown {
    let rating = rating_transition_score(&record.rating_from, &record.rating_to);
    let action = action_score(&record.action);
    let growth = target_growth_score(&record.target_from, &record.target_to);

    ScoreBreakdown {
        rating,
        action,
        growth,
        total: RATING_WEIGHT * rating + ACTION_WEIGHT * action + GROWTH_WEIGHT * growth,
    }
}

pub fn rating_transition_score(rating_from: &str, rating_to: &str) -> f64 {
    rating_table()
        .get(rating_from)
        .and_then(|targets| targets.get(rating_to))
        .copied()
        .unwrap_or(0.0)
}

pub fn action_score(action: &str) -> f64 {
    action_table().get(action).copied().unwrap_or(0.0)
}

/// `((to - from) / from) * 10`, or 0 when either side is unparseable, `from` is zero, or the
/// ratio overflows `f64`.
pub fn target_growth_score(target_from: &str, target_to: &str) -> f64 {
    let (Some(from), Some(to)) = (parse_price(target_from), parse_price(target_to)) else {
        return 0.0;
    };
    if from == 0.0 {
        return 0.0;
    }
    let growth = ((to - from) / from) * 10.0;
    if growth.is_finite() {
        growth
    } else {
        0.0
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    strip_currency_symbol(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn strip_currency_symbol(raw: &str) -> &str {
    let mut chars = raw.chars();
    match chars.next() {
        Some(c) if CURRENCY_SYMBOLS.contains(&c) => chars.as_str(),
        _ => raw,
    }
}
