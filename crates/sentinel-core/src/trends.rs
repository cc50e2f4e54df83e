//! Trending keyword statistics over the full record set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackRecord;

/// Number of trend entries reported.
pub const TOP_TRENDS: usize = 5;

/// Keywords that flag a trend for attention, matched case-insensitively.
pub const RISK_KEYWORDS: &[&str] = &["scam", "fraud", "crash", "bug", "refund", "delivery"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub keyword: String,
    pub count: usize,
    /// `round(count / record_count * 100)`; may exceed 100 when a keyword
    /// repeats within records.
    pub percentage_of_total: u32,
    pub is_alerting: bool,
}

pub fn is_risk_keyword(keyword: &str) -> bool {
    let lower = keyword.to_lowercase();
    RISK_KEYWORDS.contains(&lower.as_str())
}

/// Top keywords by occurrence count.
///
/// Every occurrence counts, including repeats within one record. Ties keep
/// the order in which keywords were first seen.
pub fn trends(records: &[FeedbackRecord]) -> Vec<TrendEntry> {
    if records.is_empty() {
        return Vec::new();
    }

    // Insertion-ordered tally: `order` holds first-seen order, `index` maps
    // keyword → position in `order`.
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for keyword in records.iter().flat_map(|r| r.keywords.iter()) {
        match index.get(keyword.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(keyword.as_str(), order.len());
                order.push((keyword.as_str(), 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));

    let total = records.len() as f64;
    order
        .into_iter()
        .take(TOP_TRENDS)
        .map(|(keyword, count)| TrendEntry {
            keyword: keyword.to_string(),
            count,
            percentage_of_total: (count as f64 / total * 100.0).round() as u32,
            is_alerting: is_risk_keyword(keyword),
        })
        .collect()
}
