//! Terminal rendering for records, classifications and the dashboard.

use sentinel_core::{Classification, DashboardStats, FeedbackRecord, TrendEntry};
use sentinel_live::{NoticeLevel, Phase, ViewState};

const MAX_TEXT_CHARS: usize = 72;

/// Print one record as a vertical card.
pub fn print_record_card(record: &FeedbackRecord) {
    println!("=== {} ===", record.id);
    println!();

    println!("Feedback");
    println!("  {:<26} {}", "source", record.source);
    println!("  {:<26} {}", "author", record.author);
    println!(
        "  {:<26} {}",
        "timestamp",
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(rating) = record.rating {
        println!("  {:<26} {}", "rating", stars(rating));
    }
    println!("  {:<26} {}", "text", record.text);
    println!();

    if record.sentiment.is_some() || record.urgency.is_some() {
        println!("Classification");
        if let Some(sentiment) = record.sentiment {
            println!("  {:<26} {}", "sentiment", sentiment);
        }
        if let Some(score) = record.sentiment_score {
            println!("  {:<26} {:.1}", "sentiment_score", score);
        }
        if let Some(urgency) = record.urgency {
            println!("  {:<26} {}", "urgency", urgency);
        }
        if !record.keywords.is_empty() {
            println!("  {:<26} {}", "keywords", record.keywords.join(", "));
        }
        println!();
    }

    if let Some(response) = &record.suggested_response {
        println!("Suggested Response");
        println!("  {response}");
        println!();
    }
}

pub fn print_classification(text: &str, c: &Classification) {
    println!("{}", truncate(text, MAX_TEXT_CHARS));
    println!("  {:<26} {}", "sentiment", c.sentiment);
    println!("  {:<26} {:.1}", "sentiment_score", c.sentiment_score);
    println!("  {:<26} {}", "urgency", c.urgency);
    if !c.keywords.is_empty() {
        println!("  {:<26} {}", "keywords", c.keywords.join(", "));
    }
    println!("  {:<26} {}", "suggested_response", c.suggested_response);
}

/// Full dashboard: counters, trends, then the visible records.
pub fn print_dashboard(state: &ViewState) {
    match &state.phase {
        Phase::Loading => {
            println!("Loading feedback...");
            return;
        }
        Phase::Error(message) => {
            println!("Error: {message}");
            return;
        }
        Phase::Ready => {}
    }

    print_stats(&state.stats);
    print_trends(&state.trends);

    if state.filter.is_active() {
        println!(
            "Feedback ({} of {}, filtered)",
            state.visible.len(),
            state.records.len()
        );
    } else {
        println!("Feedback ({})", state.visible.len());
    }
    if state.visible.is_empty() {
        println!("  (no feedback matches)");
    }
    for record in &state.visible {
        println!("  {}", record_line(record));
    }
    println!();

    if let Some(notice) = &state.notice {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notice.message);
    }
}

fn print_stats(stats: &DashboardStats) {
    println!("Overview");
    println!("  {:<26} {}", "urgent", stats.urgent_count);
    println!("  {:<26} {}", "total", stats.total_count);
    println!(
        "  {:<26} {}% ({} positive)",
        "positive_rate", stats.positive_rate, stats.positive_count
    );
    println!();
}

fn print_trends(trends: &[TrendEntry]) {
    if trends.is_empty() {
        return;
    }
    println!("Trending");
    for t in trends {
        let alert = if t.is_alerting { "  ALERT" } else { "" };
        println!(
            "  {:<26} {:>4} ({}%){alert}",
            t.keyword, t.count, t.percentage_of_total
        );
    }
    println!();
}

fn record_line(record: &FeedbackRecord) -> String {
    format!(
        "{:<6} {:<8} {:<7} {:<24} {}",
        record.urgency.map(|u| u.as_str()).unwrap_or("-"),
        record.sentiment.map(|s| s.as_str()).unwrap_or("-"),
        record.source.as_str(),
        truncate(&record.author, 24),
        truncate(&record.text, MAX_TEXT_CHARS),
    )
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Cut to `max` chars, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
