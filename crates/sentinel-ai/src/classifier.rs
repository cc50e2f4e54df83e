//! Ordered decision list mapping text to sentiment and urgency.
//!
//! Rules are evaluated front to back against the lower-cased text; the first
//! rule whose lexicon has a substring hit decides the outcome. Texts that hit
//! several lexicons therefore take the earliest rule's labels. When nothing
//! matches, the classifier falls back to neutral/LOW.

use std::sync::LazyLock;

use sentinel_core::{Classification, Sentiment, Urgency};
use tracing::trace;

use crate::lexicon;

/// One entry of the decision list.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: &'static str,
    pub lexicon: &'static [&'static str],
    pub sentiment: Sentiment,
    pub urgency: Urgency,
}

impl Rule {
    pub const fn new(
        name: &'static str,
        lexicon: &'static [&'static str],
        sentiment: Sentiment,
        urgency: Urgency,
    ) -> Self {
        Self {
            name,
            lexicon,
            sentiment,
            urgency,
        }
    }

    /// True when any lexicon term occurs in `lowered` as a substring.
    pub fn matches(&self, lowered: &str) -> bool {
        self.lexicon.iter().any(|term| lowered.contains(term))
    }
}

/// Rule-based classifier.
///
/// The default list is positive, then strong-negative, then complaint.
/// That order is policy: a text containing both "love" and "worst" is
/// positive.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<Rule>,
    fallback: (Sentiment, Urgency),
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    "positive",
                    lexicon::POSITIVE,
                    Sentiment::Positive,
                    Urgency::Low,
                ),
                Rule::new(
                    "strong-negative",
                    lexicon::STRONG_NEGATIVE,
                    Sentiment::Negative,
                    Urgency::High,
                ),
                Rule::new(
                    "complaint",
                    lexicon::COMPLAINT,
                    Sentiment::Negative,
                    Urgency::Medium,
                ),
            ],
            fallback: (Sentiment::Neutral, Urgency::Low),
        }
    }
}

impl RuleClassifier {
    /// Classifier with no rules; everything falls through to neutral/LOW.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: (Sentiment::Neutral, Urgency::Low),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Append a rule after every existing one.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Insert a rule at `index`, shifting later rules back. An index past the
    /// end appends.
    pub fn insert(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Label a text. Never fails.
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();

        let (sentiment, urgency) = match self.rules.iter().find(|r| r.matches(&lowered)) {
            Some(rule) => {
                trace!(rule = rule.name, "classifier rule matched");
                (rule.sentiment, rule.urgency)
            }
            None => self.fallback,
        };

        Classification {
            sentiment,
            sentiment_score: sentiment.score(),
            urgency,
            keywords: extract_keywords(text),
            suggested_response: suggested_response(sentiment).to_string(),
        }
    }
}

static DEFAULT: LazyLock<RuleClassifier> = LazyLock::new(RuleClassifier::default);

/// Classify with the default decision list.
pub fn classify(text: &str) -> Classification {
    DEFAULT.classify(text)
}

/// First five whitespace-separated tokens longer than four characters, in
/// text order, lower-cased. Repeats are kept.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|token| token.chars().count() > lexicon::MIN_KEYWORD_CHARS)
        .take(lexicon::MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Reply template: apology for negative feedback, thanks otherwise.
pub fn suggested_response(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Negative => lexicon::APOLOGY_TEMPLATE,
        Sentiment::Positive | Sentiment::Neutral => lexicon::THANKS_TEMPLATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_terms() {
        let c = classify("I love the new dashboard");
        assert_eq!(c.sentiment, Sentiment::Positive);
        assert_eq!(c.urgency, Urgency::Low);
        assert_eq!(c.sentiment_score, 0.8);
        assert_eq!(c.suggested_response, lexicon::THANKS_TEMPLATE);
    }

    #[test]
    fn strong_negative_terms() {
        let c = classify("This is the WORST update");
        assert_eq!(c.sentiment, Sentiment::Negative);
        assert_eq!(c.urgency, Urgency::High);
        assert_eq!(c.sentiment_score, 0.2);
        assert_eq!(c.suggested_response, lexicon::APOLOGY_TEMPLATE);
    }

    #[test]
    fn complaint_terms() {
        let c = classify("There is an issue with billing");
        assert_eq!(c.sentiment, Sentiment::Negative);
        assert_eq!(c.urgency, Urgency::Medium);
        assert_eq!(c.sentiment_score, 0.2);
    }

    #[test]
    fn positive_wins_over_strong_negative() {
        let c = classify("I love it but the login is terrible");
        assert_eq!(c.sentiment, Sentiment::Positive);
        assert_eq!(c.urgency, Urgency::Low);
    }

    #[test]
    fn strong_negative_wins_over_complaint() {
        let c = classify("bad problem, need help");
        assert_eq!(c.urgency, Urgency::High);
    }

    #[test]
    fn substring_matches_count() {
        // "badge" contains "bad".
        assert_eq!(classify("my badge expired").urgency, Urgency::High);
    }

    #[test]
    fn empty_text_is_neutral() {
        let c = classify("");
        assert_eq!(c.sentiment, Sentiment::Neutral);
        assert_eq!(c.urgency, Urgency::Low);
        assert_eq!(c.sentiment_score, 0.5);
        assert!(c.keywords.is_empty());
        assert_eq!(c.suggested_response, lexicon::THANKS_TEMPLATE);
    }

    #[test]
    fn unmatched_text_is_neutral() {
        let c = classify("Shipped on a Tuesday");
        assert_eq!(c.sentiment, Sentiment::Neutral);
        assert_eq!(c.urgency, Urgency::Low);
    }

    #[test]
    fn keyword_length_filter() {
        assert_eq!(extract_keywords("hi ok really good"), vec!["really"]);
    }

    #[test]
    fn keywords_keep_order_and_repeats() {
        let text = "Crash crash after update, upload failed, upload again please";
        assert_eq!(
            extract_keywords(text),
            vec!["crash", "crash", "after", "update,", "upload"]
        );
    }

    #[test]
    fn keywords_count_chars_not_bytes() {
        // four chars, more than four bytes
        assert!(extract_keywords("café").is_empty());
        assert_eq!(extract_keywords("cafés"), vec!["cafés"]);
    }

    #[test]
    fn default_rule_order() {
        let names: Vec<&str> = RuleClassifier::default()
            .rules()
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["positive", "strong-negative", "complaint"]);
    }

    #[test]
    fn inserted_rule_does_not_reorder_existing() {
        const REFUND: &[&str] = &["refund"];
        let mut classifier = RuleClassifier::default();
        classifier.insert(
            1,
            Rule::new("refund", REFUND, Sentiment::Negative, Urgency::High),
        );

        let names: Vec<&str> = classifier.rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["positive", "refund", "strong-negative", "complaint"]
        );

        assert_eq!(
            classifier.classify("refund please").urgency,
            Urgency::High
        );
        assert_eq!(
            classifier.classify("great, refund done").sentiment,
            Sentiment::Positive
        );
    }

    #[test]
    fn insert_past_end_appends() {
        const X: &[&str] = &["zzz"];
        let mut classifier = RuleClassifier::empty();
        classifier.insert(10, Rule::new("x", X, Sentiment::Negative, Urgency::Medium));
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(classifier.classify("zzz").urgency, Urgency::Medium);
        assert_eq!(classifier.classify("love").sentiment, Sentiment::Neutral);
    }
}
