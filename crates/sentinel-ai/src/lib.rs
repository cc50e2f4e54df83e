//! Feedback classification: a deterministic decision list over fixed lexicons.
//!
//! No model is loaded. Every call is pure and total.

pub mod classifier;
pub mod lexicon;

pub use classifier::{Rule, RuleClassifier, classify, extract_keywords, suggested_response};
