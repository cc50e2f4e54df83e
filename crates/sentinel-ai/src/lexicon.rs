//! Term lists and reply templates used by the default decision list.

pub const POSITIVE: &[&str] = &["love", "great", "awesome", "excellent"];

pub const STRONG_NEGATIVE: &[&str] = &["hate", "terrible", "worst", "bad"];

pub const COMPLAINT: &[&str] = &["issue", "problem", "help"];

/// Tokens must be strictly longer than this (in chars) to count as keywords.
pub const MIN_KEYWORD_CHARS: usize = 4;

pub const MAX_KEYWORDS: usize = 5;

pub const APOLOGY_TEMPLATE: &str = "Thank you for reaching out! We're sorry to hear about your experience. Our team is looking into this right away. Please DM us for immediate assistance.";

pub const THANKS_TEMPLATE: &str =
    "Thank you for your feedback! We appreciate you taking the time to share your thoughts with us.";
