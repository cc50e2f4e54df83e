//! Canned feedback used to seed an empty store for demos.

use crate::feedback::Source;

/// One unclassified sample item.
#[derive(Debug, Clone, Copy)]
pub struct SampleItem {
    pub source: Source,
    pub author: &'static str,
    pub text: &'static str,
    pub rating: Option<u8>,
    /// Age of the item relative to seeding time.
    pub minutes_ago: i64,
}

pub const SAMPLE_FEEDBACK: &[SampleItem] = &[
    SampleItem {
        source: Source::Social,
        author: "@frustrated_user",
        text: "The app keeps crashing when I try to upload files. This is the worst experience ever! I need help ASAP!",
        rating: Some(1),
        minutes_ago: 30,
    },
    SampleItem {
        source: Source::Review,
        author: "John Doe",
        text: "Great product! The new dashboard UI is clean and intuitive. Love the real-time updates feature.",
        rating: Some(5),
        minutes_ago: 45,
    },
    SampleItem {
        source: Source::Email,
        author: "sarah.johnson@example.com",
        text: "I've been waiting for a response to my support ticket for 3 days. The billing issue is still not resolved.",
        rating: None,
        minutes_ago: 60,
    },
    SampleItem {
        source: Source::Chat,
        author: "Mike_92",
        text: "The performance has improved significantly after the latest update. Thanks for listening to user feedback!",
        rating: None,
        minutes_ago: 90,
    },
    SampleItem {
        source: Source::Forum,
        author: "tech_enthusiast",
        text: "Having some minor issues with the dark mode theme. Certain buttons are hard to see. Otherwise solid app.",
        rating: Some(3),
        minutes_ago: 120,
    },
    SampleItem {
        source: Source::Social,
        author: "@power_user_pro",
        text: "The new API endpoints are exactly what we needed for our integration. Documentation is excellent too!",
        rating: None,
        minutes_ago: 150,
    },
    SampleItem {
        source: Source::Review,
        author: "Lisa Chen",
        text: "App is okay but the mobile version desperately needs work. Too many features are desktop-only.",
        rating: Some(3),
        minutes_ago: 180,
    },
    SampleItem {
        source: Source::Email,
        author: "support@companyxyz.com",
        text: "Outstanding customer service! The team went above and beyond to help us migrate our data. Highly recommended!",
        rating: None,
        minutes_ago: 240,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn samples_cover_every_source() {
        let sources: HashSet<Source> = SAMPLE_FEEDBACK.iter().map(|s| s.source).collect();
        assert_eq!(sources.len(), Source::ALL.len());
    }

    #[test]
    fn samples_are_newest_first() {
        for pair in SAMPLE_FEEDBACK.windows(2) {
            assert!(pair[0].minutes_ago < pair[1].minutes_ago);
        }
    }
}
