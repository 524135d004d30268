//! Word-level segmentation applied before subword tokenization.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::SegmenterKind;

/// Splits raw text into word units.
pub trait WordSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Language-aware segmentation on Unicode word boundaries (UAX #29).
/// Case is preserved and punctuation dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeWordSegmenter;

impl WordSegmenter for UnicodeWordSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }

    fn name(&self) -> &'static str {
        "unicode"
    }
}

/// Naive fallback: lowercase, then split on whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceSegmenter;

impl WordSegmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Resolve a configured kind into a concrete segmenter.
pub fn segmenter_for(kind: SegmenterKind) -> Box<dyn WordSegmenter> {
    match kind {
        SegmenterKind::Auto | SegmenterKind::Unicode => Box::new(UnicodeWordSegmenter),
        SegmenterKind::Whitespace => Box::new(WhitespaceSegmenter),
    }
}
