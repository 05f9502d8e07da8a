//! Gap-analysis response parser.
//!
//! The model is asked to answer in a tagged-section format:
//!
//! ```text
//! ---MISSING_KEYWORDS---
//! - Docker
//! ---RESUME_SUGGESTIONS---
//! **For Docker:**
//! - Deployed 10 containers
//! ---END---
//! ```
//!
//! Nothing validates that the model complied. The parser never fails: when the two
//! section markers are not both present in order, the whole completion is returned as
//! unstructured suggestions with no keywords. Only the first occurrence of each marker
//! counts; later duplicates are ordinary section content.

pub const MISSING_KEYWORDS_MARKER: &str = "---MISSING_KEYWORDS---";
pub const RESUME_SUGGESTIONS_MARKER: &str = "---RESUME_SUGGESTIONS---";
pub const END_MARKER: &str = "---END---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Both section markers were found in order.
    Structured,
    /// Markers missing or out of order; the raw text became the suggestions.
    Unstructured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapAnalysis {
    pub missing_keywords: String,
    pub suggestions: String,
    pub outcome: ParseOutcome,
}

pub fn parse_gap_analysis(raw: &str) -> GapAnalysis {
    let sections = raw.find(MISSING_KEYWORDS_MARKER).and_then(|kw_start| {
        let suggestions_start = raw.find(RESUME_SUGGESTIONS_MARKER)?;
        let kw_body_start = kw_start + MISSING_KEYWORDS_MARKER.len();
        (suggestions_start >= kw_body_start).then_some((kw_body_start, suggestions_start))
    });

    let Some((kw_body_start, suggestions_start)) = sections else {
        return GapAnalysis {
            missing_keywords: String::new(),
            suggestions: raw.trim().to_string(),
            outcome: ParseOutcome::Unstructured,
        };
    };

    let missing_keywords = raw[kw_body_start..suggestions_start].trim();

    // A missing END marker is tolerated: the suggestions run to the end of the text.
    let after = &raw[suggestions_start + RESUME_SUGGESTIONS_MARKER.len()..];
    let suggestions = match after.find(END_MARKER) {
        Some(end) => &after[..end],
        None => after,
    };

    GapAnalysis {
        missing_keywords: missing_keywords.to_string(),
        suggestions: suggestions.trim().to_string(),
        outcome: ParseOutcome::Structured,
    }
}
