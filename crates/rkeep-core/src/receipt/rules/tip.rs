//! Tip/gratuity context filtering.
//!
//! A gratuity line often sits right next to a "Total" label ("Suggested
//! Gratuity ... Total with tip 52.00"). Any candidate whose neighbourhood
//! mentions a tip keyword followed by a number is dropped.

use tracing::debug;

use super::patterns::ExtractionRules;
use super::scanner::Candidate;

/// Drops candidates that sit near tip/gratuity language.
pub struct TipContextFilter<'r> {
    rules: &'r ExtractionRules,
}

impl<'r> TipContextFilter<'r> {
    pub fn new(rules: &'r ExtractionRules) -> Self {
        Self { rules }
    }

    /// Keep candidates whose window has no tip keyword + number. Order is preserved.
    pub fn filter(&self, text: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| {
                let window = tip_window(text, candidate, self.rules.tip_window_chars());
                if let Some(m) = self.rules.tip.find(&window) {
                    debug!(
                        "Excluding {} {} near tip text {:?}",
                        candidate.keyword,
                        candidate.amount,
                        m.as_str()
                    );
                    false
                } else {
                    true
                }
            })
            .collect()
    }
}

/// The `chars` characters before the numeric token followed by the `chars`
/// characters after it, clipped to the text.
pub fn tip_window(text: &str, candidate: &Candidate, chars: usize) -> String {
    let span = candidate.span();
    let start = span.start.min(text.len());
    let end = span.end.min(text.len()).max(start);

    let before = &text[..start];
    let preceding_start = before
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);

    let after = &text[end..];
    let following_len = after
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(after.len());

    let mut window = String::with_capacity((start - preceding_start) + following_len);
    window.push_str(&text[preceding_start..start]);
    window.push_str(&after[..following_len]);
    window
}
