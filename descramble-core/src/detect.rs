//! Cheap signal detection for narrowing hypothesis categories.

use crate::config::AutoDetectionRules;
use crate::domain::PairCategory;

/// Inspects raw input for known mojibake artifacts.
///
/// Rules are independent and additive; one string can trigger several
/// categories. When nothing fires, the full default set comes back, so the
/// absence of a cheap signal never shrinks the search space.
#[derive(Debug, Clone)]
pub struct HeuristicTextDetector {
    rules: AutoDetectionRules,
}

impl HeuristicTextDetector {
    /// Build a detector from configured indicator lists.
    pub fn new(rules: AutoDetectionRules) -> Self {
        Self { rules }
    }

    /// Categories worth trying for this input. Never empty.
    pub fn detect(&self, text: &str) -> Vec<PairCategory> {
        let mut categories = Vec::new();

        if contains_any(text, &self.rules.chinese_indicators) {
            categories.push(PairCategory::Chinese);
        }
        if contains_any(text, &self.rules.latin_indicators) {
            categories.push(PairCategory::Western);
        }
        if contains_any(text, &self.rules.unicode_replacement_chars) {
            categories.push(PairCategory::UnicodeErrors);
        }

        if categories.is_empty() {
            return vec![
                PairCategory::Chinese,
                PairCategory::Western,
                PairCategory::Japanese,
                PairCategory::Korean,
            ];
        }
        categories
    }
}

fn contains_any(text: &str, indicators: &[String]) -> bool {
    indicators
        .iter()
        .any(|indicator| !indicator.is_empty() && text.contains(indicator.as_str()))
}
