//! Encoding-pair catalog and strategy-scoped queries.

use crate::config::{CatalogConfig, StrategyConfig};
use crate::detect::HeuristicTextDetector;
use crate::domain::{EncodingInfo, EncodingPair, PairCategory, Strategy};

/// Priority assigned to synthesized cross-product pairs, so they are tried
/// after every curated pair, including ones with the default priority.
const DYNAMIC_PRIORITY: u32 = 1000;

/// Holds the configured hypothesis pairs and synthesizes dynamic ones.
///
/// Read-only after construction; queries allocate fresh pair sequences.
#[derive(Debug, Clone)]
pub struct EncodingCatalog {
    config: CatalogConfig,
}

impl EncodingCatalog {
    /// Build a catalog over a validated configuration document.
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration document.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Ordered hypothesis pairs for a strategy, optionally category-filtered.
    ///
    /// Pairs are sorted ascending by priority with catalog insertion order
    /// breaking ties, then truncated to the strategy's max-attempts bound.
    pub fn pairs(&self, strategy: Strategy, category: Option<PairCategory>) -> Vec<EncodingPair> {
        let mut pairs: Vec<EncodingPair> = match strategy {
            Strategy::Fast => self.config.common_pairs.clone(),
            Strategy::Balanced => self
                .config
                .common_pairs
                .iter()
                .chain(&self.config.extended_pairs)
                .cloned()
                .collect(),
            Strategy::Aggressive => self
                .config
                .common_pairs
                .iter()
                .chain(&self.config.extended_pairs)
                .cloned()
                .chain(self.dynamic_pairs())
                .collect(),
        };

        if let Some(category) = category {
            // Dynamic pairs are untyped hypotheses and always pass the filter.
            pairs.retain(|pair| {
                pair.category == category || pair.category == PairCategory::Dynamic
            });
        }

        pairs.sort_by_key(|pair| pair.priority);
        pairs.truncate(self.strategy_config(strategy).max_attempts);
        pairs
    }

    /// Pairs narrowed by the heuristic detector's category signals.
    ///
    /// When a Chinese signal fired, Chinese-category pairs are moved ahead of
    /// all others; priority still orders pairs within each group.
    pub fn recommended_pairs(
        &self,
        text: &str,
        detector: &HeuristicTextDetector,
        strategy: Strategy,
        category: Option<PairCategory>,
    ) -> Vec<EncodingPair> {
        let detected = detector.detect(text);
        let mut pairs = self.pairs(strategy, category);
        pairs.retain(|pair| {
            detected.contains(&pair.category) || pair.category == PairCategory::Dynamic
        });

        if detected.contains(&PairCategory::Chinese) {
            pairs.sort_by_key(|pair| u8::from(pair.category != PairCategory::Chinese));
        }
        pairs
    }

    /// Search bounds for a strategy, falling back to `balanced`.
    pub fn strategy_config(&self, strategy: Strategy) -> StrategyConfig {
        self.config.strategy_config(strategy)
    }

    /// Configured strategy names, in trial-cost order.
    pub fn strategies(&self) -> Vec<String> {
        Strategy::ALL
            .iter()
            .filter(|strategy| self.config.conversion_strategies.contains_key(strategy))
            .map(|strategy| strategy.as_str().to_string())
            .collect()
    }

    /// Supported encoding labels, optionally restricted to one category.
    pub fn supported_encodings(&self, category: Option<PairCategory>) -> Vec<String> {
        match category {
            Some(category) => self.config.encodings_for(category),
            None => self.config.all_supported_encodings(),
        }
    }

    /// Whether the catalog supports an encoding label.
    pub fn is_supported(&self, label: &str) -> bool {
        self.config
            .all_supported_encodings()
            .iter()
            .any(|encoding| encoding == label)
    }

    /// Category and support information for one encoding label.
    pub fn encoding_info(&self, label: &str) -> EncodingInfo {
        for (category, encodings) in &self.config.supported_encodings {
            if encodings.iter().any(|encoding| encoding == label) {
                return EncodingInfo {
                    encoding: label.to_string(),
                    category: Some(*category),
                    supported: true,
                };
            }
        }
        EncodingInfo {
            encoding: label.to_string(),
            category: None,
            supported: false,
        }
    }

    /// Cross-product hypotheses for the aggressive strategy.
    ///
    /// Skips self-pairs and pairs already curated; never persisted.
    fn dynamic_pairs(&self) -> Vec<EncodingPair> {
        let encodings = self.config.all_supported_encodings();
        let curated: Vec<(&str, &str)> = self
            .config
            .common_pairs
            .iter()
            .chain(&self.config.extended_pairs)
            .map(|pair| (pair.source_encoding.as_str(), pair.target_encoding.as_str()))
            .collect();

        let mut pairs = Vec::new();
        for source in &encodings {
            for target in &encodings {
                if source == target {
                    continue;
                }
                if curated.contains(&(source.as_str(), target.as_str())) {
                    continue;
                }
                pairs.push(EncodingPair {
                    source_encoding: source.clone(),
                    target_encoding: target.clone(),
                    category: PairCategory::Dynamic,
                    priority: DYNAMIC_PRIORITY,
                    description: format!("{source} bytes decoded as {target}"),
                });
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::EncodingCatalog;
    use crate::config::CatalogConfig;
    use crate::detect::HeuristicTextDetector;
    use crate::domain::{PairCategory, Strategy};

    fn catalog() -> EncodingCatalog {
        EncodingCatalog::new(CatalogConfig::embedded().expect("embedded catalog"))
    }

    fn detector() -> HeuristicTextDetector {
        let config = CatalogConfig::embedded().expect("embedded catalog");
        HeuristicTextDetector::new(config.auto_detection_rules)
    }

    #[test]
    fn pairs_are_sorted_by_priority() {
        let pairs = catalog().pairs(Strategy::Balanced, None);
        assert!(!pairs.is_empty());
        for window in pairs.windows(2) {
            assert!(window[0].priority <= window[1].priority);
        }
    }

    #[test]
    fn fast_uses_common_pairs_only() {
        let catalog = catalog();
        let fast = catalog.pairs(Strategy::Fast, None);
        let balanced = catalog.pairs(Strategy::Balanced, None);
        assert!(fast.len() <= balanced.len());
        assert!(fast.iter().all(|p| p.category != PairCategory::Dynamic));
    }

    #[test]
    fn aggressive_adds_dynamic_cross_product() {
        let catalog = catalog();
        let pairs = catalog.pairs(Strategy::Aggressive, None);
        assert!(pairs.iter().any(|p| p.category == PairCategory::Dynamic));
        // Dynamic pairs come after every curated pair.
        let first_dynamic = pairs
            .iter()
            .position(|p| p.category == PairCategory::Dynamic)
            .expect("dynamic pair present");
        assert!(
            pairs[..first_dynamic]
                .iter()
                .all(|p| p.category != PairCategory::Dynamic)
        );
    }

    #[test]
    fn dynamic_pairs_exclude_self_and_curated() {
        let catalog = catalog();
        let pairs = catalog.pairs(Strategy::Aggressive, None);
        let curated: Vec<(String, String)> = catalog
            .config()
            .common_pairs
            .iter()
            .chain(&catalog.config().extended_pairs)
            .map(|p| (p.source_encoding.clone(), p.target_encoding.clone()))
            .collect();
        for pair in pairs.iter().filter(|p| p.category == PairCategory::Dynamic) {
            assert_ne!(pair.source_encoding, pair.target_encoding);
            assert!(
                !curated.contains(&(pair.source_encoding.clone(), pair.target_encoding.clone()))
            );
        }
    }

    #[test]
    fn every_strategy_honors_its_attempt_bound() {
        let catalog = catalog();
        for strategy in Strategy::ALL {
            let bound = catalog.strategy_config(strategy).max_attempts;
            for category in [None, Some(PairCategory::Chinese), Some(PairCategory::Western)] {
                assert!(catalog.pairs(strategy, category).len() <= bound);
            }
        }
    }

    #[test]
    fn category_filter_retains_dynamic_pairs() {
        let pairs = catalog().pairs(Strategy::Aggressive, Some(PairCategory::Korean));
        assert!(pairs.iter().any(|p| p.category == PairCategory::Korean));
        assert!(pairs.iter().any(|p| p.category == PairCategory::Dynamic));
        assert!(
            pairs
                .iter()
                .all(|p| matches!(p.category, PairCategory::Korean | PairCategory::Dynamic))
        );
    }

    #[test]
    fn recommended_pairs_narrow_to_detected_categories() {
        let catalog = catalog();
        let pairs =
            catalog.recommended_pairs("HÃ¤llo WÃ¶rld", &detector(), Strategy::Balanced, None);
        assert!(!pairs.is_empty());
        assert!(pairs.iter().all(|p| p.category == PairCategory::Western));
    }

    #[test]
    fn recommended_pairs_put_chinese_first_on_chinese_signal() {
        let catalog = catalog();
        let pairs =
            catalog.recommended_pairs("ä¸­æ–‡ Ã¶", &detector(), Strategy::Balanced, None);
        assert!(pairs.iter().any(|p| p.category == PairCategory::Western));
        let first_western = pairs
            .iter()
            .position(|p| p.category == PairCategory::Western)
            .expect("western pair present");
        assert!(
            pairs[..first_western]
                .iter()
                .all(|p| p.category == PairCategory::Chinese)
        );
    }

    #[test]
    fn recommended_pairs_fall_back_to_everything() {
        let catalog = catalog();
        let narrowed =
            catalog.recommended_pairs("plain ascii text", &detector(), Strategy::Balanced, None);
        let unfiltered = catalog.pairs(Strategy::Balanced, None);
        assert_eq!(narrowed.len(), unfiltered.len());
    }

    #[test]
    fn strategies_lists_configured_names() {
        assert_eq!(catalog().strategies(), vec!["fast", "balanced", "aggressive"]);
    }

    #[test]
    fn encoding_info_reports_category() {
        let catalog = catalog();
        let info = catalog.encoding_info("gbk");
        assert!(info.supported);
        assert_eq!(info.category, Some(PairCategory::Chinese));

        let unknown = catalog.encoding_info("utf-7");
        assert!(!unknown.supported);
        assert_eq!(unknown.category, None);

        assert!(catalog.is_supported("euc-kr"));
        assert!(!catalog.is_supported("utf-7"));
    }
}
