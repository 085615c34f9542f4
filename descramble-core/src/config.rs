//! Catalog configuration document.
//!
//! The catalog is declared as data: supported encodings per category, the
//! curated hypothesis pairs, per-strategy search bounds, fallback character
//! substitution maps, and the indicator lists the heuristic detector
//! consumes. A default document is embedded in the crate; callers may supply
//! their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::domain::{EncodingPair, PairCategory, Strategy};
use crate::error::{DescrambleError, Result};

const EMBEDDED_CATALOG: &str = include_str!("../data/encoding-catalog.json");

/// Search bounds for one conversion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    /// Hard cap on hypothesis pairs tried under this strategy.
    pub max_attempts: usize,
}

/// Literal indicator lists consumed by the heuristic detector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoDetectionRules {
    /// Substrings typical of garbled Chinese output.
    pub chinese_indicators: Vec<String>,
    /// Substrings typical of Latin-1/Windows-1252 confusion.
    pub latin_indicators: Vec<String>,
    /// Unicode replacement markers.
    pub unicode_replacement_chars: Vec<String>,
}

/// The full catalog configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Encoding labels grouped by the category they serve.
    pub supported_encodings: BTreeMap<PairCategory, Vec<String>>,
    /// Curated pairs every strategy tries.
    pub common_pairs: Vec<EncodingPair>,
    /// Curated pairs added by `balanced` and `aggressive`.
    pub extended_pairs: Vec<EncodingPair>,
    /// Per-strategy search bounds.
    pub conversion_strategies: BTreeMap<Strategy, StrategyConfig>,
    /// Fallback substitution maps, keyed by map name.
    pub char_replacement_maps: BTreeMap<String, BTreeMap<String, String>>,
    /// Indicator lists for the heuristic detector.
    pub auto_detection_rules: AutoDetectionRules,
}

impl CatalogConfig {
    /// Parse and validate the catalog document embedded in the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parse and validate a caller-provided catalog document.
    pub fn from_json(document: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Every configured encoding label, first occurrence order, deduplicated.
    pub fn all_supported_encodings(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for encodings in self.supported_encodings.values() {
            for encoding in encodings {
                if !seen.contains(encoding) {
                    seen.push(encoding.clone());
                }
            }
        }
        seen
    }

    /// Encoding labels configured under one category.
    pub fn encodings_for(&self, category: PairCategory) -> Vec<String> {
        self.supported_encodings
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    /// Search bounds for a strategy, falling back to `balanced`.
    pub fn strategy_config(&self, strategy: Strategy) -> StrategyConfig {
        self.conversion_strategies
            .get(&strategy)
            .or_else(|| self.conversion_strategies.get(&Strategy::Balanced))
            .copied()
            .unwrap_or(StrategyConfig { max_attempts: 30 })
    }

    /// A named fallback substitution map, when configured.
    pub fn replacement_map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.char_replacement_maps.get(name)
    }

    /// Fail fast on documents the transcoding layer could never serve.
    fn validate(&self) -> Result<()> {
        for encoding in self.all_supported_encodings() {
            if Codec::from_label(&encoding).is_none() {
                return Err(DescrambleError::Config(format!(
                    "unsupported encoding label: {encoding}"
                )));
            }
        }
        for pair in self.common_pairs.iter().chain(&self.extended_pairs) {
            if pair.source_encoding == pair.target_encoding {
                return Err(DescrambleError::Config(format!(
                    "self-pair in catalog: {}",
                    pair.source_encoding
                )));
            }
            if pair.category == PairCategory::Dynamic {
                return Err(DescrambleError::Config(format!(
                    "dynamic pairs cannot be persisted: {} -> {}",
                    pair.source_encoding, pair.target_encoding
                )));
            }
            for label in [&pair.source_encoding, &pair.target_encoding] {
                if Codec::from_label(label).is_none() {
                    return Err(DescrambleError::Config(format!(
                        "unsupported encoding label in pair: {label}"
                    )));
                }
            }
        }
        if !self.conversion_strategies.contains_key(&Strategy::Balanced) {
            return Err(DescrambleError::Config(
                "conversionStrategies must define balanced".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogConfig;
    use crate::domain::{PairCategory, Strategy};

    #[test]
    fn embedded_catalog_parses_and_validates() {
        let config = CatalogConfig::embedded().expect("embedded catalog");
        assert!(!config.common_pairs.is_empty());
        assert!(!config.extended_pairs.is_empty());
        assert!(config.conversion_strategies.contains_key(&Strategy::Fast));
        assert!(!config.auto_detection_rules.chinese_indicators.is_empty());
    }

    #[test]
    fn all_supported_encodings_deduplicates() {
        let config = CatalogConfig::embedded().expect("embedded catalog");
        let encodings = config.all_supported_encodings();
        let mut sorted = encodings.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(encodings.len(), sorted.len());
        assert!(encodings.iter().any(|e| e == "gbk"));
        assert!(encodings.iter().any(|e| e == "utf-8"));
    }

    #[test]
    fn strategy_config_falls_back_to_balanced() {
        let mut config = CatalogConfig::embedded().expect("embedded catalog");
        config.conversion_strategies.remove(&Strategy::Aggressive);
        let fallback = config.strategy_config(Strategy::Aggressive);
        let balanced = config.strategy_config(Strategy::Balanced);
        assert_eq!(fallback, balanced);
    }

    #[test]
    fn rejects_self_pairs() {
        let document = r#"{
            "supportedEncodings": { "western": ["utf-8"] },
            "commonPairs": [{
                "sourceEncoding": "utf-8",
                "targetEncoding": "utf-8",
                "category": "western"
            }],
            "extendedPairs": [],
            "conversionStrategies": { "balanced": { "maxAttempts": 10 } },
            "charReplacementMaps": {},
            "autoDetectionRules": {}
        }"#;
        assert!(CatalogConfig::from_json(document).is_err());
    }

    #[test]
    fn rejects_unresolvable_labels() {
        let document = r#"{
            "supportedEncodings": { "western": ["utf-7"] },
            "commonPairs": [],
            "extendedPairs": [],
            "conversionStrategies": { "balanced": { "maxAttempts": 10 } },
            "charReplacementMaps": {},
            "autoDetectionRules": {}
        }"#;
        assert!(CatalogConfig::from_json(document).is_err());
    }

    #[test]
    fn rejects_persisted_dynamic_pairs() {
        let document = r#"{
            "supportedEncodings": { "western": ["utf-8", "windows-1252"] },
            "commonPairs": [{
                "sourceEncoding": "windows-1252",
                "targetEncoding": "utf-8",
                "category": "dynamic"
            }],
            "extendedPairs": [],
            "conversionStrategies": { "balanced": { "maxAttempts": 10 } },
            "charReplacementMaps": {},
            "autoDetectionRules": {}
        }"#;
        assert!(CatalogConfig::from_json(document).is_err());
    }

    #[test]
    fn encodings_for_missing_category_is_empty() {
        let config = CatalogConfig::embedded().expect("embedded catalog");
        assert!(config.encodings_for(PairCategory::Dynamic).is_empty());
    }
}
