//! Recovery orchestration.
//!
//! The engine ties the catalog, detector, codec chain, and scorer together:
//! it asks the catalog for hypothesis pairs (optionally narrowed by the
//! detector), runs each pair through the recovery chain, scores surviving
//! candidates, and returns the credible ones ranked. Per-pair failures are
//! skipped silently; finding nothing is a valid, non-exceptional outcome.

use std::cmp::Ordering;
use std::sync::Arc;

use log::{debug, trace};

use crate::catalog::EncodingCatalog;
use crate::codec::{NativeCodecPass, RecoveryPass, SubstitutionPass};
use crate::config::CatalogConfig;
use crate::detect::HeuristicTextDetector;
use crate::domain::{
    BatchItem, CredibilityReport, EncodingInfo, EncodingPair, PairCategory, RecoveryOptions,
    RecoveryResult, Strategy,
};
use crate::error::{DescrambleError, Result};
use crate::frequency::FrequencyModel;
use crate::scorer::CredibilityScorer;

/// Searches encoding-misinterpretation hypotheses and ranks the credible
/// recoveries.
///
/// All state is read-only after construction; every call is independent and
/// safe to run concurrently with any other.
pub struct RecoveryEngine {
    catalog: EncodingCatalog,
    detector: HeuristicTextDetector,
    scorer: CredibilityScorer,
    passes: Vec<Box<dyn RecoveryPass + Send + Sync>>,
}

impl RecoveryEngine {
    /// Build an engine from the embedded catalog and frequency data.
    pub fn new() -> Result<Self> {
        let config = CatalogConfig::embedded()?;
        let frequency = FrequencyModel::load()?;
        Ok(Self::with_config(config, frequency))
    }

    /// Build an engine from caller-provided configuration.
    pub fn with_config(config: CatalogConfig, frequency: FrequencyModel) -> Self {
        let passes: Vec<Box<dyn RecoveryPass + Send + Sync>> = vec![
            Box::new(NativeCodecPass),
            Box::new(SubstitutionPass::from_config(&config)),
        ];
        Self::with_passes(config, frequency, passes)
    }

    fn with_passes(
        config: CatalogConfig,
        frequency: FrequencyModel,
        passes: Vec<Box<dyn RecoveryPass + Send + Sync>>,
    ) -> Self {
        let detector = HeuristicTextDetector::new(config.auto_detection_rules.clone());
        let scorer = CredibilityScorer::new(Arc::new(frequency));
        Self {
            catalog: EncodingCatalog::new(config),
            detector,
            scorer,
            passes,
        }
    }

    /// Recover candidates for a garbled string, ranked by credibility.
    ///
    /// Fails only on invalid input; a well-formed request that finds nothing
    /// above the threshold returns an empty list.
    pub fn recover(&self, text: &str, options: &RecoveryOptions) -> Result<Vec<RecoveryResult>> {
        if text.is_empty() {
            return Err(DescrambleError::InvalidInput(
                "input must be a non-empty string".to_string(),
            ));
        }

        let strategy = options.strategy.unwrap_or_default();
        let pairs = if options.use_recommended {
            self.catalog
                .recommended_pairs(text, &self.detector, strategy, options.category)
        } else {
            self.catalog.pairs(strategy, options.category)
        };
        debug!(
            "strategy {}: trying {} encoding pairs",
            strategy.as_str(),
            pairs.len()
        );

        let mut results = Vec::new();
        for pair in &pairs {
            let Some(recovered) = self.attempt(text, pair) else {
                continue;
            };
            if recovered == text {
                // An unchanged candidate carries no information.
                continue;
            }
            let report = self.scorer.score(&recovered);
            if report.score >= options.min_credibility {
                results.push(build_result(pair, recovered, report));
            }
        }

        results.sort_by(|a, b| {
            b.credibility
                .partial_cmp(&a.credibility)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(options.max_results);
        Ok(results)
    }

    /// Recover only the single best candidate.
    ///
    /// Defaults to the `fast` strategy unless the options name one, and
    /// returns `None` when nothing qualifies.
    pub fn quick_recover(
        &self,
        text: &str,
        options: &RecoveryOptions,
    ) -> Result<Option<RecoveryResult>> {
        let mut options = options.clone();
        options.strategy = Some(options.strategy.unwrap_or(Strategy::Fast));
        options.max_results = 1;
        let results = self.recover(text, &options)?;
        Ok(results.into_iter().next())
    }

    /// Recover a sequence of inputs independently.
    ///
    /// A failure on one input is captured in its item and never aborts the
    /// batch.
    pub fn batch_recover<S: AsRef<str>>(
        &self,
        texts: &[S],
        options: &RecoveryOptions,
    ) -> Vec<BatchItem> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let text = text.as_ref();
                match self.recover(text, options) {
                    Ok(results) => BatchItem {
                        index,
                        original_text: text.to_string(),
                        result: results.first().cloned(),
                        success: !results.is_empty(),
                        results,
                        error: None,
                    },
                    Err(error) => BatchItem {
                        index,
                        original_text: text.to_string(),
                        results: Vec::new(),
                        result: None,
                        success: false,
                        error: Some(error.to_string()),
                    },
                }
            })
            .collect()
    }

    /// Score a string's credibility. Total over all inputs.
    pub fn score_text(&self, text: &str) -> CredibilityReport {
        self.scorer.score(text)
    }

    /// Hypothesis categories worth trying for this input.
    pub fn detect_categories(&self, text: &str) -> Vec<PairCategory> {
        self.detector.detect(text)
    }

    /// Detector-narrowed hypothesis pairs for this input.
    pub fn recommended_pairs(
        &self,
        text: &str,
        options: &RecoveryOptions,
    ) -> Vec<EncodingPair> {
        self.catalog.recommended_pairs(
            text,
            &self.detector,
            options.strategy.unwrap_or_default(),
            options.category,
        )
    }

    /// Supported encoding labels, optionally restricted to one category.
    pub fn list_supported_encodings(&self, category: Option<PairCategory>) -> Vec<String> {
        self.catalog.supported_encodings(category)
    }

    /// Configured strategy names.
    pub fn list_strategies(&self) -> Vec<String> {
        self.catalog.strategies()
    }

    /// Category and support information for one encoding label.
    pub fn encoding_info(&self, label: &str) -> EncodingInfo {
        self.catalog.encoding_info(label)
    }

    /// Whether the catalog supports an encoding label.
    pub fn is_encoding_supported(&self, label: &str) -> bool {
        self.catalog.is_supported(label)
    }

    /// The catalog backing this engine.
    pub fn catalog(&self) -> &EncodingCatalog {
        &self.catalog
    }

    /// Run the recovery chain for one pair; first success wins.
    fn attempt(&self, text: &str, pair: &EncodingPair) -> Option<String> {
        for pass in &self.passes {
            match pass.attempt(text, pair) {
                Ok(recovered) => return Some(recovered),
                Err(failure) => trace!(
                    "{} {} -> {}: {failure}",
                    pass.name(),
                    pair.source_encoding,
                    pair.target_encoding
                ),
            }
        }
        None
    }
}

fn build_result(
    pair: &EncodingPair,
    recovered_text: String,
    report: CredibilityReport,
) -> RecoveryResult {
    let description = if pair.description.is_empty() {
        format!("{} -> {}", pair.source_encoding, pair.target_encoding)
    } else {
        pair.description.clone()
    };
    RecoveryResult {
        source_encoding: pair.source_encoding.clone(),
        target_encoding: pair.target_encoding.clone(),
        recovered_text,
        credibility: report.score,
        details: report,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::RecoveryEngine;
    use crate::codec::{MockRecoveryPass, RecoveryPass, TrialFailure};
    use crate::config::CatalogConfig;
    use crate::domain::{RecoveryOptions, Strategy};
    use crate::error::DescrambleError;
    use crate::frequency::FrequencyModel;

    fn engine() -> RecoveryEngine {
        RecoveryEngine::new().expect("engine")
    }

    fn engine_with_pass(pass: MockRecoveryPass) -> RecoveryEngine {
        let config = CatalogConfig::embedded().expect("embedded catalog");
        let frequency = FrequencyModel::load().expect("frequency model");
        let passes: Vec<Box<dyn RecoveryPass + Send + Sync>> = vec![Box::new(pass)];
        RecoveryEngine::with_passes(config, frequency, passes)
    }

    #[test]
    fn empty_input_is_a_validation_error() {
        let result = engine().recover("", &RecoveryOptions::default());
        assert!(matches!(result, Err(DescrambleError::InvalidInput(_))));
    }

    #[test]
    fn unchanged_candidates_are_discarded() {
        let mut pass = MockRecoveryPass::new();
        pass.expect_name().return_const("mock");
        pass.expect_attempt()
            .returning(|text, _| Ok(text.to_string()));

        let results = engine_with_pass(pass)
            .recover("some garbled input", &RecoveryOptions::default())
            .expect("recover");
        assert!(results.is_empty());
    }

    #[test]
    fn pair_failures_are_skipped_silently() {
        let mut pass = MockRecoveryPass::new();
        pass.expect_name().return_const("mock");
        pass.expect_attempt()
            .returning(|_, _| Err(TrialFailure::NotApplicable));

        let results = engine_with_pass(pass)
            .recover("some garbled input", &RecoveryOptions::default())
            .expect("recover");
        assert!(results.is_empty());
    }

    #[test]
    fn results_respect_threshold_and_bound() {
        let mut pass = MockRecoveryPass::new();
        pass.expect_name().return_const("mock");
        // Every pair "recovers" clean Chinese; all candidates score the same.
        pass.expect_attempt()
            .returning(|_, _| Ok("这是一段正常的中文文本。".to_string()));

        let options = RecoveryOptions {
            max_results: 3,
            min_credibility: 30.0,
            ..RecoveryOptions::default()
        };
        let results = engine_with_pass(pass)
            .recover("ä¸­æ–‡ä¹±ç ", &options)
            .expect("recover");

        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        for result in &results {
            assert!(result.credibility >= 30.0);
        }
    }

    #[test]
    fn results_are_sorted_by_credibility() {
        let options = RecoveryOptions {
            min_credibility: 0.0,
            strategy: Some(Strategy::Aggressive),
            use_recommended: false,
            ..RecoveryOptions::default()
        };
        let results = engine().recover("ä¸­æ–‡ä¹±ç ", &options).expect("recover");
        assert!(results.len() > 1);
        for window in results.windows(2) {
            assert!(window[0].credibility >= window[1].credibility);
        }
    }

    #[test]
    fn quick_recover_defaults_to_fast_strategy() {
        let engine = engine();
        let best = engine
            .quick_recover("HÃ¤llo WÃ¶rld", &RecoveryOptions::default())
            .expect("quick recover")
            .expect("a result");
        assert_eq!(best.recovered_text, "Hällo Wörld");
    }

    #[test]
    fn quick_recover_returns_none_when_nothing_qualifies() {
        let engine = engine();
        let best = engine
            .quick_recover("plain ascii text", &RecoveryOptions::default())
            .expect("quick recover");
        assert!(best.is_none());
    }

    #[test]
    fn batch_isolates_failures_per_item() {
        let engine = engine();
        let items = engine.batch_recover(&["ä¸­æ–‡ä¹±ç ", ""], &RecoveryOptions::default());

        assert_eq!(items.len(), 2);
        assert!(items[0].success);
        assert!(!items[0].results.is_empty());
        assert!(items[0].error.is_none());

        assert!(!items[1].success);
        assert!(items[1].results.is_empty());
        assert!(items[1].error.as_deref().unwrap_or_default().contains("non-empty"));
    }

    #[test]
    fn description_falls_back_to_pair_labels() {
        let options = RecoveryOptions {
            min_credibility: 0.0,
            strategy: Some(Strategy::Aggressive),
            use_recommended: false,
            ..RecoveryOptions::default()
        };
        let results = engine().recover("ä¸­æ–‡ä¹±ç ", &options).expect("recover");
        for result in results {
            assert!(!result.description.is_empty());
        }
    }

    #[test]
    fn surface_queries_delegate_to_catalog() {
        let engine = engine();
        assert!(engine.is_encoding_supported("gbk"));
        assert!(!engine.list_strategies().is_empty());
        assert!(!engine.list_supported_encodings(None).is_empty());
        assert!(
            !engine
                .recommended_pairs("ä¸­æ–‡", &RecoveryOptions::default())
                .is_empty()
        );
    }
}
