//! Domain types for mojibake recovery.

use serde::{Deserialize, Serialize};

/// Which garbling scenario a hypothesis pair addresses.
///
/// Categories describe the language whose text a mis-decoding typically
/// mangles, not the encodings themselves: the classic `ä¸­æ–‡` garbling is a
/// Chinese scenario even though one side of it is Windows-1252.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PairCategory {
    /// Chinese text mangled through GBK/Big5/UTF-8 confusion.
    Chinese,
    /// Western-European text mangled through Latin-1/Windows-1252 confusion.
    Western,
    /// Japanese text mangled through Shift_JIS/EUC-JP confusion.
    Japanese,
    /// Korean text mangled through EUC-KR confusion.
    Korean,
    /// Input carrying Unicode replacement markers; detector-only signal.
    UnicodeErrors,
    /// Cross-product hypothesis synthesized at query time, never persisted.
    Dynamic,
}

impl PairCategory {
    /// Canonical lowercase label, matching the configuration document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chinese => "chinese",
            Self::Western => "western",
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::UnicodeErrors => "unicode_errors",
            Self::Dynamic => "dynamic",
        }
    }

    /// Parse a category label. Returns `None` for unknown labels.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "chinese" => Some(Self::Chinese),
            "western" => Some(Self::Western),
            "japanese" => Some(Self::Japanese),
            "korean" => Some(Self::Korean),
            "unicode_errors" => Some(Self::UnicodeErrors),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// A single encoding-misinterpretation hypothesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingPair {
    /// The encoding the garbled string is re-encoded with.
    pub source_encoding: String,
    /// The encoding the resulting bytes are re-decoded with.
    pub target_encoding: String,
    /// Garbling scenario this pair addresses.
    pub category: PairCategory,
    /// Trial order; lower priorities are tried first.
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Human-readable description of the misinterpretation.
    #[serde(default)]
    pub description: String,
}

fn default_priority() -> u32 {
    999
}

/// Named search-breadth profile.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Curated common pairs only.
    Fast,
    /// Common plus extended curated pairs.
    Balanced,
    /// Common, extended, and the dynamic cross-product.
    Aggressive,
}

impl Strategy {
    /// Every strategy, in trial-cost order.
    pub const ALL: [Strategy; 3] = [Strategy::Fast, Strategy::Balanced, Strategy::Aggressive];

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }

    /// Parse a strategy label. Returns `None` for unknown labels.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "fast" => Some(Self::Fast),
            "balanced" => Some(Self::Balanced),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Dominant language classification of a scored string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Predominantly CJK ideographs.
    Chinese,
    /// Predominantly Latin letters.
    English,
    /// Substantial shares of both.
    Mixed,
    /// No dominant script.
    Unknown,
}

/// Character-class counts and ratios derived from one string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    /// Total character count.
    pub length: usize,
    /// CJK ideograph count.
    pub chinese_count: usize,
    /// ASCII letter count.
    pub english_count: usize,
    /// ASCII digit count.
    pub number_count: usize,
    /// Recognized punctuation count (CJK and ASCII).
    pub punctuation_count: usize,
    /// Residual characters in no recognized class.
    pub symbol_count: usize,
    /// CJK ideographs over total length.
    pub chinese_ratio: f64,
    /// ASCII letters over total length.
    pub english_ratio: f64,
}

/// Plausibility assessment of one string, all scores in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredibilityReport {
    /// Blended credibility score.
    pub score: f64,
    /// Character-frequency component.
    pub frequency_score: f64,
    /// Language-consistency component.
    pub language_score: f64,
    /// Structural component.
    pub structure_score: f64,
    /// Character-class statistics the components were derived from.
    pub stats: TextStats,
    /// Dominant language classification.
    pub primary_language: Language,
    /// Present when the input could not be scored at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CredibilityReport {
    /// Zero-score report for input that carries nothing to judge.
    pub(crate) fn unscorable(message: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            frequency_score: 0.0,
            language_score: 0.0,
            structure_score: 0.0,
            stats: TextStats::default(),
            primary_language: Language::Unknown,
            error: Some(message.into()),
        }
    }
}

/// One ranked recovery candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryResult {
    /// Encoding the input was re-encoded with.
    pub source_encoding: String,
    /// Encoding the bytes were re-decoded with.
    pub target_encoding: String,
    /// The candidate recovered text.
    pub recovered_text: String,
    /// Credibility score of the recovered text.
    pub credibility: f64,
    /// Full scoring breakdown.
    pub details: CredibilityReport,
    /// Description of the hypothesis that produced this result.
    pub description: String,
}

/// Options recognized by the recovery engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecoveryOptions {
    /// Maximum number of results returned.
    pub max_results: usize,
    /// Results scoring strictly below this threshold are dropped.
    pub min_credibility: f64,
    /// Search strategy; `None` uses the entry point's default
    /// (`balanced` for [`recover`](crate::engine::RecoveryEngine::recover),
    /// `fast` for [`quick_recover`](crate::engine::RecoveryEngine::quick_recover)).
    pub strategy: Option<Strategy>,
    /// Restrict hypotheses to one category.
    pub category: Option<PairCategory>,
    /// Route pair selection through the heuristic detector.
    pub use_recommended: bool,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_credibility: 30.0,
            strategy: None,
            category: None,
            use_recommended: true,
        }
    }
}

/// Outcome of recovering one input inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Position of the input in the batch.
    pub index: usize,
    /// The input as received.
    pub original_text: String,
    /// All qualifying results, best first.
    pub results: Vec<RecoveryResult>,
    /// The best result, when any qualified.
    pub result: Option<RecoveryResult>,
    /// Whether at least one result qualified.
    pub success: bool,
    /// Validation failure for this item, when one occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Category and support information for one encoding label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingInfo {
    /// The encoding label as queried.
    pub encoding: String,
    /// Category the encoding is configured under, if any.
    pub category: Option<PairCategory>,
    /// Whether the catalog supports this encoding.
    pub supported: bool,
}
