//! Credibility scoring for recovered candidate strings.
//!
//! The scorer is a pure function of the string: character-frequency,
//! language-consistency, and structural components are computed
//! independently, blended, and then adjusted by a small set of override
//! rules. All scores stay in `[0, 100]`. The weights and penalty caps are
//! empirically tuned; they live in [`ScoringTunables`] so they can be
//! calibrated against a labeled corpus instead of recompiled.

use std::sync::Arc;

use crate::domain::{CredibilityReport, Language, TextStats};
use crate::frequency::FrequencyModel;

/// CJK frequencies below this count as "low frequency".
const LOW_FREQUENCY_THRESHOLD: u32 = 3;
/// Shortest string the language component will judge.
const MIN_JUDGEABLE_LENGTH: usize = 5;
/// Language score for strings too short to judge.
const NEUTRAL_LANGUAGE_SCORE: f64 = 50.0;
/// Base the invalid-sequence rule subtracts from.
const INVALID_SEQUENCE_BASE: f64 = 40.0;
/// Deduction per invalid sequence occurrence.
const INVALID_SEQUENCE_STEP: f64 = 10.0;
/// Language score for a single character repeated throughout.
const MONOTONE_LANGUAGE_SCORE: f64 = 10.0;
/// Structural base score.
const STRUCTURE_BASE: f64 = 55.0;
/// Deduction per garbled-pattern match.
const GARBLED_PATTERN_STEP: f64 = 15.0;

/// Recognized punctuation, CJK and ASCII.
const RECOGNIZED_PUNCTUATION: &[char] = &[
    '，', '。', '、', '？', '！', '：', '；', '“', '”', '‘', '’', '（', '）', '【', '】', '《',
    '》', '.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']',
];

/// Tunable weights, caps, and floors for the credibility blend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTunables {
    /// Weight of the frequency component in the blend.
    pub frequency_weight: f64,
    /// Weight of the language-consistency component in the blend.
    pub language_weight: f64,
    /// Weight of the structural component in the blend.
    pub structure_weight: f64,
    /// Multiplier applied to the average log-frequency.
    pub frequency_scale: f64,
    /// Cap on the low-frequency CJK penalty.
    pub low_frequency_penalty_cap: f64,
    /// Cap on the zero-frequency CJK penalty.
    pub zero_frequency_penalty_cap: f64,
    /// Cap on the repeated-run penalty inside the frequency component.
    pub repeat_run_penalty_cap: f64,
    /// Cap on the structural symbol-excess penalty.
    pub symbol_penalty_cap: f64,
    /// Floor applied to heavily-lettered text that scored as noise.
    pub lettered_text_floor: f64,
    /// Ceiling for strings with no CJK or Latin content at all.
    pub pure_symbol_score_cap: f64,
    /// Ceiling for a single character repeated throughout.
    pub repeated_char_score_cap: f64,
}

impl Default for ScoringTunables {
    fn default() -> Self {
        Self {
            frequency_weight: 0.45,
            language_weight: 0.30,
            structure_weight: 0.25,
            frequency_scale: 10.0,
            low_frequency_penalty_cap: 10.0,
            zero_frequency_penalty_cap: 15.0,
            repeat_run_penalty_cap: 30.0,
            symbol_penalty_cap: 60.0,
            lettered_text_floor: 10.0,
            pure_symbol_score_cap: 25.0,
            repeated_char_score_cap: 30.0,
        }
    }
}

/// Scores how much a string resembles real language.
#[derive(Debug, Clone)]
pub struct CredibilityScorer {
    frequency: Arc<FrequencyModel>,
    tunables: ScoringTunables,
}

impl CredibilityScorer {
    /// Build a scorer with default tunables.
    pub fn new(frequency: Arc<FrequencyModel>) -> Self {
        Self::with_tunables(frequency, ScoringTunables::default())
    }

    /// Build a scorer with caller-provided tunables.
    pub fn with_tunables(frequency: Arc<FrequencyModel>, tunables: ScoringTunables) -> Self {
        Self { frequency, tunables }
    }

    /// Compute the credibility report for a string.
    ///
    /// Total over all inputs: empty input yields a zero-score report with an
    /// error marker rather than failing, since the scorer runs speculatively
    /// on every hypothesis candidate.
    pub fn score(&self, text: &str) -> CredibilityReport {
        if text.is_empty() {
            return CredibilityReport::unscorable("empty input");
        }

        let stats = analyze(text);
        let frequency_score = self.frequency_score(text);
        let language_score = self.language_score(text, &stats);
        let structure_score = self.structure_score(text, &stats);

        let blended = (frequency_score * self.tunables.frequency_weight
            + language_score * self.tunables.language_weight
            + structure_score * self.tunables.structure_weight)
            .clamp(0.0, 100.0);
        let total = self.apply_overrides(text, &stats, blended);

        CredibilityReport {
            score: round2(total),
            frequency_score: round2(frequency_score),
            language_score: round2(language_score),
            structure_score: round2(structure_score),
            stats,
            primary_language: classify_language(&stats),
            error: None,
        }
    }

    /// Average log-frequency of recognized characters, with penalties for
    /// rare CJK content and repeated runs.
    fn frequency_score(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut recognized = 0usize;
        let mut cjk_total = 0usize;
        let mut low_frequency = 0usize;
        let mut zero_frequency = 0usize;

        for c in text.chars() {
            if let Some(frequency) = self.frequency.combined(c) {
                total += (f64::from(frequency) + 1.0).ln();
                recognized += 1;
            }
            if is_cjk(c) {
                cjk_total += 1;
                let frequency = self.frequency.chinese(c);
                if frequency == 0 {
                    zero_frequency += 1;
                } else if frequency < LOW_FREQUENCY_THRESHOLD {
                    low_frequency += 1;
                }
            }
        }

        if recognized == 0 {
            return 0.0;
        }

        let average = total / recognized as f64;
        let mut score = (average * self.tunables.frequency_scale).min(100.0);

        if cjk_total > 0 && low_frequency > 0 {
            let ratio = low_frequency as f64 / cjk_total as f64;
            let penalty = (ratio * 10.0).min(self.tunables.low_frequency_penalty_cap);
            score = (score - penalty).max(0.0);
        }
        if cjk_total > 0 && zero_frequency > 0 {
            let ratio = zero_frequency as f64 / cjk_total as f64;
            let penalty = (ratio * 20.0).min(self.tunables.zero_frequency_penalty_cap);
            score = (score - penalty).max(0.0);
        }

        // Long same-character runs carry no frequency information.
        let mut run_penalty = 0.0;
        for (_, length) in char_runs(text) {
            if length >= 6 {
                run_penalty += length as f64 * 3.0;
            }
        }
        if run_penalty > 0.0 {
            score = (score - run_penalty.min(self.tunables.repeat_run_penalty_cap)).max(0.0);
        }

        score
    }

    /// Consistency of the string with one dominant language.
    fn language_score(&self, text: &str, stats: &TextStats) -> f64 {
        if stats.length < MIN_JUDGEABLE_LENGTH {
            return NEUTRAL_LANGUAGE_SCORE;
        }

        let invalid_sequences = count_runs(text, |c| !is_recognized(c), 3);
        if invalid_sequences > 0 {
            return (INVALID_SEQUENCE_BASE - invalid_sequences as f64 * INVALID_SEQUENCE_STEP)
                .max(0.0);
        }

        if is_single_repeated_char(text, 6) {
            return MONOTONE_LANGUAGE_SCORE;
        }

        match classify_language(stats) {
            Language::Chinese if stats.chinese_ratio > 0.3 => 92.0,
            Language::English if stats.english_ratio > 0.5 => 90.0,
            Language::Mixed if stats.chinese_ratio + stats.english_ratio > 0.4 => 80.0,
            _ => 40.0,
        }
    }

    /// Structural plausibility: punctuation balance, repetition, garbled
    /// patterns, whitespace, and symbol load.
    fn structure_score(&self, text: &str, stats: &TextStats) -> f64 {
        let length = stats.length as f64;
        let mut score = STRUCTURE_BASE;

        let punctuation_ratio = stats.punctuation_count as f64 / length;
        if punctuation_ratio > 0.01 && punctuation_ratio < 0.30 {
            score += 30.0;
        } else if punctuation_ratio > 0.5 {
            score -= 25.0 * ((punctuation_ratio - 0.5) / 0.5).min(1.0);
        }

        for (_, run_length) in char_runs(text) {
            if run_length >= 4 {
                score -= (run_length as f64 * 5.0).min(50.0);
            }
        }

        let garbled_matches = count_runs(text, |c| !is_recognized(c), 5)
            + count_runs(text, |c| c == char::REPLACEMENT_CHARACTER, 1)
            + count_runs(text, |c| c == '?', 3);
        score -= garbled_matches as f64 * GARBLED_PATTERN_STEP;

        let whitespace_ratio =
            text.chars().filter(|c| c.is_whitespace()).count() as f64 / length;
        if whitespace_ratio > 0.05 && whitespace_ratio < 0.5 {
            score += 10.0;
        }

        let symbol_ratio = stats.symbol_count as f64 / length;
        if symbol_ratio > 0.2 {
            score -= (symbol_ratio * 80.0).min(self.tunables.symbol_penalty_cap);
        }

        if stats.chinese_count == 0 && stats.english_count == 0 {
            score -= 20.0;
        }

        score.clamp(0.0, 100.0)
    }

    /// Rescue and cap rules applied after the blend, in order.
    fn apply_overrides(&self, text: &str, stats: &TextStats, mut total: f64) -> f64 {
        let letter_count = text.chars().filter(|c| c.is_alphabetic()).count();
        let letter_ratio = letter_count as f64 / stats.length as f64;
        if letter_ratio > 0.8 && total < self.tunables.lettered_text_floor {
            // Accented Latin text is mostly "symbols" to the stats above;
            // it must still not score as pure noise.
            total = self.tunables.lettered_text_floor;
        }

        if stats.chinese_count == 0 && stats.english_count == 0 {
            let symbol_ratio = stats.symbol_count as f64 / stats.length as f64;
            if symbol_ratio > 0.2 {
                total = total.min(self.tunables.pure_symbol_score_cap);
            }
        }

        if is_single_repeated_char(text, 8) {
            total = total.min(self.tunables.repeated_char_score_cap);
        }

        total
    }
}

/// Character-class counts and ratios for one string.
pub(crate) fn analyze(text: &str) -> TextStats {
    let mut stats = TextStats::default();
    for c in text.chars() {
        stats.length += 1;
        if is_cjk(c) {
            stats.chinese_count += 1;
        } else if c.is_ascii_alphabetic() {
            stats.english_count += 1;
        } else if c.is_ascii_digit() {
            stats.number_count += 1;
        } else if is_recognized_punctuation(c) {
            stats.punctuation_count += 1;
        } else if !c.is_whitespace() && c != '_' {
            stats.symbol_count += 1;
        }
    }
    if stats.length > 0 {
        stats.chinese_ratio = stats.chinese_count as f64 / stats.length as f64;
        stats.english_ratio = stats.english_count as f64 / stats.length as f64;
    }
    stats
}

/// Dominant-language classification.
///
/// Mixed is checked first: genuinely mixed text must not be claimed by a
/// single language just because one ratio clears its own threshold.
pub(crate) fn classify_language(stats: &TextStats) -> Language {
    if stats.chinese_ratio > 0.08 && stats.english_ratio > 0.08 {
        Language::Mixed
    } else if stats.chinese_ratio > 0.4 {
        Language::Chinese
    } else if stats.english_ratio > 0.8 {
        Language::English
    } else {
        Language::Unknown
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

fn is_recognized_punctuation(c: char) -> bool {
    RECOGNIZED_PUNCTUATION.contains(&c)
}

fn is_recognized(c: char) -> bool {
    is_cjk(c)
        || c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || is_recognized_punctuation(c)
}

/// Maximal same-character runs of the string, in order.
fn char_runs(text: &str) -> Vec<(char, usize)> {
    let mut runs: Vec<(char, usize)> = Vec::new();
    for c in text.chars() {
        match runs.last_mut() {
            Some((last, length)) if *last == c => *length += 1,
            _ => runs.push((c, 1)),
        }
    }
    runs
}

/// Count maximal runs of characters matching `predicate` with length of at
/// least `min_length`.
fn count_runs(text: &str, predicate: impl Fn(char) -> bool, min_length: usize) -> usize {
    let mut count = 0;
    let mut current = 0usize;
    for c in text.chars() {
        if predicate(c) {
            current += 1;
        } else {
            if current >= min_length {
                count += 1;
            }
            current = 0;
        }
    }
    if current >= min_length {
        count += 1;
    }
    count
}

/// Whether the whole string is one character repeated at least `min_length`
/// times.
fn is_single_repeated_char(text: &str, min_length: usize) -> bool {
    let runs = char_runs(text);
    runs.len() == 1 && runs[0].1 >= min_length
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{CredibilityScorer, ScoringTunables, analyze, classify_language, count_runs};
    use crate::domain::Language;
    use crate::frequency::FrequencyModel;
    use std::sync::Arc;

    fn scorer() -> CredibilityScorer {
        let model = FrequencyModel::load().expect("frequency model");
        CredibilityScorer::new(Arc::new(model))
    }

    fn assert_in_range(report: &crate::domain::CredibilityReport) {
        for value in [
            report.score,
            report.frequency_score,
            report.language_score,
            report.structure_score,
        ] {
            assert!((0.0..=100.0).contains(&value), "score out of range: {value}");
        }
    }

    #[test]
    fn empty_input_scores_zero_without_panicking() {
        let report = scorer().score("");
        assert_eq!(report.score, 0.0);
        assert!(report.error.is_some());
        assert_eq!(report.primary_language, Language::Unknown);
        assert_eq!(report.stats.length, 0);
    }

    #[test]
    fn all_scores_stay_in_range() {
        let scorer = scorer();
        for sample in [
            "这是一段正常的中文文本，用于对比测试。",
            "The quick brown fox jumps over the lazy dog.",
            "ä¸­æ–‡ä¹±ç ",
            "!@#$%^&*()",
            "中文 mixed with English words",
            "\u{FFFD}\u{FFFD}\u{FFFD}",
            "a",
            "    ",
            "øøøøøøøøøøøø",
        ] {
            let report = scorer.score(sample);
            assert_in_range(&report);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = scorer();
        let sample = "中文 mixed with English 文本。";
        assert_eq!(scorer.score(sample), scorer.score(sample));
    }

    #[test]
    fn real_chinese_outscores_its_mojibake() {
        let scorer = scorer();
        let real = scorer.score("这是一段正常的中文文本。");
        let garbled = scorer.score("ä¸­æ–‡ä¹±ç æµ‹è¯•");
        assert!(real.score > garbled.score);
    }

    #[test]
    fn real_chinese_classifies_as_chinese() {
        let report = scorer().score("今天天气很好，我们出去走走。");
        assert_eq!(report.primary_language, Language::Chinese);
        assert!(report.language_score >= 90.0);
    }

    #[test]
    fn english_sentence_classifies_as_english() {
        let report = scorer().score("Plain English sentences score well.");
        assert_eq!(report.primary_language, Language::English);
        assert!(report.score > 50.0);
    }

    #[test]
    fn mixed_text_is_not_claimed_by_one_language() {
        let report = scorer().score("中文和 English 混合的句子。");
        assert_eq!(report.primary_language, Language::Mixed);
    }

    #[test]
    fn rare_cjk_output_is_penalized() {
        let scorer = scorer();
        // Typical UTF-8-read-as-GBK residue: CJK ideographs far outside any
        // usage list.
        let noise = scorer.score("娑堟伅鍙戦€佹垚鍔");
        let real = scorer.score("消息发送成功了吗");
        assert!(noise.frequency_score < real.frequency_score);
    }

    #[test]
    fn repeated_symbols_cap_below_threshold() {
        let report = scorer().score(&"@".repeat(20));
        assert!(report.score <= 25.0);
    }

    #[test]
    fn repeated_letters_cap_at_thirty() {
        let report = scorer().score(&"a".repeat(12));
        assert!(report.score <= 30.0);
    }

    #[test]
    fn accented_text_is_rescued_from_zero() {
        let report = scorer().score("øøøæææåååøøøæææ");
        assert!(report.score >= 10.0);
    }

    #[test]
    fn short_strings_get_neutral_language_score() {
        let report = scorer().score("ab");
        assert_eq!(report.language_score, 50.0);
    }

    #[test]
    fn replacement_runs_hurt_structure() {
        let scorer = scorer();
        let clean = scorer.score("hello there, a clean line of text");
        let damaged = scorer.score("hello \u{FFFD}\u{FFFD} there \u{FFFD} line");
        assert!(damaged.structure_score < clean.structure_score);
    }

    #[test]
    fn analyze_counts_disjoint_classes() {
        let stats = analyze("中文 ab1。?");
        assert_eq!(stats.length, 8);
        assert_eq!(stats.chinese_count, 2);
        assert_eq!(stats.english_count, 2);
        assert_eq!(stats.number_count, 1);
        assert_eq!(stats.punctuation_count, 2);
        assert_eq!(stats.symbol_count, 0);
        let class_total = stats.chinese_count
            + stats.english_count
            + stats.number_count
            + stats.punctuation_count
            + stats.symbol_count;
        assert!(class_total <= stats.length);
    }

    #[test]
    fn classify_uses_mixed_before_single_language() {
        let stats = analyze("中文中文中 english text here");
        assert_eq!(classify_language(&stats), Language::Mixed);
    }

    #[test]
    fn count_runs_finds_maximal_runs() {
        assert_eq!(count_runs("ab???cd???e", |c| c == '?', 3), 2);
        assert_eq!(count_runs("??", |c| c == '?', 3), 0);
        assert_eq!(count_runs("???", |c| c == '?', 3), 1);
    }

    #[test]
    fn custom_tunables_change_the_blend() {
        let model = Arc::new(FrequencyModel::load().expect("frequency model"));
        let structure_only = CredibilityScorer::with_tunables(
            model.clone(),
            ScoringTunables {
                frequency_weight: 0.0,
                language_weight: 0.0,
                structure_weight: 1.0,
                ..ScoringTunables::default()
            },
        );
        let default = CredibilityScorer::new(model);
        let sample = "一段用于对比权重的中文文本。";
        assert_ne!(
            structure_only.score(sample).score,
            default.score(sample).score
        );
    }
}
