//! Character frequency model backing the credibility scorer.
//!
//! The CJK table ships as a JSON asset derived offline from a corpus
//! frequency list. At load time it is filtered to CJK and fullwidth ranges,
//! merged with empirical punctuation frequencies, and combined with built-in
//! Latin-letter and digit tables into one lookup. The CJK-only sub-table is
//! kept separately for the zero/low-frequency penalty logic.

use std::collections::HashMap;

use crate::error::Result;

const CHINESE_FREQUENCY_JSON: &str = include_str!("../data/chinese-frequency.json");

/// English letter frequencies, from standard English text statistics.
const ENGLISH_FREQUENCY: &[(char, u32)] = &[
    ('e', 1270),
    ('t', 906),
    ('a', 817),
    ('o', 751),
    ('i', 697),
    ('n', 675),
    ('s', 633),
    ('h', 609),
    ('r', 599),
    ('d', 425),
    ('l', 403),
    ('c', 278),
    ('u', 276),
    ('m', 241),
    ('w', 236),
    ('f', 223),
    ('g', 202),
    ('y', 197),
    ('p', 193),
    ('b', 129),
    ('v', 98),
    ('k', 77),
    ('j', 15),
    ('x', 15),
    ('q', 10),
    ('z', 7),
    ('E', 127),
    ('T', 91),
    ('A', 82),
    ('O', 75),
    ('I', 70),
    ('N', 68),
    ('S', 63),
    ('H', 61),
    ('R', 60),
    ('D', 43),
    ('L', 40),
    ('C', 28),
    ('U', 28),
    ('M', 24),
    ('W', 24),
    ('F', 22),
    ('G', 20),
    ('Y', 20),
    ('P', 19),
    ('B', 13),
    ('V', 10),
    ('K', 8),
    ('J', 2),
    ('X', 2),
    ('Q', 1),
    ('Z', 1),
];

const DIGIT_FREQUENCY: &[(char, u32)] = &[
    ('0', 100),
    ('1', 120),
    ('2', 110),
    ('3', 105),
    ('4', 100),
    ('5', 98),
    ('6', 96),
    ('7', 94),
    ('8', 92),
    ('9', 90),
];

/// CJK punctuation frequencies, empirical.
const PUNCTUATION_FREQUENCY: &[(char, u32)] = &[
    ('。', 2000),
    ('，', 1800),
    ('、', 500),
    ('？', 300),
    ('！', 200),
    ('：', 150),
    ('；', 100),
    ('“', 80),
    ('”', 80),
    ('‘', 60),
    ('’', 60),
    ('（', 40),
    ('）', 40),
    ('【', 20),
    ('】', 20),
    ('《', 15),
    ('》', 15),
];

/// Read-only character frequency lookup.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    combined: HashMap<char, u32>,
    chinese: HashMap<char, u32>,
}

impl FrequencyModel {
    /// Load the embedded CJK table and merge the built-in tables.
    pub fn load() -> Result<Self> {
        let raw: HashMap<String, u32> = serde_json::from_str(CHINESE_FREQUENCY_JSON)?;
        Ok(Self::from_table(raw))
    }

    /// Build a model from a caller-provided CJK frequency table.
    ///
    /// Entries that are not a single character in the CJK, fullwidth, or
    /// recognized-punctuation ranges are dropped.
    pub fn from_table(raw: HashMap<String, u32>) -> Self {
        let mut chinese: HashMap<char, u32> = HashMap::new();
        for (key, frequency) in raw {
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                continue;
            };
            if retains(c) {
                chinese.insert(c, frequency);
            }
        }
        for &(c, frequency) in PUNCTUATION_FREQUENCY {
            chinese.insert(c, frequency);
        }

        let mut combined = chinese.clone();
        for &(c, frequency) in ENGLISH_FREQUENCY.iter().chain(DIGIT_FREQUENCY) {
            combined.insert(c, frequency);
        }

        Self { combined, chinese }
    }

    /// Frequency of a character in the combined lookup.
    pub fn combined(&self, c: char) -> Option<u32> {
        self.combined.get(&c).copied()
    }

    /// Frequency of a character in the CJK sub-table; `0` when absent.
    pub fn chinese(&self, c: char) -> u32 {
        self.chinese.get(&c).copied().unwrap_or(0)
    }
}

fn retains(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' | '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}')
        || PUNCTUATION_FREQUENCY.iter().any(|&(p, _)| p == c)
}

#[cfg(test)]
mod tests {
    use super::FrequencyModel;
    use std::collections::HashMap;

    #[test]
    fn load_merges_all_tables() {
        let model = FrequencyModel::load().expect("frequency model");
        assert_eq!(model.combined('的'), Some(4887));
        assert_eq!(model.combined('e'), Some(1270));
        assert_eq!(model.combined('1'), Some(120));
        assert_eq!(model.combined('。'), Some(2000));
    }

    #[test]
    fn chinese_sub_table_excludes_latin() {
        let model = FrequencyModel::load().expect("frequency model");
        assert!(model.chinese('的') > 0);
        assert_eq!(model.chinese('e'), 0);
    }

    #[test]
    fn absent_characters_report_zero() {
        let model = FrequencyModel::load().expect("frequency model");
        // 齉 is far outside any common-usage list.
        assert_eq!(model.chinese('齉'), 0);
        assert_eq!(model.combined('齉'), None);
    }

    #[test]
    fn from_table_filters_non_cjk_entries() {
        let mut raw = HashMap::new();
        raw.insert("中".to_string(), 500);
        raw.insert("e".to_string(), 999);
        raw.insert("中文".to_string(), 10);

        let model = FrequencyModel::from_table(raw);
        assert_eq!(model.chinese('中'), 500);
        // The Latin entry is dropped from the CJK table; the built-in
        // English table still supplies it in the combined lookup.
        assert_eq!(model.combined('e'), Some(1270));
    }
}
