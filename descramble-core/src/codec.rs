//! Codec resolution and the per-pair recovery chain.
//!
//! Encoding names are resolved to a closed set of codecs backed by
//! `encoding_rs`, so an unresolvable label is a value-level failure instead
//! of a stringly-typed lookup at every call. Each hypothesis pair is tried
//! through an ordered chain of recovery passes: the native codec transcode
//! first, then the rule-based substitution fallback.

use std::collections::BTreeMap;
use std::fmt;

use encoding_rs::Encoding;

use crate::config::CatalogConfig;
use crate::domain::{EncodingPair, PairCategory};

/// Supported byte codecs, each bound to an `encoding_rs` implementation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Codec {
    /// UTF-8.
    Utf8,
    /// GBK (also covers GB2312 labels).
    Gbk,
    /// GB18030.
    Gb18030,
    /// Big5.
    Big5,
    /// Shift_JIS.
    ShiftJis,
    /// EUC-JP.
    EucJp,
    /// ISO-2022-JP.
    Iso2022Jp,
    /// EUC-KR.
    EucKr,
    /// Windows-1252 (also serves ISO-8859-1 labels, WHATWG behavior).
    Windows1252,
    /// ISO-8859-15.
    Iso8859_15,
}

impl Codec {
    /// Resolve a codec from an encoding label.
    ///
    /// `iso-8859-1` resolves to the Windows-1252 codec, matching WHATWG
    /// label resolution. Returns `None` for labels outside the closed set.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "gbk" | "gb2312" | "cp936" => Some(Self::Gbk),
            "gb18030" => Some(Self::Gb18030),
            "big5" | "big5-hkscs" => Some(Self::Big5),
            "shift_jis" | "shift-jis" | "sjis" | "cp932" => Some(Self::ShiftJis),
            "euc-jp" | "eucjp" => Some(Self::EucJp),
            "iso-2022-jp" => Some(Self::Iso2022Jp),
            "euc-kr" | "euckr" | "cp949" => Some(Self::EucKr),
            "windows-1252" | "cp1252" | "iso-8859-1" | "latin1" => Some(Self::Windows1252),
            "iso-8859-15" | "latin9" => Some(Self::Iso8859_15),
            _ => None,
        }
    }

    /// Canonical label of this codec.
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gbk => "gbk",
            Self::Gb18030 => "gb18030",
            Self::Big5 => "big5",
            Self::ShiftJis => "shift_jis",
            Self::EucJp => "euc-jp",
            Self::Iso2022Jp => "iso-2022-jp",
            Self::EucKr => "euc-kr",
            Self::Windows1252 => "windows-1252",
            Self::Iso8859_15 => "iso-8859-15",
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gbk => encoding_rs::GBK,
            Self::Gb18030 => encoding_rs::GB18030,
            Self::Big5 => encoding_rs::BIG5,
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::EucJp => encoding_rs::EUC_JP,
            Self::Iso2022Jp => encoding_rs::ISO_2022_JP,
            Self::EucKr => encoding_rs::EUC_KR,
            Self::Windows1252 => encoding_rs::WINDOWS_1252,
            Self::Iso8859_15 => encoding_rs::ISO_8859_15,
        }
    }

    /// Encode text into this codec's bytes.
    ///
    /// Fails when any character has no representation in the codec.
    pub fn encode(self, text: &str) -> std::result::Result<Vec<u8>, TrialFailure> {
        let (bytes, _, had_errors) = self.encoding().encode(text);
        if had_errors {
            return Err(TrialFailure::Unrepresentable(self.label()));
        }
        Ok(bytes.into_owned())
    }

    /// Decode bytes under this codec.
    ///
    /// Invalid sequences become U+FFFD; the decode fails outright only when
    /// nothing but replacement output remains, since a partially damaged
    /// candidate still carries signal the scorer can judge.
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, TrialFailure> {
        let (text, _, _) = self.encoding().decode(bytes);
        let decoded = text.into_owned();
        if decoded.is_empty()
            || decoded
                .chars()
                .all(|c| c == char::REPLACEMENT_CHARACTER || c.is_whitespace())
        {
            return Err(TrialFailure::Undecodable(self.label()));
        }
        Ok(decoded)
    }
}

/// Why a single hypothesis pair produced no candidate.
///
/// These are per-pair outcomes the engine recovers from silently; they never
/// cross the public error boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialFailure {
    /// An encoding label outside the codec layer's closed set.
    UnsupportedEncoding(String),
    /// A character in the input has no representation in the source codec.
    Unrepresentable(&'static str),
    /// The re-encoded bytes decoded to nothing but replacement output.
    Undecodable(&'static str),
    /// No substitution rule applied to the input.
    NotApplicable,
}

impl fmt::Display for TrialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedEncoding(label) => write!(f, "unsupported encoding: {label}"),
            Self::Unrepresentable(label) => {
                write!(f, "character not representable in {label}")
            }
            Self::Undecodable(label) => write!(f, "bytes not decodable as {label}"),
            Self::NotApplicable => write!(f, "no substitution applied"),
        }
    }
}

/// One step in the ordered recovery chain for a hypothesis pair.
#[cfg_attr(test, mockall::automock)]
pub trait RecoveryPass {
    /// Short identifier used in trace logs.
    fn name(&self) -> &'static str;
    /// Attempt to reverse the pair's misinterpretation.
    fn attempt(&self, text: &str, pair: &EncodingPair)
    -> std::result::Result<String, TrialFailure>;
}

/// Native codec transcode: re-encode under the presumed wrong encoding, then
/// re-decode the bytes under the presumed right one.
#[derive(Debug, Default, Clone)]
pub struct NativeCodecPass;

impl RecoveryPass for NativeCodecPass {
    fn name(&self) -> &'static str {
        "native-codec"
    }

    fn attempt(
        &self,
        text: &str,
        pair: &EncodingPair,
    ) -> std::result::Result<String, TrialFailure> {
        let source = Codec::from_label(&pair.source_encoding)
            .ok_or_else(|| TrialFailure::UnsupportedEncoding(pair.source_encoding.clone()))?;
        let target = Codec::from_label(&pair.target_encoding)
            .ok_or_else(|| TrialFailure::UnsupportedEncoding(pair.target_encoding.clone()))?;
        let bytes = source.encode(text)?;
        target.decode(&bytes)
    }
}

/// Rule-based substitution fallback for pairs the native codecs reject.
///
/// Strictly lower coverage than a real transcode; it exists so that known
/// garbled sequences are still corrected when the codec path fails.
#[derive(Debug, Clone)]
pub struct SubstitutionPass {
    maps: BTreeMap<PairCategory, Vec<(String, String)>>,
}

impl SubstitutionPass {
    /// Build the per-category substitution tables from catalog configuration.
    ///
    /// Chinese pairs use the `gbkToUtf8` map and Western pairs the
    /// `latin1ToUtf8` map; the `htmlEntities` map applies to every category.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let categories = [
            (PairCategory::Chinese, Some("gbkToUtf8")),
            (PairCategory::Western, Some("latin1ToUtf8")),
            (PairCategory::Japanese, None),
            (PairCategory::Korean, None),
            (PairCategory::UnicodeErrors, None),
            (PairCategory::Dynamic, None),
        ];

        let mut maps = BTreeMap::new();
        for (category, map_name) in categories {
            let mut rules: Vec<(String, String)> = Vec::new();
            if let Some(name) = map_name {
                if let Some(map) = config.replacement_map(name) {
                    rules.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            if let Some(entities) = config.replacement_map("htmlEntities") {
                rules.extend(entities.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            // Longest garbled sequence first, so prefixes never shadow it.
            rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
            maps.insert(category, rules);
        }
        Self { maps }
    }
}

impl RecoveryPass for SubstitutionPass {
    fn name(&self) -> &'static str {
        "substitution"
    }

    fn attempt(
        &self,
        text: &str,
        pair: &EncodingPair,
    ) -> std::result::Result<String, TrialFailure> {
        let rules = self
            .maps
            .get(&pair.category)
            .filter(|rules| !rules.is_empty())
            .ok_or(TrialFailure::NotApplicable)?;

        let mut fixed = text.to_string();
        for (garbled, correct) in rules {
            if fixed.contains(garbled.as_str()) {
                fixed = fixed.replace(garbled.as_str(), correct);
            }
        }
        if fixed == text {
            return Err(TrialFailure::NotApplicable);
        }
        Ok(fixed)
    }
}
