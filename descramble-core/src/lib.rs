#![deny(missing_docs)]
//! Descramble core library.
//!
//! Recovers human-readable text from mojibake: a string decoded once with
//! the wrong character encoding. The engine searches a catalog of
//! encoding-misinterpretation hypotheses, re-runs the transcoding for each,
//! scores every candidate for how much it resembles real language, and
//! returns the best-scoring candidates ranked.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod detect;
pub mod domain;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod scorer;

pub use catalog::EncodingCatalog;
pub use codec::{Codec, NativeCodecPass, RecoveryPass, SubstitutionPass, TrialFailure};
pub use config::{AutoDetectionRules, CatalogConfig, StrategyConfig};
pub use detect::HeuristicTextDetector;
pub use domain::{
    BatchItem, CredibilityReport, EncodingInfo, EncodingPair, Language, PairCategory,
    RecoveryOptions, RecoveryResult, Strategy, TextStats,
};
pub use engine::RecoveryEngine;
pub use error::{DescrambleError, Result};
pub use frequency::FrequencyModel;
pub use scorer::{CredibilityScorer, ScoringTunables};
