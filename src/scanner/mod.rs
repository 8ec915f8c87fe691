// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII Scanner
//
// Regex-based PII and sensitive-topic detection with redaction:
// - Ordered rule evaluation, first-found-wins overlap resolution
// - RegexSet prefilter so rules that cannot match are skipped
// - Non-backtracking regex engine, linear in input length

pub mod config;
pub mod detector;
pub mod fallback;
pub mod masking;
pub mod patterns;
pub mod report;

use thiserror::Error;

pub use config::{CustomPattern, PiiCategory, ScannerConfig, SensitivityLevel};
pub use detector::{CategoryHit, PiiMatch, PiiScanner, ScanReport};
pub use fallback::{FixedRandom, NoFallback, RandomSource, ThreadRandom};
pub use report::{PiiItem, RedactionSummary};

/// Errors raised while building a scanner or parsing its inputs
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown sensitivity level '{0}'")]
    UnknownSensitivity(String),

    #[error("unknown PII category '{0}'")]
    UnknownCategory(String),
}
