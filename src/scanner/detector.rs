// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Core PII detection: ordered pattern evaluation with first-found-wins
// overlap resolution

use std::ops::Range;

use serde::Serialize;

use super::config::{PiiCategory, ScannerConfig, SensitivityLevel};
use super::fallback::{RandomSource, ThreadRandom};
use super::masking;
use super::patterns::{compile_patterns, CompiledPatterns, PatternRule, FALLBACK_CONFIDENCE};
use super::ScanError;

/// One accepted match.
///
/// `start`/`end` are character offsets into the scanned text; `span` is the
/// same range in bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiiMatch {
    pub category: PiiCategory,
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub context: String,
    pub value: String,
    #[serde(skip)]
    pub span: Range<usize>,
}

/// One entry of the de-duplicated category list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHit {
    pub category: PiiCategory,
    pub label: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl CategoryHit {
    fn potential() -> Self {
        Self {
            category: PiiCategory::PotentialPii,
            label: PiiCategory::PotentialPii.label().to_string(),
            confidence: FALLBACK_CONFIDENCE,
            context: None,
        }
    }
}

/// Result of one scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub level: SensitivityLevel,
    pub detected: bool,
    pub categories: Vec<CategoryHit>,
    pub matches: Vec<PiiMatch>,
    pub sanitized_text: String,
    #[serde(skip)]
    pub placeholder: String,
}

impl ScanReport {
    /// True when the only finding is the synthesized fallback hit
    pub fn is_fallback_only(&self) -> bool {
        self.matches.is_empty() && self.detected
    }

    pub fn has_category(&self, category: PiiCategory) -> bool {
        self.categories.iter().any(|hit| hit.category == category)
    }
}

/// PII scanner with compiled patterns.
///
/// Cheap to share: scans take `&self` and keep no state between calls.
///
/// # Example
/// ```
/// use pii_shield::scanner::{NoFallback, PiiScanner, ScannerConfig, SensitivityLevel};
///
/// let scanner = PiiScanner::new(ScannerConfig::default()).unwrap();
/// let report = scanner.scan_with(
///     "My SSN is 123-45-6789",
///     SensitivityLevel::Medium,
///     &mut NoFallback,
/// );
/// assert!(report.detected);
/// assert_eq!(report.sanitized_text, "My SSN is [REDACTED]");
/// ```
#[derive(Debug, Clone)]
pub struct PiiScanner {
    patterns: CompiledPatterns,
    config: ScannerConfig,
}

impl PiiScanner {
    pub fn new(config: ScannerConfig) -> Result<Self, ScanError> {
        let patterns = compile_patterns(&config)?;
        tracing::debug!(
            rules = patterns.rules.len(),
            patterns = patterns.pattern_count(),
            "compiled PII patterns"
        );
        Ok(Self { patterns, config })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn patterns(&self) -> &CompiledPatterns {
        &self.patterns
    }

    /// Scan at the configured sensitivity level
    pub fn scan(&self, text: &str) -> ScanReport {
        self.scan_at(text, self.config.sensitivity)
    }

    pub fn scan_at(&self, text: &str, level: SensitivityLevel) -> ScanReport {
        self.scan_with(text, level, &mut ThreadRandom)
    }

    /// Scan with an explicit randomness source for the fallback heuristic
    pub fn scan_with<R>(&self, text: &str, level: SensitivityLevel, rng: &mut R) -> ScanReport
    where
        R: RandomSource + ?Sized,
    {
        let matches = self.detect(text);

        let mut categories: Vec<CategoryHit> = Vec::new();
        for m in &matches {
            let seen = categories
                .iter()
                .any(|hit| hit.category == m.category && hit.label == m.label);
            if !seen {
                categories.push(CategoryHit {
                    category: m.category,
                    label: m.label.clone(),
                    confidence: m.confidence,
                    context: Some(m.context.clone()),
                });
            }
        }

        if matches.is_empty() && self.config.fallback_enabled {
            let draw = rng.next_f64();
            if draw > level.threshold() {
                tracing::debug!(draw, threshold = level.threshold(), "fallback fired");
                categories.push(CategoryHit::potential());
            }
        }

        let sanitized_text =
            masking::redact_spans(text, &matches, &self.config.redaction_text).into_owned();

        if self.config.log_detections && !categories.is_empty() {
            let names: Vec<&str> = categories.iter().map(|hit| hit.category.as_str()).collect();
            tracing::debug!(
                level = %level,
                matches = matches.len(),
                categories = ?names,
                "PII detected"
            );
        }

        ScanReport {
            level,
            detected: !categories.is_empty(),
            categories,
            matches,
            sanitized_text,
            placeholder: self.config.redaction_text.clone(),
        }
    }

    /// Deterministic part of a scan: every accepted match in acceptance order
    pub fn detect(&self, text: &str) -> Vec<PiiMatch> {
        let mut accepted: Vec<PiiMatch> = Vec::new();

        // Prefilter: skip regexes that cannot match anywhere
        let hits = self.patterns.regex_set.matches(text);
        if !hits.matched_any() {
            return accepted;
        }

        let mut set_index = 0;
        for rule in &self.patterns.rules {
            for regex in rule.matcher.regexes() {
                let index = set_index;
                set_index += 1;
                if !hits.matched(index) {
                    continue;
                }

                for mat in regex.find_iter(text) {
                    // Zero-width matches carry nothing to redact
                    if mat.start() == mat.end() {
                        continue;
                    }
                    if self.is_whitelisted(mat.as_str()) {
                        continue;
                    }
                    if has_overlap(&accepted, mat.start(), mat.end()) {
                        continue;
                    }
                    accepted.push(self.build_match(text, rule, mat.range()));
                }
            }
        }

        accepted
    }

    /// Redacted copy of `text` (deterministic, no fallback)
    pub fn sanitize(&self, text: &str) -> String {
        let matches = self.detect(text);
        masking::redact_spans(text, &matches, &self.config.redaction_text).into_owned()
    }

    fn is_whitelisted(&self, value: &str) -> bool {
        self.patterns
            .whitelist
            .iter()
            .any(|pattern| pattern.is_match(value))
    }

    fn build_match(&self, text: &str, rule: &PatternRule, span: Range<usize>) -> PiiMatch {
        let start = text[..span.start].chars().count();
        let end = start + text[span.clone()].chars().count();
        PiiMatch {
            category: rule.category,
            label: rule.label.clone(),
            start,
            end,
            confidence: rule.confidence,
            context: context_window(text, &span, self.config.context_window).to_string(),
            value: text[span.clone()].to_string(),
            span,
        }
    }
}

/// Check a candidate byte range against accepted matches.
///
/// Bounds are inclusive, so ranges that only touch also conflict.
fn has_overlap(accepted: &[PiiMatch], start: usize, end: usize) -> bool {
    accepted.iter().any(|m| {
        let span = &m.span;
        (start >= span.start && start <= span.end)
            || (end >= span.start && end <= span.end)
            || (start <= span.start && end >= span.end)
    })
}

/// Up to `window` characters either side of `span`, clipped to the text
fn context_window<'a>(text: &'a str, span: &Range<usize>, window: usize) -> &'a str {
    let from = text[..span.start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(span.start);
    let tail = &text[span.end..];
    let to = span.end
        + tail
            .char_indices()
            .nth(window)
            .map(|(i, _)| i)
            .unwrap_or(tail.len());
    &text[from..to]
}
