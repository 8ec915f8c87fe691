// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Wire-facing rendering of scan results

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::PiiCategory;
use super::detector::ScanReport;
use super::masking::fingerprint;

/// One reported finding, safe to hand to the UI or to storage.
///
/// The matched value itself is never included; `hash` identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiItem {
    #[serde(rename = "type")]
    pub label: String,
    pub category: PiiCategory,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub value: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[usize; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Per-category counts and confidence buckets for one report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RedactionSummary {
    pub counts: BTreeMap<String, usize>,
    pub confidence: ConfidenceDistribution,
    pub total: usize,
}

impl ScanReport {
    /// One item per accepted match, plus the fallback hit if it fired
    pub fn pii_items(&self) -> Vec<PiiItem> {
        let mut items: Vec<PiiItem> = self
            .matches
            .iter()
            .map(|m| PiiItem {
                label: m.label.clone(),
                category: m.category,
                confidence: m.confidence,
                context: Some(m.context.clone()),
                value: self.placeholder.clone(),
                hash: fingerprint(&m.value),
                position: Some([m.start, m.end]),
            })
            .collect();

        if let Some(hit) = self
            .categories
            .iter()
            .find(|hit| hit.category == PiiCategory::PotentialPii)
        {
            items.push(PiiItem {
                label: hit.label.clone(),
                category: hit.category,
                confidence: hit.confidence,
                context: None,
                value: self.placeholder.clone(),
                hash: fingerprint(""),
                position: None,
            });
        }

        items
    }

    pub fn summary(&self) -> RedactionSummary {
        let mut summary = RedactionSummary::default();
        for item in self.pii_items() {
            *summary.counts.entry(item.category.to_string()).or_default() += 1;
            match item.confidence {
                c if c >= 0.9 => summary.confidence.high += 1,
                c if c >= 0.7 => summary.confidence.medium += 1,
                _ => summary.confidence.low += 1,
            }
            summary.total += 1;
        }
        summary
    }
}
