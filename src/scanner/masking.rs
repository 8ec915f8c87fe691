// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Redaction of accepted matches

use sha2::{Digest, Sha256};
use std::borrow::Cow;

use super::detector::PiiMatch;

/// Replace every match span in `text` with `placeholder`
///
/// # Arguments
/// * `text` - Original text the matches were found in
/// * `matches` - Accepted, non-overlapping matches
/// * `placeholder` - Replacement written over each span
///
/// # Returns
/// Redacted text; borrowed when there is nothing to replace
pub fn redact_spans<'a>(text: &'a str, matches: &[PiiMatch], placeholder: &str) -> Cow<'a, str> {
    if matches.is_empty() {
        // Zero-copy when no masking needed
        return Cow::Borrowed(text);
    }

    let mut spans: Vec<_> = matches.iter().map(|m| m.span.clone()).collect();

    // Highest start first so earlier offsets stay valid
    spans.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = text.to_string();
    for span in spans {
        result.replace_range(span, placeholder);
    }

    Cow::Owned(result)
}

/// Short non-reversible fingerprint of a matched value: `abcd...wxyz`
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}...{}", &digest[..4], &digest[digest.len() - 4..])
}
