// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Canned assistant replies for the demo chat

use crate::scanner::ScanReport;

/// Reply when nothing was redacted; the chat client shows the same line
/// when a response carries no reply
pub const DEFAULT_REPLY: &str = "I've processed your message.";

/// Stand-in for the chat model: picks a reply from the sanitized text only
#[derive(Debug, Clone, Default)]
pub struct MockResponder;

impl MockResponder {
    pub fn new() -> Self {
        Self
    }

    /// Reply to a chat message
    pub fn reply(&self, report: &ScanReport) -> String {
        let sanitized = report.sanitized_text.as_str();
        let redacted = !report.placeholder.is_empty() && sanitized.contains(&report.placeholder);

        if report.detected || redacted {
            format!(
                "I've received your message and protected {} pieces of personal information. \
                 Here's a non-identifying response based on your input.",
                report.pii_items().len()
            )
        } else {
            DEFAULT_REPLY.to_string()
        }
    }

    /// Reply to a scanned webpage
    pub fn webpage_reply(&self, url: &str, report: &ScanReport) -> String {
        format!(
            "I've processed the webpage at {} and found {} pieces of personal information. \
             The content has been secured.",
            url,
            report.pii_items().len()
        )
    }
}
