// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the PII scanner

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::ScanError;

/// Categories of PII and sensitive information the scanner reports.
///
/// Declaration order is evaluation order: structured identifiers first,
/// then the sensitive-topic keyword lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    CreditCard,
    Email,
    Phone,
    Ssn,
    DateOfBirth,
    Address,
    AccountNumber,
    PersonName,
    MentalHealth,
    PersonalCrisis,
    Medical,
    Abuse,
    Biometric,
    Genetic,
    Behavioral,
    PotentialPii,
    Custom,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 17] = [
        PiiCategory::CreditCard,
        PiiCategory::Email,
        PiiCategory::Phone,
        PiiCategory::Ssn,
        PiiCategory::DateOfBirth,
        PiiCategory::Address,
        PiiCategory::AccountNumber,
        PiiCategory::PersonName,
        PiiCategory::MentalHealth,
        PiiCategory::PersonalCrisis,
        PiiCategory::Medical,
        PiiCategory::Abuse,
        PiiCategory::Biometric,
        PiiCategory::Genetic,
        PiiCategory::Behavioral,
        PiiCategory::PotentialPii,
        PiiCategory::Custom,
    ];

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiCategory::CreditCard => "credit_card",
            PiiCategory::Email => "email",
            PiiCategory::Phone => "phone",
            PiiCategory::Ssn => "ssn",
            PiiCategory::DateOfBirth => "date_of_birth",
            PiiCategory::Address => "address",
            PiiCategory::AccountNumber => "account_number",
            PiiCategory::PersonName => "person_name",
            PiiCategory::MentalHealth => "mental_health",
            PiiCategory::PersonalCrisis => "personal_crisis",
            PiiCategory::Medical => "medical",
            PiiCategory::Abuse => "abuse",
            PiiCategory::Biometric => "biometric",
            PiiCategory::Genetic => "genetic",
            PiiCategory::Behavioral => "behavioral",
            PiiCategory::PotentialPii => "potential_pii",
            PiiCategory::Custom => "custom",
        }
    }

    /// Human readable label shown next to a finding
    pub fn label(&self) -> &'static str {
        match self {
            PiiCategory::CreditCard => "Credit Card",
            PiiCategory::Email => "Email",
            PiiCategory::Phone => "Phone Number",
            PiiCategory::Ssn => "SSN",
            PiiCategory::DateOfBirth => "Date of Birth",
            PiiCategory::Address => "Address",
            PiiCategory::AccountNumber => "Account Number",
            PiiCategory::PersonName => "Person Name",
            PiiCategory::MentalHealth => "Mental Health",
            PiiCategory::PersonalCrisis => "Personal Crisis",
            PiiCategory::Medical => "Medical Information",
            PiiCategory::Abuse => "Sensitive Personal Info",
            PiiCategory::Biometric => "Biometric Data",
            PiiCategory::Genetic => "Genetic Information",
            PiiCategory::Behavioral => "Behavioral Data",
            PiiCategory::PotentialPii => "Potential PII",
            PiiCategory::Custom => "Custom",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiCategory {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PiiCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ScanError::UnknownCategory(s.to_string()))
    }
}

/// How eagerly the scanner reports "potential PII" when no pattern matched.
///
/// The thresholds are a lookup table: a lower threshold makes the random
/// fallback fire more often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SensitivityLevel {
    #[serde(rename = "High (Sensitive)")]
    High,
    #[default]
    #[serde(rename = "Medium (Standard)")]
    Medium,
    #[serde(rename = "Low (Minimal)")]
    Low,
}

impl SensitivityLevel {
    pub fn threshold(&self) -> f64 {
        match self {
            SensitivityLevel::High => 0.70,
            SensitivityLevel::Medium => 0.85,
            SensitivityLevel::Low => 0.95,
        }
    }

    /// Label used by the demo UI and the JSON API
    pub fn label(&self) -> &'static str {
        match self {
            SensitivityLevel::High => "High (Sensitive)",
            SensitivityLevel::Medium => "Medium (Standard)",
            SensitivityLevel::Low => "Low (Minimal)",
        }
    }

    /// Parse a level, falling back to `Medium` for anything unrecognized.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(level = value, "unrecognized sensitivity level, using Medium");
            SensitivityLevel::Medium
        })
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SensitivityLevel {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        for level in [
            SensitivityLevel::High,
            SensitivityLevel::Medium,
            SensitivityLevel::Low,
        ] {
            let short = level.label().split_whitespace().next().unwrap_or_default();
            if trimmed.eq_ignore_ascii_case(level.label()) || trimmed.eq_ignore_ascii_case(short) {
                return Ok(level);
            }
        }
        Err(ScanError::UnknownSensitivity(s.to_string()))
    }
}

// Accepts exactly what `FromStr` accepts
impl<'de> Deserialize<'de> for SensitivityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Caller-supplied pattern reported under [`PiiCategory::Custom`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Configuration for the PII scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Level used by [`PiiScanner::scan`](super::PiiScanner::scan)
    pub sensitivity: SensitivityLevel,
    /// Placeholder written over every redacted span
    pub redaction_text: String,
    /// Characters of context kept on each side of a match
    pub context_window: usize,
    /// Whether the random "potential PII" fallback may fire at all
    pub fallback_enabled: bool,
    pub log_detections: bool,

    pub disabled_categories: Vec<PiiCategory>,
    pub custom_patterns: Vec<CustomPattern>,

    // Whitelist patterns (regex strings)
    pub whitelist_patterns: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            sensitivity: SensitivityLevel::Medium,
            redaction_text: "[REDACTED]".to_string(),
            context_window: 30,
            fallback_enabled: true,
            log_detections: true,
            disabled_categories: Vec::new(),
            custom_patterns: Vec::new(),
            whitelist_patterns: Vec::new(),
        }
    }
}

impl ScannerConfig {
    pub fn is_enabled(&self, category: PiiCategory) -> bool {
        !self.disabled_categories.contains(&category)
    }
}
