// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Regex pattern tables and compilation for PII detection
// A RegexSet over every pattern acts as a prefilter; the individual regexes
// are still run in declaration order so first-found-wins stays deterministic.

use regex::{Regex, RegexBuilder, RegexSet};

use super::config::{PiiCategory, ScannerConfig};
use super::ScanError;

/// Confidence attached to every deterministic match
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Confidence of the synthesized "potential PII" fallback hit
pub const FALLBACK_CONFIDENCE: f64 = 0.75;

/// Uncompiled pattern definition
#[derive(Debug, Clone, Copy)]
pub enum PatternDef {
    Single(&'static str),
    AnyOf(&'static [&'static str]),
}

const CREDIT_CARD: &str = r"\b(?:\d{4}[- ]?){3}\d{4}\b";

const EMAIL: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

// NANP, optional +1 country code
const PHONE: &str = r"\b(?:\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})\b";

const SSN: &str = r"\b\d{3}[-]?\d{2}[-]?\d{4}\b";

const DATE_OF_BIRTH: &str = r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4}\b";

const ADDRESS: &str = r"(?i)\b\d+\s+[A-Za-z\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Way|Court|Ct|Plaza|Square|Sq|Trail|Trl|Parkway|Pkwy|Circle|Cir)\b,?(?:\s+[A-Za-z]+,)?\s+[A-Za-z]{2}\s+\d{5}(?:-\d{4})?\b";

const ACCOUNT_NUMBER: &str = r"\b[A-Z]\d{8}\b";

// Case-sensitive on purpose: capitalization is the whole signal
const PERSON_NAME: &str = r"\b(?:Mr\.|Mrs\.|Ms\.|Dr\.|Prof\.)?\s*[A-Z][a-z]+\s+[A-Z][a-z]+\b";

const MENTAL_HEALTH: &[&str] = &[
    r"(?i)depression",
    r"(?i)anxiety",
    r"(?i)trauma",
    r"(?i)panic\s*attack",
    r"(?i)bipolar",
    r"(?i)schizophrenia",
    r"(?i)eating\s*disorder",
    r"(?i)mental\s*health",
    r"(?i)therapy",
    r"(?i)counseling",
];

const PERSONAL_CRISIS: &[&str] = &[
    r"(?i)suicidal",
    r"(?i)self\s*harm",
    r"(?i)heartbreak",
    r"(?i)grief",
    r"(?i)divorce",
    r"(?i)bankruptcy",
    r"(?i)loss\s*of\s*job",
    r"(?i)financial\s*crisis",
    r"(?i)debt",
];

const MEDICAL: &[&str] = &[
    r"(?i)chronic\s*illness",
    r"(?i)diagnosis",
    r"(?i)medication",
    r"(?i)treatment",
    r"(?i)surgery",
    r"(?i)hospital",
    r"(?i)disease",
    r"(?i)cancer",
    r"(?i)hiv",
    r"(?i)aids",
];

const ABUSE: &[&str] = &[
    r"(?i)abuse",
    r"(?i)assault",
    r"(?i)harassment",
    r"(?i)violence",
    r"(?i)victim",
    r"(?i)trauma",
    r"(?i)ptsd",
    r"(?i)stalking",
];

const BIOMETRIC: &[&str] = &[
    r"(?i)fingerprint\s*(id|scan|data)?",
    r"(?i)retina\s*(scan|pattern)",
    r"(?i)iris\s*(scan|pattern|recognition)",
    r"(?i)facial\s*(recognition|scan|data)",
    r"(?i)voice\s*(print|pattern|recognition)",
    r"(?i)dna\s*(profile|sequence|data)",
    r"(?i)palm\s*(print|scan|vein)",
    r"(?i)gait\s*analysis",
    r"(?i)heartbeat\s*pattern",
];

const GENETIC: &[&str] = &[
    r"(?i)genetic\s*(profile|data|marker|test)",
    r"(?i)genome\s*(sequence|data)",
    r"(?i)dna\s*test\s*results?",
    r"(?i)chromosom(e|al)\s*(pattern|abnormality)",
    r"(?i)hereditary\s*condition",
    r"(?i)genetic\s*predisposition",
];

const BEHAVIORAL: &[&str] = &[
    r"(?i)browsing\s*history",
    r"(?i)search\s*patterns?",
    r"(?i)online\s*behavior",
    r"(?i)purchase\s*history",
    r"(?i)location\s*tracking",
    r"(?i)movement\s*patterns?",
    r"(?i)social\s*media\s*activity",
    r"(?i)device\s*usage\s*patterns?",
];

/// Built-in rules in evaluation order
pub const BUILTIN_PATTERNS: &[(PiiCategory, PatternDef)] = &[
    (PiiCategory::CreditCard, PatternDef::Single(CREDIT_CARD)),
    (PiiCategory::Email, PatternDef::Single(EMAIL)),
    (PiiCategory::Phone, PatternDef::Single(PHONE)),
    (PiiCategory::Ssn, PatternDef::Single(SSN)),
    (PiiCategory::DateOfBirth, PatternDef::Single(DATE_OF_BIRTH)),
    (PiiCategory::Address, PatternDef::Single(ADDRESS)),
    (PiiCategory::AccountNumber, PatternDef::Single(ACCOUNT_NUMBER)),
    (PiiCategory::PersonName, PatternDef::Single(PERSON_NAME)),
    (PiiCategory::MentalHealth, PatternDef::AnyOf(MENTAL_HEALTH)),
    (PiiCategory::PersonalCrisis, PatternDef::AnyOf(PERSONAL_CRISIS)),
    (PiiCategory::Medical, PatternDef::AnyOf(MEDICAL)),
    (PiiCategory::Abuse, PatternDef::AnyOf(ABUSE)),
    (PiiCategory::Biometric, PatternDef::AnyOf(BIOMETRIC)),
    (PiiCategory::Genetic, PatternDef::AnyOf(GENETIC)),
    (PiiCategory::Behavioral, PatternDef::AnyOf(BEHAVIORAL)),
];

/// Compiled matcher for one rule
#[derive(Debug, Clone)]
pub enum Matcher {
    Single(Regex),
    AnyOf(Vec<Regex>),
}

impl Matcher {
    /// Regexes in the order they are tried
    pub fn regexes(&self) -> &[Regex] {
        match self {
            Matcher::Single(regex) => std::slice::from_ref(regex),
            Matcher::AnyOf(regexes) => regexes,
        }
    }
}

/// Compiled rule with metadata
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub category: PiiCategory,
    pub matcher: Matcher,
    pub confidence: f64,
    pub label: String,
}

/// All compiled rules plus the RegexSet prefilter.
///
/// Index `i` of `regex_set` corresponds to the `i`-th regex when walking
/// `rules` in order and flattening each matcher.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub regex_set: RegexSet,
    pub rules: Vec<PatternRule>,
    pub whitelist: Vec<Regex>,
}

impl CompiledPatterns {
    /// Total number of individual regexes across all rules
    pub fn pattern_count(&self) -> usize {
        self.regex_set.len()
    }
}

fn build_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, ScanError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile the built-in tables plus the config's custom and whitelist patterns
pub fn compile_patterns(config: &ScannerConfig) -> Result<CompiledPatterns, ScanError> {
    let mut pattern_strings: Vec<String> = Vec::new();
    let mut rules = Vec::new();

    for (category, def) in BUILTIN_PATTERNS {
        if !config.is_enabled(*category) {
            continue;
        }
        // Case sensitivity is encoded per pattern with inline flags
        let matcher = match def {
            PatternDef::Single(pattern) => {
                pattern_strings.push(pattern.to_string());
                Matcher::Single(build_regex(pattern, false)?)
            }
            PatternDef::AnyOf(patterns) => {
                let mut regexes = Vec::with_capacity(patterns.len());
                for pattern in patterns.iter() {
                    pattern_strings.push(pattern.to_string());
                    regexes.push(build_regex(pattern, false)?);
                }
                Matcher::AnyOf(regexes)
            }
        };
        rules.push(PatternRule {
            category: *category,
            matcher,
            confidence: DEFAULT_CONFIDENCE,
            label: category.label().to_string(),
        });
    }

    if config.is_enabled(PiiCategory::Custom) {
        for custom in config.custom_patterns.iter().filter(|c| c.enabled) {
            // Custom patterns match case-insensitively, like the whitelist
            pattern_strings.push(format!("(?i){}", custom.pattern));
            rules.push(PatternRule {
                category: PiiCategory::Custom,
                matcher: Matcher::Single(build_regex(&custom.pattern, true)?),
                confidence: DEFAULT_CONFIDENCE,
                label: custom.description.clone(),
            });
        }
    }

    // Handle empty pattern set gracefully (all categories disabled)
    let regex_set = if pattern_strings.is_empty() {
        RegexSet::empty()
    } else {
        RegexSet::new(&pattern_strings).map_err(|source| ScanError::InvalidPattern {
            pattern: "<regex set>".to_string(),
            source,
        })?
    };

    let whitelist = config
        .whitelist_patterns
        .iter()
        .map(|pattern| build_regex(pattern, true))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledPatterns {
        regex_set,
        rules,
        whitelist,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::config::CustomPattern;

    fn find_all(category: PiiCategory, text: &str) -> Vec<String> {
        let compiled = compile_patterns(&ScannerConfig::default()).unwrap();
        let rule = compiled
            .rules
            .iter()
            .find(|rule| rule.category == category)
            .unwrap();
        rule.matcher
            .regexes()
            .iter()
            .flat_map(|regex| regex.find_iter(text).map(|m| m.as_str().to_string()))
            .collect()
    }

    #[test]
    fn test_compile_patterns() {
        let compiled = compile_patterns(&ScannerConfig::default()).unwrap();

        assert_eq!(compiled.rules.len(), BUILTIN_PATTERNS.len());
        let flattened: usize = compiled
            .rules
            .iter()
            .map(|rule| rule.matcher.regexes().len())
            .sum();
        assert_eq!(compiled.pattern_count(), flattened);
    }

    #[test]
    fn test_rule_order() {
        let compiled = compile_patterns(&ScannerConfig::default()).unwrap();
        let order: Vec<_> = compiled.rules.iter().map(|rule| rule.category).collect();
        assert_eq!(order[0], PiiCategory::CreditCard);
        assert_eq!(order[7], PiiCategory::PersonName);
        assert_eq!(order[8], PiiCategory::MentalHealth);
        assert_eq!(*order.last().unwrap(), PiiCategory::Behavioral);
    }

    #[test]
    fn test_credit_card_pattern() {
        assert_eq!(
            find_all(PiiCategory::CreditCard, "card 4111 1111 1111 1111 ok"),
            vec!["4111 1111 1111 1111"]
        );
        assert_eq!(
            find_all(PiiCategory::CreditCard, "4111111111111111"),
            vec!["4111111111111111"]
        );
    }

    #[test]
    fn test_phone_pattern() {
        assert_eq!(
            find_all(PiiCategory::Phone, "call (555) 123-4567"),
            vec!["555) 123-4567"]
        );
        assert_eq!(
            find_all(PiiCategory::Phone, "call +1 555.123.4567"),
            vec!["1 555.123.4567"]
        );
    }

    #[test]
    fn test_dob_is_case_insensitive() {
        assert_eq!(
            find_all(PiiCategory::DateOfBirth, "born on march 3, 1990"),
            vec!["march 3, 1990"]
        );
    }

    #[test]
    fn test_address_pattern() {
        assert_eq!(
            find_all(
                PiiCategory::Address,
                "Ship it to 42 Wallaby Way, Sydney, NS 20001 please"
            ),
            vec!["42 Wallaby Way, Sydney, NS 20001"]
        );
    }

    #[test]
    fn test_account_number_is_case_sensitive() {
        assert_eq!(find_all(PiiCategory::AccountNumber, "A12345678"), vec!["A12345678"]);
        assert!(find_all(PiiCategory::AccountNumber, "a12345678").is_empty());
    }

    #[test]
    fn test_person_name_pattern() {
        assert_eq!(
            find_all(PiiCategory::PersonName, "ask Dr. Jane Smith"),
            vec!["Dr. Jane Smith"]
        );
        // The optional leading whitespace is part of the match
        assert_eq!(
            find_all(PiiCategory::PersonName, "hello John Smith"),
            vec![" John Smith"]
        );
        assert!(find_all(PiiCategory::PersonName, "my email is here").is_empty());
    }

    #[test]
    fn test_person_name_is_case_sensitive() {
        assert!(find_all(PiiCategory::PersonName, "ask dr. jane smith").is_empty());
        assert!(find_all(PiiCategory::PersonName, "JANE SMITH").is_empty());
    }

    #[test]
    fn test_sensitive_lists() {
        assert_eq!(
            find_all(PiiCategory::MentalHealth, "Depression and ANXIETY"),
            vec!["Depression", "ANXIETY"]
        );
        assert_eq!(
            find_all(PiiCategory::Genetic, "my DNA test result came back"),
            vec!["DNA test result"]
        );
    }

    #[test]
    fn test_disabled_category_is_not_compiled() {
        let config = ScannerConfig {
            disabled_categories: vec![PiiCategory::PersonName, PiiCategory::Medical],
            ..Default::default()
        };
        let compiled = compile_patterns(&config).unwrap();
        assert!(compiled
            .rules
            .iter()
            .all(|rule| rule.category != PiiCategory::PersonName
                && rule.category != PiiCategory::Medical));
    }

    #[test]
    fn test_all_disabled_yields_empty_set() {
        let config = ScannerConfig {
            disabled_categories: PiiCategory::ALL.to_vec(),
            ..Default::default()
        };
        let compiled = compile_patterns(&config).unwrap();
        assert!(compiled.rules.is_empty());
        assert_eq!(compiled.pattern_count(), 0);
    }

    #[test]
    fn test_custom_pattern_appended_last() {
        let config = ScannerConfig {
            custom_patterns: vec![CustomPattern {
                pattern: r"EMP-\d{5}".to_string(),
                description: "Employee ID".to_string(),
                enabled: true,
            }],
            ..Default::default()
        };
        let compiled = compile_patterns(&config).unwrap();
        let last = compiled.rules.last().unwrap();
        assert_eq!(last.category, PiiCategory::Custom);
        assert_eq!(last.label, "Employee ID");
        assert!(last.matcher.regexes()[0].is_match("emp-12345"));
    }

    #[test]
    fn test_invalid_custom_pattern_is_reported() {
        let config = ScannerConfig {
            custom_patterns: vec![CustomPattern {
                pattern: "(unclosed".to_string(),
                description: "broken".to_string(),
                enabled: true,
            }],
            ..Default::default()
        };
        assert!(matches!(
            compile_patterns(&config),
            Err(ScanError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_whitelist_is_reported() {
        let config = ScannerConfig {
            whitelist_patterns: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(compile_patterns(&config).is_err());
    }
}
