// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Server configuration loaded from the environment

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use std::time::Duration;

use super::vault::VaultConfig;
use super::webpage::WebpageConfig;
use crate::scanner::{ScannerConfig, SensitivityLevel};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Longest accepted message, in characters
    pub max_input_chars: usize,
    pub scanner: ScannerConfig,
    pub vault: VaultConfig,
    pub webpage: WebpageConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            max_input_chars: 20_000,
            scanner: ScannerConfig::default(),
            vault: VaultConfig::default(),
            webpage: WebpageConfig::default(),
        }
    }
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let mut scanner = ScannerConfig::default();

        if let Some(level) = lookup("PII_SHIELD_SENSITIVITY") {
            scanner.sensitivity = level
                .parse::<SensitivityLevel>()
                .context("PII_SHIELD_SENSITIVITY must be high, medium or low")?;
        }
        if let Some(flag) = lookup("PII_SHIELD_FALLBACK") {
            scanner.fallback_enabled = flag
                .parse()
                .context("PII_SHIELD_FALLBACK must be true or false")?;
        }
        if let Some(text) = lookup("PII_SHIELD_REDACTION_TEXT") {
            scanner.redaction_text = text;
        }

        let mut vault = defaults.vault;
        if let Some(max) = lookup("PII_SHIELD_VAULT_MAX_RECORDS") {
            vault.max_records = max
                .parse()
                .context("PII_SHIELD_VAULT_MAX_RECORDS must be a valid number")?;
        }
        if let Some(secs) = lookup("PII_SHIELD_VAULT_TTL_SECS") {
            let secs: u64 = secs
                .parse()
                .context("PII_SHIELD_VAULT_TTL_SECS must be a valid number")?;
            // 0 keeps records until evicted by capacity
            vault.ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        let mut webpage = defaults.webpage;
        if let Some(secs) = lookup("PII_SHIELD_WEBPAGE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("PII_SHIELD_WEBPAGE_TIMEOUT_SECS must be a valid number")?;
            webpage.timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = lookup("PII_SHIELD_WEBPAGE_MAX_BYTES") {
            webpage.max_bytes = bytes
                .parse()
                .context("PII_SHIELD_WEBPAGE_MAX_BYTES must be a valid number")?;
        }
        if let Some(flag) = lookup("PII_SHIELD_WEBPAGE_ALLOW_PRIVATE") {
            webpage.allow_private_hosts = flag
                .parse()
                .context("PII_SHIELD_WEBPAGE_ALLOW_PRIVATE must be true or false")?;
        }

        Ok(Self {
            host: lookup("PII_SHIELD_HOST").unwrap_or(defaults.host),
            port: match lookup("PORT") {
                Some(port) => port.parse().context("PORT must be a valid number")?,
                None => defaults.port,
            },
            max_input_chars: match lookup("PII_SHIELD_MAX_INPUT_CHARS") {
                Some(limit) => limit
                    .parse()
                    .context("PII_SHIELD_MAX_INPUT_CHARS must be a valid number")?,
                None => defaults.max_input_chars,
            },
            scanner,
            vault,
            webpage,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
