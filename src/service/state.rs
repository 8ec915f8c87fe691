// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Shared application state

use std::sync::Arc;

use super::responder::MockResponder;
use super::settings::Settings;
use super::vault::PiiVault;
use super::webpage::{WebpageError, WebpageFetcher};
use crate::scanner::PiiScanner;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<PiiScanner>,
    pub vault: Arc<PiiVault>,
    pub responder: Arc<MockResponder>,
    pub fetcher: Arc<WebpageFetcher>,
    pub max_input_chars: usize,
}

impl AppState {
    /// Build state from server settings; fails only if the HTTP client
    /// cannot be constructed
    pub fn new(scanner: PiiScanner, settings: &Settings) -> Result<Self, WebpageError> {
        Ok(Self {
            scanner: Arc::new(scanner),
            vault: Arc::new(PiiVault::new(settings.vault.clone())),
            responder: Arc::new(MockResponder::new()),
            fetcher: Arc::new(WebpageFetcher::new(&settings.webpage)?),
            max_input_chars: settings.max_input_chars,
        })
    }
}
