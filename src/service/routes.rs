// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use super::vault::{PiiRecord, UserKey};
use crate::scanner::{PiiItem, SensitivityLevel};

/// Header carrying the caller's user id; absent means anonymous
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Image,
    Audio,
    Webpage,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Audio => "audio",
            ContentType::Webpage => "webpage",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageRequest {
    /// Message text; required for `text` content
    #[serde(default)]
    pub text: Option<String>,
    /// Page address; required for `webpage` content
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub detection_level: Option<SensitivityLevel>,
    #[serde(default)]
    pub content_type: ContentType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageResponse {
    pub sanitized_text: String,
    pub pii_detected: bool,
    pub pii_count: usize,
    pub pii_items: Vec<PiiItem>,
    pub llm_response: String,
    pub detection_level: SensitivityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub patterns: usize,
    pub stored_records: usize,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running",
        patterns: state.scanner.patterns().pattern_count(),
        stored_records: state.vault.len().await,
    })
}

fn user_from_headers(headers: &HeaderMap) -> Result<UserKey, ApiError> {
    match headers.get(USER_ID_HEADER) {
        None => Ok(UserKey::Anonymous),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "{} must be a numeric id or 'anonymous'",
                    USER_ID_HEADER
                ))
            }),
    }
}

/// Scan a chat message or webpage, store its findings and answer with a
/// mock reply
pub async fn process_message_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ProcessMessageRequest>, JsonRejection>,
) -> Result<Json<ProcessMessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let user = user_from_headers(&headers)?;

    let (text, source_url) = match request.content_type {
        ContentType::Text => {
            let text = request
                .text
                .ok_or_else(|| ApiError::BadRequest("text is required".to_string()))?;
            if text.chars().count() > state.max_input_chars {
                return Err(ApiError::PayloadTooLarge {
                    limit: state.max_input_chars,
                });
            }
            (text, None)
        }
        ContentType::Webpage => {
            let url = request
                .url
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| ApiError::BadRequest("url is required".to_string()))?;
            let text = state.fetcher.fetch_text(&url).await?;
            (text, Some(url))
        }
        other => {
            return Err(ApiError::UnsupportedContentType(other.as_str().to_string()));
        }
    };

    let level = request
        .detection_level
        .unwrap_or(state.scanner.config().sensitivity);

    // Regex matching is CPU-bound; keep it off the async workers
    let scanner = state.scanner.clone();
    let report = tokio::task::spawn_blocking(move || scanner.scan_at(&text, level))
        .await
        .map_err(|e| ApiError::Internal(format!("scan task failed: {}", e)))?;

    let pii_items = report.pii_items();
    let llm_response = match &source_url {
        Some(url) => state.responder.webpage_reply(url, &report),
        None => state.responder.reply(&report),
    };

    let session_id = if report.detected {
        let session_id = format!("session-{}", Uuid::new_v4());
        let record = PiiRecord {
            session_id: session_id.clone(),
            timestamp: Utc::now(),
            user_id: user,
            pii_items: pii_items.clone(),
            summary: report.summary(),
        };
        state.vault.store(user, &session_id, record).await;
        Some(session_id)
    } else {
        None
    };

    Ok(Json(ProcessMessageResponse {
        sanitized_text: report.sanitized_text,
        pii_detected: report.detected,
        pii_count: pii_items.len(),
        pii_items,
        llm_response,
        detection_level: level,
        session_id,
    }))
}

/// Fetch a stored PII record
pub async fn get_pii_handler(
    State(state): State<AppState>,
    Path((user, session_id)): Path<(String, String)>,
) -> Result<Json<PiiRecord>, ApiError> {
    let user: UserKey = user
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid user id '{}'", user)))?;

    state
        .vault
        .get(user, &session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no record for {}:{}", user, session_id)))
}
