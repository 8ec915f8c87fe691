// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// In-memory PII vault keyed by user and session

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::sync::RwLock;

use crate::scanner::{PiiItem, RedactionSummary};

/// Owner of a stored record: a numeric user id or `anonymous`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserKey {
    Id(i64),
    #[default]
    Anonymous,
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserKey::Id(id) => write!(f, "{}", id),
            UserKey::Anonymous => f.write_str("anonymous"),
        }
    }
}

impl FromStr for UserKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "anonymous" => Ok(UserKey::Anonymous),
            other => other.parse().map(UserKey::Id),
        }
    }
}

impl Serialize for UserKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UserKey::Id(id) => serializer.serialize_i64(*id),
            UserKey::Anonymous => serializer.serialize_str("anonymous"),
        }
    }
}

/// What gets stored for a message that contained PII
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiRecord {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserKey,
    pub pii_items: Vec<PiiItem>,
    pub summary: RedactionSummary,
}

/// Limits for the vault
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Records kept before the oldest is evicted
    pub max_records: usize,
    /// Age after which a record is dropped (None = never)
    pub ttl: Option<Duration>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_records: 10_000,
            ttl: Some(Duration::from_secs(24 * 60 * 60)),
        }
    }
}

#[derive(Debug)]
struct StoredRecord {
    record: PiiRecord,
    inserted_at: Instant,
    insertion_order: u64,
}

#[derive(Debug, Default)]
struct VaultStorage {
    data: HashMap<String, StoredRecord>,
    insertion_counter: u64,
}

/// Shared store of PII records, bounded in size and age
#[derive(Debug, Default)]
pub struct PiiVault {
    config: VaultConfig,
    storage: RwLock<VaultStorage>,
}

impl PiiVault {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            storage: RwLock::default(),
        }
    }

    fn key(user: UserKey, session_id: &str) -> String {
        format!("{}:{}", user, session_id)
    }

    fn is_expired(&self, entry: &StoredRecord) -> bool {
        match self.config.ttl {
            Some(ttl) => entry.inserted_at.elapsed() > ttl,
            None => false,
        }
    }

    /// Store a record, replacing any previous one for the same key.
    ///
    /// Expired records are purged first; if the vault is still full the
    /// oldest record is evicted.
    pub async fn store(&self, user: UserKey, session_id: &str, record: PiiRecord) {
        let key = Self::key(user, session_id);
        let items = record.pii_items.len();

        let mut storage = self.storage.write().await;
        storage.data.retain(|_, entry| !self.is_expired(entry));

        if storage.data.len() >= self.config.max_records && !storage.data.contains_key(&key) {
            let oldest = storage
                .data
                .iter()
                .min_by_key(|(_, entry)| entry.insertion_order)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                storage.data.remove(&oldest);
                tracing::debug!(key = %oldest, "evicted oldest PII record");
            }
        }

        let entry = StoredRecord {
            record,
            inserted_at: Instant::now(),
            insertion_order: storage.insertion_counter,
        };
        storage.insertion_counter += 1;
        storage.data.insert(key, entry);

        tracing::info!(user = %user, session_id, items, "stored PII record");
    }

    /// Fetch a record; expired records are reported as missing
    pub async fn get(&self, user: UserKey, session_id: &str) -> Option<PiiRecord> {
        let storage = self.storage.read().await;
        storage
            .data
            .get(&Self::key(user, session_id))
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.record.clone())
    }

    /// Number of live (unexpired) records
    pub async fn len(&self) -> usize {
        let storage = self.storage.read().await;
        storage
            .data
            .values()
            .filter(|entry| !self.is_expired(entry))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
