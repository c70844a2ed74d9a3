//! Record persistence.
//!
//! Generated recipes and articles are written through a narrow repository
//! interface; the core never reads back what it wrote. A REST-backed
//! implementation talks to the managed row store, and an in-memory one
//! backs tests and offline CLI runs.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Client;
use serde_json::Value;
use std::sync::Mutex;

use crate::config::RepositoryConfig;
use crate::error::DishlensError;
use crate::model::{NewRecord, RecordKind, StoredRecord};

#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persist a record, returning it with an id and timestamp assigned
    async fn insert(&self, record: NewRecord) -> Result<StoredRecord, DishlensError>;

    /// Fetch one record; `None` when the id is unknown
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredRecord>, DishlensError>;

    /// Most recent records first, optionally filtered by kind
    async fn list_recent(
        &self,
        limit: usize,
        kind: Option<RecordKind>,
    ) -> Result<Vec<StoredRecord>, DishlensError>;

    /// Remove every record, returning how many were deleted
    async fn delete_all(&self) -> Result<usize, DishlensError>;
}

fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// In-memory store for tests and offline runs.
#[derive(Default)]
pub struct MemoryRepository {
    records: Mutex<Vec<StoredRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for MemoryRepository {
    async fn insert(&self, record: NewRecord) -> Result<StoredRecord, DishlensError> {
        let stored = StoredRecord {
            id: random_id(),
            kind: record.kind,
            title: record.title,
            payload: record.payload,
            created_at: Utc::now(),
        };
        let mut records = self
            .records
            .lock()
            .map_err(|_| DishlensError::Repository("memory store poisoned".into()))?;
        records.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredRecord>, DishlensError> {
        let records = self
            .records
            .lock()
            .map_err(|_| DishlensError::Repository("memory store poisoned".into()))?;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn list_recent(
        &self,
        limit: usize,
        kind: Option<RecordKind>,
    ) -> Result<Vec<StoredRecord>, DishlensError> {
        let records = self
            .records
            .lock()
            .map_err(|_| DishlensError::Repository("memory store poisoned".into()))?;
        let mut matching: Vec<StoredRecord> = records
            .iter()
            .filter(|record| kind.map_or(true, |k| record.kind == k))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn delete_all(&self) -> Result<usize, DishlensError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| DishlensError::Repository("memory store poisoned".into()))?;
        let deleted = records.len();
        records.clear();
        Ok(deleted)
    }
}

/// REST adapter for the managed record store.
pub struct RestRepository {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestRepository {
    pub fn new(config: &RepositoryConfig) -> Self {
        RestRepository {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {key}")),
            None => builder,
        }
    }
}

#[async_trait]
impl RecordRepository for RestRepository {
    async fn insert(&self, record: NewRecord) -> Result<StoredRecord, DishlensError> {
        let response = self
            .request(self.client.post(format!("{}/records", self.base_url)))
            .json(&record)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DishlensError::Repository(format!(
                "insert failed with status {status}"
            )));
        }

        let stored: StoredRecord = response.json().await?;
        debug!("stored record {} ({})", stored.id, stored.title);
        Ok(stored)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredRecord>, DishlensError> {
        let response = self
            .request(self.client.get(format!("{}/records/{id}", self.base_url)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(DishlensError::Repository(format!(
                "get failed with status {status}"
            )));
        }

        Ok(Some(response.json().await?))
    }

    async fn list_recent(
        &self,
        limit: usize,
        kind: Option<RecordKind>,
    ) -> Result<Vec<StoredRecord>, DishlensError> {
        let mut request = self
            .request(self.client.get(format!("{}/records", self.base_url)))
            .query(&[("limit", limit.to_string())]);
        if let Some(kind) = kind {
            let kind_name = match kind {
                RecordKind::Recipe => "recipe",
                RecordKind::Article => "article",
            };
            request = request.query(&[("kind", kind_name)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(DishlensError::Repository(format!(
                "list failed with status {status}"
            )));
        }

        Ok(response.json().await?)
    }

    async fn delete_all(&self) -> Result<usize, DishlensError> {
        let response = self
            .request(self.client.delete(format!("{}/records", self.base_url)))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DishlensError::Repository(format!(
                "delete failed with status {status}"
            )));
        }

        let body: Value = response.json().await?;
        Ok(body["deleted"].as_u64().unwrap_or(0) as usize)
    }
}
