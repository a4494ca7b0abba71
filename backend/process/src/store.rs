//! # Candidate Store
//!
//! Document store keyed by candidate id.
//!
//! ## Upsert
//! - Missing document: created from the upsert
//! - Existing document: display fields overwritten, one contribution entry appended
//! - `image_url` only changes through [`CandidateStore::set_image_url`]
//!
//! The append is not deduplicated. Refetching a page after a crash appends the same cycle twice.
//!
//! ## Profiles
//! Entries of the upstream candidate listing, replaced wholesale on every pass.
//!
//! ## Images
//! Image URLs live apart from both documents and are merged into them on read, so a document
//! rewritten by ingestion can never drop an image set in the meantime.
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use rollup::{CandidateProfile, CandidateRecord, CandidateUpsert};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed candidate document: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn upsert(&self, upsert: &CandidateUpsert) -> Result<(), StoreError>;

    async fn get(&self, candidate_id: &str) -> Result<Option<CandidateRecord>, StoreError>;

    async fn all(&self) -> Result<Vec<CandidateRecord>, StoreError>;

    async fn upsert_profile(&self, profile: &CandidateProfile) -> Result<(), StoreError>;

    async fn profiles(&self) -> Result<Vec<CandidateProfile>, StoreError>;

    /// `false` when neither a document nor a profile has that id.
    async fn set_image_url(&self, candidate_id: &str, image_url: &str) -> Result<bool, StoreError>;
}

pub(crate) fn with_images<T>(
    items: impl IntoIterator<Item = T>,
    images: &HashMap<String, String>,
    slot: impl Fn(&mut T) -> (&String, &mut Option<String>),
) -> Vec<T> {
    items
        .into_iter()
        .map(|mut item| {
            let (candidate_id, image_url) = slot(&mut item);
            if let Some(url) = images.get(candidate_id) {
                *image_url = Some(url.clone());
            }
            item
        })
        .collect()
}

pub(crate) fn record_image(record: &mut CandidateRecord) -> (&String, &mut Option<String>) {
    (&record.candidate_id, &mut record.image_url)
}

pub(crate) fn profile_image(profile: &mut CandidateProfile) -> (&String, &mut Option<String>) {
    (&profile.candidate_id, &mut profile.image_url)
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, CandidateRecord>>,
    profiles: RwLock<BTreeMap<String, CandidateProfile>>,
    images: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn upsert(&self, upsert: &CandidateUpsert) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().await;

        records
            .entry(upsert.candidate_id.clone())
            .and_modify(|record| record.apply(upsert, now))
            .or_insert_with(|| CandidateRecord::new(upsert, now));

        Ok(())
    }

    async fn get(&self, candidate_id: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let record = self.records.read().await.get(candidate_id).cloned();
        let images = self.images.read().await;

        Ok(with_images(record, &images, record_image).pop())
    }

    async fn all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let records: Vec<_> = self.records.read().await.values().cloned().collect();
        let images = self.images.read().await;

        Ok(with_images(records, &images, record_image))
    }

    async fn upsert_profile(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        let mut profile = profile.clone();
        profile.image_url = None;

        self.profiles
            .write()
            .await
            .insert(profile.candidate_id.clone(), profile);

        Ok(())
    }

    async fn profiles(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        let profiles: Vec<_> = self.profiles.read().await.values().cloned().collect();
        let images = self.images.read().await;

        Ok(with_images(profiles, &images, profile_image))
    }

    async fn set_image_url(&self, candidate_id: &str, image_url: &str) -> Result<bool, StoreError> {
        let known = self.records.read().await.contains_key(candidate_id)
            || self.profiles.read().await.contains_key(candidate_id);

        if known {
            self.images
                .write()
                .await
                .insert(candidate_id.to_string(), image_url.to_string());
        }

        Ok(known)
    }
}
