//! # Redis
//!
//! Durable home of the candidate documents.
//!
//! ## Implementation
//!
//! - `candidates` hash: candidate id to JSON document
//! - `candidate_profiles` hash: candidate id to JSON listing entry
//! - `candidate_images` hash: candidate id to image URL, merged into both on read
//! - Upsert is read-modify-write on a single field, ingestion never runs concurrently with itself
//! - Image writes touch only their own hash, so they cannot race the read-modify-write
//! - Reads pull the whole hash, a few hundred candidates at most per cycle
//!
//! ## Commands
//!
//! Inspect one candidate.
//! ```sh
//! redis-cli HGET candidates P00009423
//! redis-cli HGET candidate_images P00009423
//! ```
use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use rollup::{CandidateProfile, CandidateRecord, CandidateUpsert};

use crate::store::{CandidateStore, StoreError, profile_image, record_image, with_images};

pub const CANDIDATES_KEY: &str = "candidates";
pub const PROFILES_KEY: &str = "candidate_profiles";
pub const IMAGES_KEY: &str = "candidate_images";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_secs(2));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_redis(redis_url).await?))
    }

    /// The serialized document never carries `image_url`.
    async fn put(&self, record: &CandidateRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;

        let _: () = self
            .connection
            .clone()
            .hset(CANDIDATES_KEY, &record.candidate_id, json)
            .await?;

        Ok(())
    }

    async fn images(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.connection.clone().hgetall(IMAGES_KEY).await?)
    }

    async fn image(&self, candidate_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.connection.clone().hget(IMAGES_KEY, candidate_id).await?)
    }

    async fn stored(&self, candidate_id: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let json: Option<String> = self
            .connection
            .clone()
            .hget(CANDIDATES_KEY, candidate_id)
            .await?;

        Ok(json.map(|json| serde_json::from_str(&json)).transpose()?)
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(documents: &[String]) -> Result<Vec<T>, StoreError> {
    documents
        .iter()
        .map(|json| serde_json::from_str(json).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl CandidateStore for RedisStore {
    async fn upsert(&self, upsert: &CandidateUpsert) -> Result<(), StoreError> {
        let now = Utc::now();

        let record = match self.stored(&upsert.candidate_id).await? {
            Some(mut record) => {
                record.apply(upsert, now);
                record
            }
            None => CandidateRecord::new(upsert, now),
        };

        self.put(&record).await
    }

    async fn get(&self, candidate_id: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let Some(mut record) = self.stored(candidate_id).await? else {
            return Ok(None);
        };
        record.image_url = self.image(candidate_id).await?;

        Ok(Some(record))
    }

    async fn all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let documents: Vec<String> = self.connection.clone().hvals(CANDIDATES_KEY).await?;
        let records: Vec<CandidateRecord> = decode_all(&documents)?;

        Ok(with_images(records, &self.images().await?, record_image))
    }

    async fn upsert_profile(&self, profile: &CandidateProfile) -> Result<(), StoreError> {
        let json = serde_json::to_string(profile)?;

        let _: () = self
            .connection
            .clone()
            .hset(PROFILES_KEY, &profile.candidate_id, json)
            .await?;

        Ok(())
    }

    async fn profiles(&self) -> Result<Vec<CandidateProfile>, StoreError> {
        let documents: Vec<String> = self.connection.clone().hvals(PROFILES_KEY).await?;
        let profiles: Vec<CandidateProfile> = decode_all(&documents)?;

        Ok(with_images(profiles, &self.images().await?, profile_image))
    }

    async fn set_image_url(&self, candidate_id: &str, image_url: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let known: bool = connection.hexists(CANDIDATES_KEY, candidate_id).await?
            || connection.hexists(PROFILES_KEY, candidate_id).await?;

        if known {
            let _: () = connection.hset(IMAGES_KEY, candidate_id, image_url).await?;
        }

        Ok(known)
    }
}
