//! # Contribution Processing
//!
//! Pulls presidential contribution totals from OpenFEC and folds them into candidate documents.
//!
//! ## Data Structures
//!
//! ### Upstream
//! - Paginated listing (`page`, `per_page`, `api_key`): every row is one candidate's net receipts for one
//!   contributor state and one election year. `pagination.pages` tells how far to go.
//!
//! ### Store
//! - One document per candidate id ([`rollup::CandidateRecord`]): display fields from the most recent row,
//!   plus every contribution ever seen, in arrival order.
//!
//!
//!
//! ## Ingestion Pass
//! 1. Fetch page 1.
//!
//! 2. Stop if the page has no results.
//!
//! 3. Upsert every row in order. Rows without a candidate id are skipped.
//!
//! 4. Stop once `pagination.pages` is reached, otherwise fetch the next page and repeat from 2.
//!
//! 5. For every election year seen, walk the presidential candidate listing the same way and replace
//!    each candidate's profile (full name, party, office).
//!
//! ## Failure
//! - The first fetch or store error aborts the pass. Pages already upserted stay written.
//! - No retry, the next scheduled pass is the recovery.
//! - Upserts append, so a refetched page double counts its cycle.
use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod database;
pub mod models;
pub mod remote;
pub mod store;
pub mod utils;

use remote::ContributionSource;
use store::{CandidateStore, StoreError};
use utils::{build_profile, build_upsert};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Fetching page {page} failed: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Storing page {page} failed: {source}")]
    Store {
        page: u32,
        #[source]
        source: StoreError,
    },

    #[error("Fetching {year} candidates page {page} failed: {source}")]
    FetchCandidates {
        year: i32,
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Storing {year} candidate profiles failed: {source}")]
    StoreProfile {
        year: i32,
        #[source]
        source: StoreError,
    },
}

#[derive(Clone, Debug)]
pub struct IngestReport {
    pub pages: u32,
    pub upserted: usize,
    pub skipped: usize,
    pub profiles: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Ingestor {
    source: Arc<dyn ContributionSource>,
    store: Arc<dyn CandidateStore>,
}

impl Ingestor {
    pub fn new(source: Arc<dyn ContributionSource>, store: Arc<dyn CandidateStore>) -> Self {
        Self { source, store }
    }

    pub async fn run(&self) -> Result<IngestReport, IngestError> {
        let started_at = Utc::now();
        info!("Ingestion started");

        let mut page = 1;
        let mut pages = 0;
        let mut upserted = 0;
        let mut skipped = 0;
        let mut years = BTreeSet::new();

        loop {
            let response = self
                .source
                .fetch_page(page)
                .await
                .map_err(|source| IngestError::Fetch { page, source })?;

            debug!(
                "Fetched page {page}/{} ({} rows)",
                response.pagination.pages,
                response.results.len()
            );

            if response.results.is_empty() {
                break;
            }

            for row in &response.results {
                let Some(upsert) = build_upsert(row) else {
                    warn!("Skipping row without candidate id on page {page}");
                    skipped += 1;
                    continue;
                };

                self.store
                    .upsert(&upsert)
                    .await
                    .map_err(|source| IngestError::Store { page, source })?;

                years.insert(upsert.entry.election_year);
                upserted += 1;
            }

            pages = page;

            if page >= response.pagination.pages {
                break;
            }
            page += 1;
        }

        let mut profiles = 0;
        for year in years {
            profiles += self.sync_profiles(year).await?;
        }

        let report = IngestReport {
            pages,
            upserted,
            skipped,
            profiles,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Ingestion finished: {} pages, {} upserts, {} skipped, {} profiles",
            report.pages, report.upserted, report.skipped, report.profiles
        );

        Ok(report)
    }

    async fn sync_profiles(&self, year: i32) -> Result<usize, IngestError> {
        let mut page = 1;
        let mut stored = 0;

        loop {
            let response = self
                .source
                .fetch_candidates(year, page)
                .await
                .map_err(|source| IngestError::FetchCandidates { year, page, source })?;

            debug!(
                "Fetched {year} candidates page {page}/{} ({} rows)",
                response.pagination.pages,
                response.results.len()
            );

            if response.results.is_empty() {
                break;
            }

            for profile in response.results.iter().filter_map(build_profile) {
                self.store
                    .upsert_profile(&profile)
                    .await
                    .map_err(|source| IngestError::StoreProfile { year, source })?;

                stored += 1;
            }

            if page >= response.pagination.pages {
                break;
            }
            page += 1;
        }

        Ok(stored)
    }
}
