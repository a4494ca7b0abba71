use async_trait::async_trait;
use reqwest::Client;

use crate::models::{CANDIDATES_ENDPOINT, CandidatesResponse, ENDPOINT, OFFICE, Response, SORT};

#[async_trait]
pub trait ContributionSource: Send + Sync {
    /// One page of the contribution listing.
    async fn fetch_page(&self, page: u32) -> Result<Response, reqwest::Error>;

    /// One page of the presidential candidate listing for a cycle.
    async fn fetch_candidates(
        &self,
        election_year: i32,
        page: u32,
    ) -> Result<CandidatesResponse, reqwest::Error>;
}

pub struct FecClient {
    client: Client,
    base_url: String,
    candidates_url: String,
    api_key: String,
    per_page: u32,
}

impl FecClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, per_page: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            candidates_url: CANDIDATES_ENDPOINT.to_string(),
            api_key: api_key.into(),
            per_page,
        }
    }

    pub fn with_defaults(api_key: impl Into<String>) -> Self {
        Self::new(ENDPOINT, api_key, 100)
    }

    pub fn with_candidates_url(mut self, candidates_url: impl Into<String>) -> Self {
        self.candidates_url = candidates_url.into();
        self
    }
}

#[async_trait]
impl ContributionSource for FecClient {
    async fn fetch_page(&self, page: u32) -> Result<Response, reqwest::Error> {
        let page = page.to_string();
        let per_page = self.per_page.to_string();

        self.client
            .get(&self.base_url)
            .query(&[
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
                ("sort", SORT),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await
    }

    async fn fetch_candidates(
        &self,
        election_year: i32,
        page: u32,
    ) -> Result<CandidatesResponse, reqwest::Error> {
        let page = page.to_string();
        let per_page = self.per_page.to_string();
        let election_year = election_year.to_string();

        self.client
            .get(&self.candidates_url)
            .query(&[
                ("page", page.as_str()),
                ("per_page", per_page.as_str()),
                ("election_year", election_year.as_str()),
                ("office", OFFICE),
                ("sort", "name"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<CandidatesResponse>()
            .await
    }
}
