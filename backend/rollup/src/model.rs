use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current layout of [`CandidateRecord`]. Documents written before the field existed decode as 1.
pub const RECORD_VERSION: u32 = 1;

/// One (candidate, state, cycle) observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributionFact {
    pub candidate_id: String,
    pub candidate_display_name: String,
    pub party: Option<String>,
    pub state_code: String,
    pub election_year: i32,
    pub net_receipts: f64,
}

/// Cycle-scoped entry appended to a [`CandidateRecord`] on every ingestion pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributionEntry {
    pub election_year: i32,
    pub state_code: String,
    pub net_receipts: f64,
    pub rounded_net_receipts: i64,
}

/// Everything one upstream row contributes to a candidate document.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateUpsert {
    pub candidate_id: String,
    pub last_name: String,
    pub party_affiliation: Option<String>,
    pub state_code: String,
    pub entry: ContributionEntry,
}

/// Durable candidate document keyed by `candidate_id`.
///
/// The display fields are denormalized and overwritten on every upsert,
/// while `contributions` only ever grows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    pub candidate_id: String,
    pub last_name: String,
    pub party_affiliation: Option<String>,
    pub current_state_code: String,
    /// Kept beside the document and merged in on read, never written with it.
    #[serde(default, skip_serializing)]
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub contributions: Vec<ContributionEntry>,
}

fn default_version() -> u32 {
    1
}

impl CandidateRecord {
    pub fn new(upsert: &CandidateUpsert, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            schema_version: RECORD_VERSION,
            candidate_id: upsert.candidate_id.clone(),
            last_name: String::new(),
            party_affiliation: None,
            current_state_code: String::new(),
            image_url: None,
            updated_at: now,
            contributions: Vec::new(),
        };
        record.apply(upsert, now);

        record
    }

    /// Last-write-wins on the display fields, append on the fact list. `image_url` is left alone.
    pub fn apply(&mut self, upsert: &CandidateUpsert, now: DateTime<Utc>) {
        self.schema_version = RECORD_VERSION;
        self.last_name = upsert.last_name.clone();
        self.party_affiliation = upsert.party_affiliation.clone();
        self.current_state_code = upsert.state_code.clone();
        self.updated_at = now;
        self.contributions.push(upsert.entry.clone());
    }

    /// Flattens the stored entries into facts, keeping only `year` when one is given.
    pub fn facts(&self, year: Option<i32>) -> impl Iterator<Item = ContributionFact> + '_ {
        self.contributions
            .iter()
            .filter(move |entry| year.is_none_or(|year| entry.election_year == year))
            .map(move |entry| ContributionFact {
                candidate_id: self.candidate_id.clone(),
                candidate_display_name: self.last_name.clone(),
                party: self.party_affiliation.clone(),
                state_code: entry.state_code.clone(),
                election_year: entry.election_year,
                net_receipts: entry.net_receipts,
            })
    }

    pub fn has_year(&self, year: Option<i32>) -> bool {
        self.facts(year).next().is_some()
    }
}

/// Candidate listing entry, independent of any contribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: String,
    /// Upstream form, `"LAST, FIRST M."`.
    pub name: String,
    pub party: Option<String>,
    pub office: Option<String>,
    #[serde(default, skip_serializing)]
    pub image_url: Option<String>,
}

/// Directory row handed to the presentation layer next to a rollup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub candidate_id: String,
    pub name: String,
    pub party: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CandidateInfo {
    /// Profile name and party win, the contribution record fills whatever the profile lacks.
    pub fn resolve(record: Option<&CandidateRecord>, profile: Option<&CandidateProfile>) -> Option<Self> {
        let candidate_id = profile
            .map(|profile| &profile.candidate_id)
            .or(record.map(|record| &record.candidate_id))?
            .clone();

        let name = profile
            .map(|profile| profile.name.trim())
            .filter(|name| !name.is_empty())
            .or(record.map(|record| record.last_name.as_str()))
            .unwrap_or_default()
            .to_string();

        Some(Self {
            candidate_id,
            name,
            party: profile
                .and_then(|profile| profile.party.clone())
                .or_else(|| record.and_then(|record| record.party_affiliation.clone())),
            office: profile.and_then(|profile| profile.office.clone()),
            image_url: record
                .and_then(|record| record.image_url.clone())
                .or_else(|| profile.and_then(|profile| profile.image_url.clone())),
        })
    }
}
