use std::collections::{BTreeMap, BTreeSet, HashMap};

use axum::body::Bytes;
use rollup::{CandidateInfo, CandidateProfile, CandidateRecord, ContributionFact};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    pub year: Option<String>,
    pub top: Option<String>,
}

impl ReadQuery {
    /// `None` merges every cycle.
    pub fn year(&self) -> Result<Option<i32>, AppError> {
        parse_param("year", self.year.as_deref())
    }

    pub fn top(&self, default: usize) -> Result<usize, AppError> {
        Ok(parse_param("top", self.top.as_deref())?.unwrap_or(default))
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::MalformedQuery(format!("{name} must be an integer, got {raw:?}"))),
        None => Ok(None),
    }
}

pub fn facts(records: &[CandidateRecord], year: Option<i32>) -> Vec<ContributionFact> {
    records
        .iter()
        .flat_map(|record| record.facts(year))
        .collect()
}

/// Candidates with at least one fact in the selected cycle, ordered by id. Listed profiles without
/// any contribution only appear when no cycle is selected.
pub fn directory(
    records: &[CandidateRecord],
    profiles: &[CandidateProfile],
    year: Option<i32>,
) -> Vec<CandidateInfo> {
    let records: BTreeMap<&str, &CandidateRecord> = records
        .iter()
        .filter(|record| record.has_year(year))
        .map(|record| (record.candidate_id.as_str(), record))
        .collect();
    let profiles: BTreeMap<&str, &CandidateProfile> = profiles
        .iter()
        .map(|profile| (profile.candidate_id.as_str(), profile))
        .collect();

    let ids: BTreeSet<&str> = match year {
        Some(_) => records.keys().copied().collect(),
        None => records.keys().chain(profiles.keys()).copied().collect(),
    };

    ids.into_iter()
        .filter_map(|id| {
            CandidateInfo::resolve(records.get(id).copied(), profiles.get(id).copied())
        })
        .collect()
}

/// Candidate id to the best known upstream name, for [`rollup::display_name_for`].
pub fn names_by_id(directory: &[CandidateInfo]) -> HashMap<String, String> {
    directory
        .iter()
        .map(|candidate| (candidate.candidate_id.clone(), candidate.name.clone()))
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ImageUpdate {
    #[serde(default)]
    pub candidate_id: String,
    #[serde(default, alias = "candidate_name")]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
}

pub fn get_image_updates(bytes: Bytes) -> Result<Vec<ImageUpdate>, AppError> {
    let updates: Vec<ImageUpdate> =
        serde_json::from_slice(&bytes).map_err(|_| AppError::MalformedPayload)?;

    if updates.is_empty() {
        return Err(AppError::MalformedPayload);
    }

    Ok(updates)
}
