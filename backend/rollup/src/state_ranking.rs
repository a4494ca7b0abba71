//! # State Ranking
//!
//! State-centric counterpart of [`crate::national`]: states ranked by how much they gave, each with
//! its own candidate breakdown.
//!
//! - A state's total is its `All candidates` row when upstream sent one, otherwise the sum of its
//!   real candidates
//! - Party rows never show up in the breakdown
//! - National buckets are not states and are left out
//!
//! Expects a rollup that kept its pseudo-candidates, see [`crate::aggregate_with`].
use serde::Serialize;

use crate::{
    aggregate::{ALL_CANDIDATES, CandidateTotal, StateRollup, is_pseudo_candidate},
    states::{is_national, name_for_code},
};

pub const TOP_STATE_SUMMARIES: usize = 15;
pub const STATE_CANDIDATES: usize = 12;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateSummary {
    pub state_code: String,
    pub name: String,
    pub total: f64,
    pub candidates: Vec<CandidateTotal>,
}

pub fn state_totals(rollup: &StateRollup) -> Vec<StateSummary> {
    let mut summaries: Vec<StateSummary> = rollup
        .iter()
        .filter(|(code, _)| !is_national(code))
        .map(|(code, group)| {
            let aggregate_row = group
                .iter()
                .find(|row| row.name == ALL_CANDIDATES)
                .map(|row| row.total);

            let mut candidates: Vec<CandidateTotal> = group
                .iter()
                .filter(|row| !is_pseudo_candidate(&row.name))
                .cloned()
                .collect();
            let candidate_sum = candidates.iter().map(|row| row.total).sum();
            candidates.truncate(STATE_CANDIDATES);

            StateSummary {
                state_code: code.to_string(),
                name: name_for_code(code).unwrap_or(code).to_string(),
                total: aggregate_row.unwrap_or(candidate_sum),
                candidates,
            }
        })
        .collect();

    summaries.sort_by(|a, b| b.total.total_cmp(&a.total));
    summaries.truncate(TOP_STATE_SUMMARIES);

    summaries
}
