//! # National & Party Resolution
//!
//! Turns a [`StateRollup`] into a per-candidate view.
//!
//! ## National total
//! - When the rollup carries a national bucket (`US`, then `USA`) with at least one real candidate,
//!   its rows are the authoritative totals. A bucket holding only pseudo-candidates counts as absent.
//! - Upstream already summed the bucket, territories and unknown states included.
//! - A candidate seen only in state groups then keeps a national total of zero.
//! - Without a national bucket each candidate's total is the sum over every state group.
//!
//! ## Top states
//! Built from state groups only, never from the national bucket. Capped at [`TOP_STATES`].
use std::collections::HashMap;

use serde::Serialize;

use crate::{
    aggregate::{StateRollup, is_pseudo_candidate},
    format::{ColorToken, OTHER, color_for_party},
    states::{NATIONAL_CODES, is_national},
};

pub const TOP_STATES: usize = 8;
pub const SIDEBAR_CANDIDATES: usize = 12;
pub const SUMMARY_BAR_CANDIDATES: usize = 6;
pub const OTHER_LABEL: &str = "Other candidates";
pub const OTHER_PARTY: &str = "OTHER";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateTotal {
    pub state_code: String,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub candidate_id: String,
    pub name: String,
    pub party: Option<String>,
    pub total: f64,
    pub top_states: Vec<StateTotal>,
}

/// Candidates ranked descending by national total.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateRollup(Vec<CandidateSummary>);

impl CandidateRollup {
    pub fn get(&self, candidate_id: &str) -> Option<&CandidateSummary> {
        self.0.iter().find(|c| c.candidate_id == candidate_id)
    }

    pub fn candidates(&self) -> &[CandidateSummary] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn rename(&mut self, mut name_for: impl FnMut(&CandidateSummary) -> String) {
        for candidate in &mut self.0 {
            candidate.name = name_for(candidate);
        }
    }
}

struct Tally {
    summary: CandidateSummary,
    per_state: Vec<StateTotal>,
}

pub fn resolve_national_totals(rollup: &StateRollup) -> CandidateRollup {
    let national = NATIONAL_CODES
        .iter()
        .filter_map(|code| rollup.get(code))
        .find(|group| group.iter().any(|row| !is_pseudo_candidate(&row.name)));

    let mut tallies: Vec<Tally> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let mut tally_for = |id: &str, name: &str, party: &Option<String>| -> usize {
        *positions.entry(id.to_string()).or_insert_with(|| {
            tallies.push(Tally {
                summary: CandidateSummary {
                    candidate_id: id.to_string(),
                    name: name.to_string(),
                    party: party.clone(),
                    total: 0.0,
                    top_states: Vec::new(),
                },
                per_state: Vec::new(),
            });
            tallies.len() - 1
        })
    };

    let mut national_rows = Vec::new();
    for row in national.unwrap_or_default() {
        if is_pseudo_candidate(&row.name) {
            continue;
        }
        national_rows.push((tally_for(&row.candidate_id, &row.name, &row.party), row.total));
    }

    let mut state_rows = Vec::new();
    for (state_code, group) in rollup.iter().filter(|(code, _)| !is_national(code)) {
        for row in group {
            if is_pseudo_candidate(&row.name) {
                continue;
            }
            let index = tally_for(&row.candidate_id, &row.name, &row.party);
            state_rows.push((index, state_code, row.total));
        }
    }

    for (index, total) in national_rows {
        tallies[index].summary.total += total;
    }

    for (index, state_code, total) in state_rows {
        let tally = &mut tallies[index];

        match tally
            .per_state
            .iter_mut()
            .find(|entry| entry.state_code == state_code)
        {
            Some(entry) => entry.total += total,
            None => tally.per_state.push(StateTotal {
                state_code: state_code.to_string(),
                total,
            }),
        }

        if national.is_none() {
            tally.summary.total += total;
        }
    }

    let mut candidates: Vec<CandidateSummary> = tallies
        .into_iter()
        .map(|mut tally| {
            tally
                .per_state
                .sort_by(|a, b| b.total.total_cmp(&a.total));
            tally.per_state.truncate(TOP_STATES);
            tally.summary.top_states = tally.per_state;
            tally.summary
        })
        .collect();

    candidates.sort_by(|a, b| b.total.total_cmp(&a.total));

    CandidateRollup(candidates)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarSegment {
    pub label: String,
    pub party: Option<String>,
    pub total: f64,
    pub is_other: bool,
    pub color: ColorToken,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryBar {
    pub segments: Vec<BarSegment>,
    pub grand_total: f64,
}

/// First `top` candidates as their own segments, the tail folded into one "Other candidates"
/// segment when its sum is strictly positive.
pub fn summary_bar(rollup: &CandidateRollup, top: usize) -> SummaryBar {
    let (head, tail) = rollup.0.split_at(top.min(rollup.0.len()));

    let mut segments: Vec<BarSegment> = head
        .iter()
        .map(|candidate| BarSegment {
            label: candidate.name.clone(),
            party: candidate.party.clone(),
            total: candidate.total,
            is_other: false,
            color: color_for_party(candidate.party.as_deref(), false),
        })
        .collect();

    let other_total: f64 = tail.iter().map(|candidate| candidate.total).sum();
    if other_total > 0.0 {
        segments.push(BarSegment {
            label: OTHER_LABEL.to_string(),
            party: Some(OTHER_PARTY.to_string()),
            total: other_total,
            is_other: true,
            color: OTHER,
        });
    }

    SummaryBar {
        segments,
        grand_total: rollup.0.iter().map(|candidate| candidate.total).sum(),
    }
}
