//! # Grouping & Summation
//!
//! Facts are grouped strictly by state code, then merged by candidate id inside each group. Election
//! year is never a group key, callers that want a single cycle filter before aggregating.
//!
//! Within a state the candidates are ranked descending by total. Ties keep the order in which the
//! candidate was first encountered (the sort is stable).
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::ContributionFact;

/// Upstream rows that carry precomputed totals rather than a person.
pub const PSEUDO_CANDIDATES: [&str; 3] = [ALL_CANDIDATES, "Republicans", "Democrats"];

/// Pseudo-candidate carrying the precomputed total of a whole group.
pub const ALL_CANDIDATES: &str = "All candidates";

pub fn is_pseudo_candidate(display_name: &str) -> bool {
    PSEUDO_CANDIDATES.contains(&display_name)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateTotal {
    pub candidate_id: String,
    pub name: String,
    pub party: Option<String>,
    pub total: f64,
}

/// State code to ranked candidate totals.
///
/// A key mapped to an empty list means "the state was seen but has nothing to show", which the
/// presentation layer renders differently from a state that never appeared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateRollup(BTreeMap<String, Vec<CandidateTotal>>);

impl StateRollup {
    pub fn get(&self, state_code: &str) -> Option<&[CandidateTotal]> {
        self.0.get(state_code).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CandidateTotal])> {
        self.0
            .iter()
            .map(|(code, totals)| (code.as_str(), totals.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds an empty group for every listed state that has none yet.
    pub fn seed<'a>(mut self, state_codes: impl IntoIterator<Item = &'a str>) -> Self {
        for code in state_codes {
            self.0.entry(code.to_string()).or_default();
        }

        self
    }
}

impl FromIterator<(String, Vec<CandidateTotal>)> for StateRollup {
    fn from_iter<I: IntoIterator<Item = (String, Vec<CandidateTotal>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PseudoCandidates {
    Exclude,
    Keep,
}

/// Rollup of real candidates only. States whose facts were all pseudo-candidates stay as empty groups.
pub fn aggregate<'a>(facts: impl IntoIterator<Item = &'a ContributionFact>) -> StateRollup {
    aggregate_with(facts, PseudoCandidates::Exclude)
}

pub fn aggregate_with<'a>(
    facts: impl IntoIterator<Item = &'a ContributionFact>,
    pseudo: PseudoCandidates,
) -> StateRollup {
    let mut groups: BTreeMap<String, (Vec<CandidateTotal>, HashMap<String, usize>)> =
        BTreeMap::new();

    for fact in facts {
        let (totals, positions) = groups.entry(fact.state_code.clone()).or_default();

        if pseudo == PseudoCandidates::Exclude && is_pseudo_candidate(&fact.candidate_display_name)
        {
            continue;
        }

        match positions.get(&fact.candidate_id) {
            Some(&index) => totals[index].total += fact.net_receipts,
            None => {
                positions.insert(fact.candidate_id.clone(), totals.len());
                totals.push(CandidateTotal {
                    candidate_id: fact.candidate_id.clone(),
                    name: fact.candidate_display_name.clone(),
                    party: fact.party.clone(),
                    total: fact.net_receipts,
                });
            }
        }
    }

    groups
        .into_iter()
        .map(|(state_code, (mut totals, _))| {
            rank(&mut totals);
            (state_code, totals)
        })
        .collect()
}

/// Descending by total, stable.
pub(crate) fn rank(totals: &mut [CandidateTotal]) {
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(state: &str, id: &str, name: &str, year: i32, net: f64) -> ContributionFact {
        ContributionFact {
            candidate_id: id.to_string(),
            candidate_display_name: name.to_string(),
            party: Some("DEM".to_string()),
            state_code: state.to_string(),
            election_year: year,
            net_receipts: net,
        }
    }

    fn totals(rollup: &StateRollup, state: &str) -> Vec<(String, f64)> {
        rollup
            .get(state)
            .unwrap()
            .iter()
            .map(|c| (c.candidate_id.clone(), c.total))
            .collect()
    }

    #[test]
    fn test_merges_duplicate_rows() {
        let facts = vec![
            fact("CA", "P1", "ONE", 2024, 100.0),
            fact("CA", "P1", "ONE", 2024, 50.0),
            fact("CA", "P2", "TWO", 2024, 30.0),
        ];

        let rollup = aggregate(&facts);
        assert_eq!(
            totals(&rollup, "CA"),
            vec![("P1".to_string(), 150.0), ("P2".to_string(), 30.0)]
        );
    }

    #[test]
    fn test_sums_across_years() {
        let facts = vec![
            fact("NC", "P1", "ONE", 2020, 10.5),
            fact("NC", "P2", "TWO", 2024, 12.0),
            fact("NC", "P1", "ONE", 2024, 2.0),
        ];

        let rollup = aggregate(&facts);
        assert_eq!(
            totals(&rollup, "NC"),
            vec![("P1".to_string(), 12.5), ("P2".to_string(), 12.0)]
        );
    }

    #[test]
    fn test_groups_by_state_and_sorts() {
        let facts = vec![
            fact("TX", "P1", "ONE", 2024, 1.0),
            fact("NY", "P1", "ONE", 2024, 5.0),
            fact("TX", "P2", "TWO", 2024, 9.0),
            fact("TX", "P3", "THREE", 2024, 4.0),
        ];

        let rollup = aggregate(&facts);
        assert_eq!(rollup.len(), 2);

        for (_, group) in rollup.iter() {
            assert!(group.windows(2).all(|pair| pair[0].total >= pair[1].total));
        }
        assert_eq!(totals(&rollup, "NY"), vec![("P1".to_string(), 5.0)]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let facts = vec![
            fact("OH", "P2", "TWO", 2024, 3.0),
            fact("OH", "P1", "ONE", 2024, 3.0),
        ];

        let rollup = aggregate(&facts);
        assert_eq!(
            totals(&rollup, "OH"),
            vec![("P2".to_string(), 3.0), ("P1".to_string(), 3.0)]
        );
    }

    #[test]
    fn test_pseudo_only_state_is_empty_not_absent() {
        let facts = vec![
            fact("WY", "P0", "All candidates", 2024, 900.0),
            fact("WY", "P9", "Republicans", 2024, 500.0),
        ];

        let rollup = aggregate(&facts);
        assert_eq!(rollup.get("WY"), Some(&[][..]));
        assert_eq!(rollup.get("VT"), None);

        let kept = aggregate_with(&facts, PseudoCandidates::Keep);
        assert_eq!(kept.get("WY").map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_pseudo_predicate_is_exact() {
        assert!(is_pseudo_candidate("Democrats"));
        assert!(!is_pseudo_candidate("DEMOCRATS"));
        assert!(!is_pseudo_candidate("All candidates "));
    }

    #[test]
    fn test_seed_keeps_existing_groups() {
        let facts = vec![fact("CA", "P1", "ONE", 2024, 1.0)];

        let rollup = aggregate(&facts).seed(["CA", "NV"]);
        assert_eq!(rollup.get("CA").map(<[_]>::len), Some(1));
        assert_eq!(rollup.get("NV"), Some(&[][..]));
    }
}
