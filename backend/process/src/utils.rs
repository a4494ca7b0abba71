use rollup::{CandidateProfile, CandidateUpsert, ContributionEntry};

use crate::models::{Candidate, Contribution};

/// Two-letter codes and the national markers are kept as uppercase, anything blank becomes `""`.
pub fn sanitize_state(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

pub fn sanitize_party(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|party| !party.is_empty())
        .map(str::to_ascii_uppercase)
}

pub fn round_receipts(net_receipts: f64, upstream: Option<f64>) -> i64 {
    upstream.unwrap_or(net_receipts).round() as i64
}

/// `None` for rows that cannot be keyed.
pub fn build_upsert(row: &Contribution) -> Option<CandidateUpsert> {
    let candidate_id = row.candidate_id.trim();
    if candidate_id.is_empty() {
        return None;
    }

    let state_code = sanitize_state(row.contributor_state.as_deref().unwrap_or_default());

    Some(CandidateUpsert {
        candidate_id: candidate_id.to_string(),
        last_name: row
            .candidate_last_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        party_affiliation: sanitize_party(row.candidate_party_affiliation.as_deref()),
        state_code: state_code.clone(),
        entry: ContributionEntry {
            election_year: row.election_year,
            state_code,
            net_receipts: row.net_receipts,
            rounded_net_receipts: round_receipts(row.net_receipts, row.rounded_net_receipts),
        },
    })
}

/// `None` for listing rows that cannot be keyed.
pub fn build_profile(row: &Candidate) -> Option<CandidateProfile> {
    let candidate_id = row.candidate_id.trim();
    if candidate_id.is_empty() {
        return None;
    }

    Some(CandidateProfile {
        candidate_id: candidate_id.to_string(),
        name: row.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
        party: sanitize_party(row.party.as_deref()),
        office: sanitize_party(row.office.as_deref()),
        image_url: None,
    })
}
