use serde::Deserialize;

pub const ENDPOINT: &str = "https://api.open.fec.gov/v1/presidential/contributions/by_candidate/";

pub const CANDIDATES_ENDPOINT: &str = "https://api.open.fec.gov/v1/candidates/";

pub const SORT: &str = "-net_receipts";

/// Presidential office filter of the candidate listing.
pub const OFFICE: &str = "P";

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub pagination: Pagination,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

pub type Response = Page<Contribution>;

pub type CandidatesResponse = Page<Candidate>;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page: u32,
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Contribution {
    pub candidate_id: String,
    #[serde(default)]
    pub candidate_last_name: Option<String>,
    #[serde(default)]
    pub candidate_party_affiliation: Option<String>,
    #[serde(default)]
    pub contributor_state: Option<String>,
    pub election_year: i32,
    #[serde(default)]
    pub net_receipts: f64,
    #[serde(default)]
    pub rounded_net_receipts: Option<f64>,
}

/// Row of the `candidates/` listing. `name` comes as `"LAST, FIRST M."`.
#[derive(Clone, Debug, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_page_decodes() {
        let json = r#"{
            "pagination": {"count": 1, "page": 1, "pages": 1, "per_page": 100, "is_count_exact": true},
            "results": [{
                "candidate_id": "P00009423",
                "name": "HARRIS, KAMALA D.",
                "party": "DEM",
                "party_full": "DEMOCRATIC PARTY",
                "office": "P",
                "office_full": "President"
            }]
        }"#;

        let page: CandidatesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.pagination.pages, 1);
        assert_eq!(page.results[0].name.as_deref(), Some("HARRIS, KAMALA D."));
        assert_eq!(page.results[0].office.as_deref(), Some("P"));
    }

    #[test]
    fn test_missing_results_is_empty() {
        let page: Response = serde_json::from_str(r#"{"pagination": {"pages": 0}}"#).unwrap();
        assert!(page.results.is_empty());
    }
}
