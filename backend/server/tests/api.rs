use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use process::{
    Ingestor,
    models::{Candidate, CandidatesResponse, Contribution, Pagination, Response},
    remote::ContributionSource,
    store::{CandidateStore, MemoryStore},
    utils::build_upsert,
};
use rollup::CandidateProfile;
use serde_json::{Value, json};
use server::{build_router, config::Config, scheduler::IngestScheduler, state::State};
use tokio::sync::Semaphore;
use tower::ServiceExt;

/// Serves one page of rows, each fetch waits for a permit. The candidate listing answers at once.
struct Gated {
    permits: Semaphore,
    rows: Vec<Contribution>,
    candidates: Vec<Candidate>,
}

#[async_trait]
impl ContributionSource for Gated {
    async fn fetch_page(&self, page: u32) -> Result<Response, reqwest::Error> {
        self.permits.acquire().await.unwrap().forget();

        Ok(Response {
            pagination: Pagination {
                count: self.rows.len() as u64,
                page,
                pages: 1,
                per_page: 100,
            },
            results: self.rows.clone(),
        })
    }

    async fn fetch_candidates(
        &self,
        _election_year: i32,
        page: u32,
    ) -> Result<CandidatesResponse, reqwest::Error> {
        Ok(CandidatesResponse {
            pagination: Pagination {
                count: self.candidates.len() as u64,
                page,
                pages: 1,
                per_page: 100,
            },
            results: self.candidates.clone(),
        })
    }
}

fn row(id: &str, name: &str, party: Option<&str>, state: &str, year: i32, net: f64) -> Contribution {
    Contribution {
        candidate_id: id.to_string(),
        candidate_last_name: Some(name.to_string()),
        candidate_party_affiliation: party.map(str::to_string),
        contributor_state: Some(state.to_string()),
        election_year: year,
        net_receipts: net,
        rounded_net_receipts: None,
    }
}

struct TestApp {
    router: Router,
    source: Arc<Gated>,
    store: Arc<MemoryStore>,
}

async fn app(rows: &[Contribution], ingest_rows: Vec<Contribution>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    for row in rows {
        store.upsert(&build_upsert(row).unwrap()).await.unwrap();
    }

    let source = Arc::new(Gated {
        permits: Semaphore::new(0),
        rows: ingest_rows,
        candidates: vec![Candidate {
            candidate_id: "P1".to_string(),
            name: Some("ONE, OLIVIA".to_string()),
            party: Some("IND".to_string()),
            office: Some("P".to_string()),
        }],
    });
    let scheduler = IngestScheduler::new(
        Ingestor::new(source.clone(), store.clone()),
        Duration::from_secs(3600),
        false,
    );

    let config = Config::from_lookup(|_| None).unwrap();
    let router = build_router(State::from_parts(config, store.clone(), scheduler));

    TestApp {
        router,
        source,
        store,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, json)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, "GET", uri, Body::empty()).await
}

fn ids(group: &Value) -> Vec<&str> {
    group
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["candidate_id"].as_str().unwrap())
        .collect()
}

fn campaign() -> Vec<Contribution> {
    vec![
        row("P1", "HARRIS, KAMALA D.", Some("DEM"), "CA", 2024, 100.0),
        row("P1", "HARRIS, KAMALA D.", Some("DEM"), "CA", 2024, 50.0),
        row("P2", "TRUMP, DONALD J.", Some("REP"), "CA", 2024, 30.0),
        row("P3", "SMITH, JANE", None, "TX", 2020, 10.0),
    ]
}

#[tokio::test]
async fn test_contributions_by_state() {
    let app = app(&campaign(), Vec::new()).await;

    let (status, body) = get(&app.router, "/api/contributions").await;
    assert_eq!(status, StatusCode::OK);

    let ca = &body["contributions"]["CA"];
    assert_eq!(ids(ca), vec!["P1", "P2"]);
    assert_eq!(ca[0]["total"], 150.0);
    assert_eq!(ca[1]["total"], 30.0);
    assert_eq!(ids(&body["contributions"]["TX"]), vec!["P3"]);
    assert_eq!(ids(&body["candidates"]), vec!["P1", "P2", "P3"]);
}

#[tokio::test]
async fn test_contributions_year_filter() {
    let app = app(&campaign(), Vec::new()).await;

    let (status, body) = get(&app.router, "/api/contributions/withCandidates?year=2024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contributions"]["TX"], json!([]));
    assert_eq!(ids(&body["candidates"]), vec!["P1", "P2"]);

    let (status, body) = get(&app.router, "/api/contributions?year=1999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidates"], json!([]));

    let groups = body["contributions"].as_object().unwrap();
    assert_eq!(groups.len(), rollup::states::codes().count());
    assert!(groups.values().all(|group| group == &json!([])));
}

#[tokio::test]
async fn test_contributions_keep_pseudo_rows() {
    let mut rows = campaign();
    rows.push(row("P0", "All candidates", None, "CA", 2024, 500.0));
    rows.push(row("P00", "Democrats", None, "CA", 2024, 150.0));

    let app = app(&rows, Vec::new()).await;
    let (_, body) = get(&app.router, "/api/contributions?year=2024").await;

    let ca = &body["contributions"]["CA"];
    assert_eq!(ids(ca), vec!["P0", "P1", "P00", "P2"]);
    assert_eq!(ca[0]["name"], "All candidates");
    assert_eq!(ca[0]["total"], 500.0);

    let (_, body) = get(&app.router, "/api/map?year=2024").await;
    assert_eq!(body["states"]["CA"]["entries"][0]["name"], "Kamala Harris");
}

#[tokio::test]
async fn test_states_ranked_by_total() {
    let mut rows = campaign();
    rows.push(row("P0", "All candidates", None, "CA", 2024, 500.0));
    rows.push(row("P00", "Democrats", None, "CA", 2024, 150.0));
    rows.push(row("P1", "HARRIS, KAMALA D.", Some("DEM"), "US", 2024, 9000.0));

    let app = app(&rows, Vec::new()).await;
    let (status, body) = get(&app.router, "/api/states").await;
    assert_eq!(status, StatusCode::OK);

    let states = body["states"].as_array().unwrap();
    assert_eq!(states.len(), 2);

    assert_eq!(states[0]["state_code"], "CA");
    assert_eq!(states[0]["name"], "California");
    assert_eq!(states[0]["total"], 500.0);
    assert_eq!(ids(&states[0]["candidates"]), vec!["P1", "P2"]);
    assert_eq!(states[0]["candidates"][0]["name"], "Kamala Harris");

    assert_eq!(states[1]["state_code"], "TX");
    assert_eq!(states[1]["total"], 10.0);

    let (_, body) = get(&app.router, "/api/states?year=2020").await;
    assert_eq!(body["states"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_profiles_fill_the_directory() {
    let app = app(&campaign(), Vec::new()).await;
    for (id, name, party) in [("P3", "SMITH, JANE Q.", "GRE"), ("P5", "STEIN, JILL", "GRE")] {
        let profile = CandidateProfile {
            candidate_id: id.to_string(),
            name: name.to_string(),
            party: Some(party.to_string()),
            office: Some("P".to_string()),
            image_url: None,
        };
        app.store.upsert_profile(&profile).await.unwrap();
    }

    let (_, candidates) = get(&app.router, "/api/candidates").await;
    assert_eq!(ids(&candidates), vec!["P1", "P2", "P3", "P5"]);
    assert_eq!(candidates[2]["name"], "SMITH, JANE Q.");
    assert_eq!(candidates[2]["party"], "GRE");
    assert_eq!(candidates[3]["office"], "P");

    let (_, body) = get(&app.router, "/api/contributions?year=2024").await;
    assert_eq!(ids(&body["candidates"]), vec!["P1", "P2"]);

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/candidates/image",
        Body::from(r#"[{"candidate_id": "P5", "image_url": "https://img/p5.png"}]"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modified"], 1);

    let (_, body) = get(&app.router, "/api/summary?year=2020").await;
    assert_eq!(body["candidates"][0]["name"], "Jane Smith");
}

#[tokio::test]
async fn test_malformed_query_is_rejected() {
    let app = app(&campaign(), Vec::new()).await;

    let (status, _) = get(&app.router, "/api/contributions?year=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app.router, "/api/summary?top=all").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_update_report() {
    let app = app(&campaign(), Vec::new()).await;

    let payload = r#"[
        {"candidate_id": "P1", "image_url": "https://img/p1.png"},
        {"candidate_id": "P9", "image_url": "https://img/p9.png"},
        {"candidate_name": "NOBODY", "image_url": "https://img/x.png"}
    ]"#;
    let (status, body) = send(&app.router, "PUT", "/api/candidates/image", Body::from(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["modified"], 1);
    assert_eq!(body["notFound"], json!(["P9"]));
    assert_eq!(body["invalid"], json!(["NOBODY"]));

    let (_, candidates) = get(&app.router, "/api/candidates").await;
    assert_eq!(candidates[0]["image_url"], "https://img/p1.png");
    assert!(candidates[1].get("image_url").is_none());

    let (status, _) = send(&app.router, "PUT", "/api/candidates/image", Body::from("[]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_groups_the_tail() {
    let mut rows: Vec<Contribution> = (1..=8_i32)
        .map(|i| {
            row(
                &format!("P{i}"),
                &format!("LAST{i}, FIRST"),
                Some(if i % 2 == 0 { "DEM" } else { "REP" }),
                "US",
                2024,
                f64::from(90 - i * 10),
            )
        })
        .collect();
    rows.push(row("P1", "LAST1, FIRST", Some("REP"), "OH", 2024, 5.0));
    rows.push(row("P0", "All candidates", None, "US", 2024, 1000.0));

    let app = app(&rows, Vec::new()).await;
    let (status, body) = get(&app.router, "/api/summary").await;
    assert_eq!(status, StatusCode::OK);

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 8);
    assert_eq!(candidates[0]["name"], "First Last1");
    assert_eq!(candidates[0]["total"], 80.0);
    assert_eq!(candidates[0]["top_states"][0]["state_code"], "OH");

    let segments = body["bar"]["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 7);
    assert_eq!(segments[6]["label"], "Other candidates");
    assert_eq!(segments[6]["is_other"], true);
    assert_eq!(segments[6]["total"], 30.0);
    assert_eq!(segments[6]["color"], "#d1d5db");
    assert_eq!(body["bar"]["grand_total"], 360.0);

    let (_, body) = get(&app.router, "/api/summary?top=8").await;
    assert_eq!(body["bar"]["segments"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_map_marks_missing_states() {
    let app = app(&campaign(), Vec::new()).await;

    let (status, body) = get(&app.router, "/api/map?year=2024").await;
    assert_eq!(status, StatusCode::OK);

    let states = &body["states"];
    assert_eq!(states["CA"]["kind"], "ranked");
    assert_eq!(states["CA"]["fill"], "#1a75ff");
    assert_eq!(states["CA"]["entries"][0]["name"], "Kamala Harris");
    assert_eq!(states["TX"]["kind"], "no_data");
    assert_eq!(states["TX"]["fill"], "#6b7280");
    assert_eq!(states["DC"]["name"], "District of Columbia");
}

#[tokio::test]
async fn test_manual_ingest_refuses_overlap() {
    let app = app(&[], vec![row("P1", "ONE", Some("IND"), "VT", 2024, 7.0)]).await;

    let (status, _) = send(&app.router, "POST", "/api/ingest", Body::empty()).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(&app.router, "POST", "/api/ingest", Body::empty()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, status) = get(&app.router, "/api/ingest").await;
    assert_eq!(status["in_flight"], true);

    app.source.permits.add_permits(1);

    let mut finished = Value::Null;
    for _ in 0..200 {
        let (_, status) = get(&app.router, "/api/ingest").await;
        if status["in_flight"] == false && !status["last_finished_at"].is_null() {
            finished = status;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(finished["last_upserted"], 1);

    let (_, body) = get(&app.router, "/api/contributions").await;
    assert_eq!(ids(&body["contributions"]["VT"]), vec!["P1"]);

    let (_, candidates) = get(&app.router, "/api/candidates").await;
    assert_eq!(candidates[0]["name"], "ONE, OLIVIA");
}
