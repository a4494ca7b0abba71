use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State as Extract},
    http::StatusCode,
    response::IntoResponse,
};
use rollup::{
    CandidateInfo, CandidateRollup, PseudoCandidates, StateRollup, StateSummary, SummaryBar,
    aggregate, aggregate_with, display_name_for,
    national::{SIDEBAR_CANDIDATES, SUMMARY_BAR_CANDIDATES},
    resolve_national_totals, state_totals, states, summary_bar,
    view::{MapState, map_states},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    scheduler::{IngestStatus, Trigger},
    state::State,
    utils::{ReadQuery, directory, facts, get_image_updates, names_by_id},
};

type AppState = Extract<Arc<State>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ContributionsResponse {
    pub contributions: StateRollup,
    pub candidates: Vec<CandidateInfo>,
}

/// Pseudo-candidate rows are kept so clients can read the precomputed party totals. Every drawable
/// state has a key, an empty list when it gave nothing.
pub async fn contributions_handler(
    Extract(state): AppState,
    Query(query): Query<ReadQuery>,
) -> Result<Json<ContributionsResponse>, AppError> {
    let year = query.year()?;
    let records = state.store.all().await?;
    let profiles = state.store.profiles().await?;

    Ok(Json(ContributionsResponse {
        contributions: aggregate_with(&facts(&records, year), PseudoCandidates::Keep)
            .seed(states::codes()),
        candidates: directory(&records, &profiles, year),
    }))
}

pub async fn candidates_handler(
    Extract(state): AppState,
) -> Result<Json<Vec<CandidateInfo>>, AppError> {
    let records = state.store.all().await?;
    let profiles = state.store.profiles().await?;

    Ok(Json(directory(&records, &profiles, None)))
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdateReport {
    pub status: &'static str,
    pub modified: usize,
    pub not_found: Vec<String>,
    pub invalid: Vec<String>,
}

pub async fn candidate_images_handler(
    Extract(state): AppState,
    body: Bytes,
) -> Result<Json<ImageUpdateReport>, AppError> {
    let updates = get_image_updates(body)?;
    let mut report = ImageUpdateReport {
        status: "ok",
        ..Default::default()
    };

    for update in updates {
        if update.candidate_id.trim().is_empty() {
            report.invalid.push(update.name);
            continue;
        }

        if state
            .store
            .set_image_url(&update.candidate_id, &update.image_url)
            .await?
        {
            report.modified += 1;
        } else {
            report.not_found.push(update.candidate_id);
        }
    }

    info!(
        "Image update: {} modified, {} not found, {} invalid",
        report.modified,
        report.not_found.len(),
        report.invalid.len()
    );

    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub candidates: CandidateRollup,
    pub bar: SummaryBar,
}

pub async fn summary_handler(
    Extract(state): AppState,
    Query(query): Query<ReadQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let year = query.year()?;
    let top = query.top(SUMMARY_BAR_CANDIDATES)?;

    let records = state.store.all().await?;
    let profiles = state.store.profiles().await?;
    let names = names_by_id(&directory(&records, &profiles, None));

    let mut candidates = resolve_national_totals(&aggregate(&facts(&records, year)));
    candidates.rename(|c| display_name_for(&names, &c.candidate_id, Some(c.name.as_str())));

    let bar = summary_bar(&candidates, top);
    candidates.truncate(SIDEBAR_CANDIDATES);

    Ok(Json(SummaryResponse { candidates, bar }))
}

#[derive(Debug, Serialize)]
pub struct StatesResponse {
    pub states: Vec<StateSummary>,
}

pub async fn states_handler(
    Extract(state): AppState,
    Query(query): Query<ReadQuery>,
) -> Result<Json<StatesResponse>, AppError> {
    let year = query.year()?;

    let records = state.store.all().await?;
    let profiles = state.store.profiles().await?;
    let names = names_by_id(&directory(&records, &profiles, None));

    let mut states = state_totals(&aggregate_with(
        &facts(&records, year),
        PseudoCandidates::Keep,
    ));
    for candidate in states.iter_mut().flat_map(|s| s.candidates.iter_mut()) {
        candidate.name = display_name_for(&names, &candidate.candidate_id, Some(&candidate.name));
    }

    Ok(Json(StatesResponse { states }))
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub states: BTreeMap<String, MapState>,
}

pub async fn map_handler(
    Extract(state): AppState,
    Query(query): Query<ReadQuery>,
) -> Result<Json<MapResponse>, AppError> {
    let year = query.year()?;
    let records = state.store.all().await?;

    Ok(Json(MapResponse {
        states: map_states(&aggregate(&facts(&records, year)), states::codes()),
    }))
}

pub async fn ingest_handler(Extract(state): AppState) -> Result<impl IntoResponse, AppError> {
    match state.scheduler.trigger().await {
        Trigger::Started => Ok((StatusCode::ACCEPTED, "Ingestion started")),
        Trigger::AlreadyRunning => Err(AppError::IngestInFlight),
    }
}

pub async fn ingest_status_handler(Extract(state): AppState) -> Json<IngestStatus> {
    Json(state.scheduler.status().await)
}
