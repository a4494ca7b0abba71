use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    aggregate::StateRollup,
    format::{ColorToken, NEUTRAL, color_for_party, format_display_name},
    states::{is_national, name_for_code},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TooltipEntry {
    pub candidate_id: String,
    pub name: String,
    pub party: Option<String>,
    pub total: f64,
    pub color: ColorToken,
}

/// What hovering a state shows. Absent and empty groups both render as "No data".
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateView {
    NoData,
    Ranked { entries: Vec<TooltipEntry> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapState {
    pub state_code: String,
    pub name: String,
    pub fill: ColorToken,
    #[serde(flatten)]
    pub view: StateView,
}

pub fn state_view(rollup: &StateRollup, state_code: &str) -> StateView {
    match rollup.get(state_code) {
        Some(group) if !group.is_empty() => StateView::Ranked {
            entries: group
                .iter()
                .map(|candidate| TooltipEntry {
                    candidate_id: candidate.candidate_id.clone(),
                    name: format_display_name(&candidate.name),
                    party: candidate.party.clone(),
                    total: candidate.total,
                    color: color_for_party(candidate.party.as_deref(), false),
                })
                .collect(),
        },
        _ => StateView::NoData,
    }
}

/// Leading candidate's party color, neutral when the state has nothing to show.
pub fn fill_for(rollup: &StateRollup, state_code: &str) -> ColorToken {
    rollup
        .get(state_code)
        .and_then(|group| group.first())
        .map_or(NEUTRAL, |leader| color_for_party(leader.party.as_deref(), false))
}

/// One entry per drawable state plus any other non-national group the rollup holds.
pub fn map_states<'a>(
    rollup: &StateRollup,
    drawable: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, MapState> {
    drawable
        .into_iter()
        .map(str::to_string)
        .chain(rollup.iter().map(|(code, _)| code.to_string()))
        .filter(|code| !is_national(code))
        .map(|code| {
            let state = MapState {
                name: name_for_code(&code).map_or_else(|| code.clone(), str::to_string),
                fill: fill_for(rollup, &code),
                view: state_view(rollup, &code),
                state_code: code.clone(),
            };
            (code, state)
        })
        .collect()
}
