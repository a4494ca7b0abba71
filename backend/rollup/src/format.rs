use std::{collections::HashMap, fmt};

use serde::Serialize;

/// Hex color handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColorToken(&'static str);

impl ColorToken {
    pub const fn hex(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const NEUTRAL: ColorToken = ColorToken("#6b7280");
pub const NEUTRAL_EMPHASIZED: ColorToken = ColorToken("#9ca3af");
/// Fill of the synthetic "Other candidates" bar segment.
pub const OTHER: ColorToken = ColorToken("#d1d5db");

/// Total over every input, unknown and missing parties fall to the neutral gray pair.
pub fn color_for_party(party: Option<&str>, emphasized: bool) -> ColorToken {
    let (normal, hovered) = match party.map(|party| party.trim().to_ascii_uppercase()) {
        Some(party) if party == "DEM" => ("#1a75ff", "#4d94ff"),
        Some(party) if party == "REP" => ("#ff1a1a", "#ff4d4d"),
        Some(party) if party == "IND" => ("#ffcc00", "#ffd700"),
        _ => (NEUTRAL.0, NEUTRAL_EMPHASIZED.0),
    };

    ColorToken(if emphasized { hovered } else { normal })
}

/// ASCII-only: first char upper, rest lower.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();

    match chars.next() {
        Some(first) => {
            let mut titled = String::with_capacity(word.len());
            titled.push(first.to_ascii_uppercase());
            titled.extend(chars.map(|c| c.to_ascii_lowercase()));
            titled
        }
        None => String::new(),
    }
}

/// `"HARRIS, KAMALA D."` becomes `"Kamala Harris"`, comma-less input is title-cased token by token.
pub fn format_display_name(raw: &str) -> String {
    let trimmed = raw.trim();

    match trimmed.split_once(',') {
        Some((family, rest)) => {
            let family = title_case(family.trim());
            let given = title_case(rest.split_whitespace().next().unwrap_or(""));

            match (given.is_empty(), family.is_empty()) {
                (false, false) => format!("{given} {family}"),
                (true, _) => family,
                (false, true) => given,
            }
        }
        None => trimmed
            .split_whitespace()
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Directory name when the candidate is known, else the raw upstream label, else empty.
pub fn display_name_for(
    directory: &HashMap<String, String>,
    candidate_id: &str,
    raw: Option<&str>,
) -> String {
    match directory.get(candidate_id).map(|name| format_display_name(name)) {
        Some(name) if !name.is_empty() => name,
        _ => raw.map(format_display_name).unwrap_or_default(),
    }
}
