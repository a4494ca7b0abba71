//! # States
//!
//! Fixed lookup tables shared with the map boundary file.
//!
//! The polygon file tags each feature with a numeric FIPS code (`"06"`), the upstream API and every
//! rollup use two-letter postal codes (`"CA"`). `US` / `USA` are not states at all, they mark the
//! nationwide bucket.

pub const NATIONAL_CODES: [&str; 2] = ["US", "USA"];

/// (FIPS, postal code, name)
const STATES: [(&str, &str, &str); 52] = [
    ("01", "AL", "Alabama"),
    ("02", "AK", "Alaska"),
    ("04", "AZ", "Arizona"),
    ("05", "AR", "Arkansas"),
    ("06", "CA", "California"),
    ("08", "CO", "Colorado"),
    ("09", "CT", "Connecticut"),
    ("10", "DE", "Delaware"),
    ("11", "DC", "District of Columbia"),
    ("12", "FL", "Florida"),
    ("13", "GA", "Georgia"),
    ("15", "HI", "Hawaii"),
    ("16", "ID", "Idaho"),
    ("17", "IL", "Illinois"),
    ("18", "IN", "Indiana"),
    ("19", "IA", "Iowa"),
    ("20", "KS", "Kansas"),
    ("21", "KY", "Kentucky"),
    ("22", "LA", "Louisiana"),
    ("23", "ME", "Maine"),
    ("24", "MD", "Maryland"),
    ("25", "MA", "Massachusetts"),
    ("26", "MI", "Michigan"),
    ("27", "MN", "Minnesota"),
    ("28", "MS", "Mississippi"),
    ("29", "MO", "Missouri"),
    ("30", "MT", "Montana"),
    ("31", "NE", "Nebraska"),
    ("32", "NV", "Nevada"),
    ("33", "NH", "New Hampshire"),
    ("34", "NJ", "New Jersey"),
    ("35", "NM", "New Mexico"),
    ("36", "NY", "New York"),
    ("37", "NC", "North Carolina"),
    ("38", "ND", "North Dakota"),
    ("39", "OH", "Ohio"),
    ("40", "OK", "Oklahoma"),
    ("41", "OR", "Oregon"),
    ("42", "PA", "Pennsylvania"),
    ("44", "RI", "Rhode Island"),
    ("45", "SC", "South Carolina"),
    ("46", "SD", "South Dakota"),
    ("47", "TN", "Tennessee"),
    ("48", "TX", "Texas"),
    ("49", "UT", "Utah"),
    ("50", "VT", "Vermont"),
    ("51", "VA", "Virginia"),
    ("53", "WA", "Washington"),
    ("54", "WV", "West Virginia"),
    ("55", "WI", "Wisconsin"),
    ("56", "WY", "Wyoming"),
    ("72", "PR", "Puerto Rico"),
];

pub fn is_national(state_code: &str) -> bool {
    NATIONAL_CODES.contains(&state_code)
}

/// Accepts both zero-padded (`"06"`) and bare (`"6"`) FIPS codes.
pub fn code_for_fips(fips: &str) -> Option<&'static str> {
    let fips = fips.trim();
    let padded;
    let fips = if fips.len() == 1 {
        padded = format!("0{fips}");
        padded.as_str()
    } else {
        fips
    };

    STATES
        .iter()
        .find(|(numeric, _, _)| *numeric == fips)
        .map(|(_, code, _)| *code)
}

pub fn name_for_code(state_code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(_, code, _)| code.eq_ignore_ascii_case(state_code))
        .map(|(_, _, name)| *name)
}

/// Every postal code the map can draw, in FIPS order.
pub fn codes() -> impl Iterator<Item = &'static str> {
    STATES.iter().map(|(_, code, _)| *code)
}
