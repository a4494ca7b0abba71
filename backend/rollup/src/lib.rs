//! # Rollups
//!
//! Shared contribution logic for Map My Funds.
//!
//! Every rollup is a pure projection of the stored facts, recomputed on each read. Nothing here
//! performs I/O or keeps state between calls, so the read endpoint and any renderer can call it
//! freely.
//!
//!
//!
//! # Data Flow
//! - Ingestion appends [`ContributionEntry`] rows to a [`CandidateRecord`] per candidate
//! - A read flattens records into [`ContributionFact`]s, optionally for one election year
//! - [`aggregate`] groups facts into a [`StateRollup`] (state code to ranked candidate totals)
//! - [`resolve_national_totals`] turns a [`StateRollup`] into a [`CandidateRollup`]
//! - [`state_totals`] ranks the states themselves, from a rollup that kept its pseudo-candidates
//! - [`view`] derives map fills and tooltip content, [`summary_bar`] the top-N bar
//!
//!
//!
//! # Notes
//!
//! ## Pseudo-candidates
//! Upstream publishes precomputed rows named `All candidates`, `Republicans` and `Democrats`. They are
//! matched by exact name. [`aggregate`] drops them, [`aggregate_with`] can keep them for callers that
//! want the precomputed party totals.
//!
//! ## National bucket
//! `US` and `USA` are nationwide totals, never a state. They are excluded from every per-candidate
//! state breakdown.
pub mod aggregate;
pub mod format;
pub mod model;
pub mod national;
pub mod state_ranking;
pub mod states;
pub mod view;

pub use aggregate::{
    CandidateTotal, PseudoCandidates, StateRollup, aggregate, aggregate_with, is_pseudo_candidate,
};
pub use format::{ColorToken, color_for_party, display_name_for, format_display_name};
pub use model::{
    CandidateInfo, CandidateProfile, CandidateRecord, CandidateUpsert, ContributionEntry,
    ContributionFact,
};
pub use national::{CandidateRollup, CandidateSummary, SummaryBar, resolve_national_totals, summary_bar};
pub use state_ranking::{StateSummary, state_totals};
