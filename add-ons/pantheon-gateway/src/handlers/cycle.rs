//! Cycle utilities: phase snapshot, irregularity report, next-period predictions.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use pantheon_core::{
    analyze_irregularity, compute_phase_with_profile, observed_cycle_lengths,
    predict_next_periods, CompanionError, CycleProfile, CycleRecord, IrregularityReport,
    PhaseSnapshot, DEFAULT_CYCLE_LENGTH, MAX_CYCLE_LENGTH,
};
use serde::{Deserialize, Serialize};

use super::{api_error, ApiError};
use crate::AppState;

const DEFAULT_PREDICTION_COUNT: usize = 6;
const MAX_PREDICTION_COUNT: usize = 24;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRequest {
    #[serde(default)]
    pub history: Vec<CycleRecord>,
    #[serde(default)]
    pub profile: Option<CycleProfile>,
    /// Defaults to the server clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResponse {
    pub snapshot: Option<PhaseSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'static str>,
    pub quick_tips: Vec<&'static str>,
}

/// POST /api/cycle/phase
pub async fn phase(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PhaseRequest>,
) -> Result<Json<PhaseResponse>, ApiError> {
    let profile = body
        .profile
        .unwrap_or_else(|| CycleProfile::from_history(&body.history));
    if !body.history.is_empty() {
        profile.validate().map_err(api_error)?;
    }
    let now = body.now.unwrap_or_else(Utc::now);
    let snapshot = compute_phase_with_profile(&body.history, now, &profile);
    let advisor = state.companion.advisor();
    let (caption, quick_tips) = match &snapshot {
        Some(s) => (Some(s.phase.caption()), advisor.quick_tips(s.phase)),
        None => (None, advisor.quick_tips_for_key("")),
    };
    Ok(Json(PhaseResponse {
        snapshot,
        caption,
        quick_tips,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrregularityRequest {
    /// Takes precedence over `history` when present.
    #[serde(default)]
    pub cycle_lengths: Option<Vec<u32>>,
    #[serde(default)]
    pub history: Vec<CycleRecord>,
}

/// POST /api/cycle/irregularity
pub async fn irregularity(Json(body): Json<IrregularityRequest>) -> Json<IrregularityReport> {
    let lengths = body
        .cycle_lengths
        .unwrap_or_else(|| observed_cycle_lengths(&body.history));
    Json(analyze_irregularity(&lengths))
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_count() -> usize {
    DEFAULT_PREDICTION_COUNT
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub last_period_start: NaiveDate,
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,
    #[serde(default = "default_count")]
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub dates: Vec<NaiveDate>,
}

/// POST /api/cycle/predictions
pub async fn predictions(
    Json(body): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    if body.count > MAX_PREDICTION_COUNT {
        return Err(api_error(CompanionError::Validation(format!(
            "count must be at most {}",
            MAX_PREDICTION_COUNT
        ))));
    }
    if !(1..=MAX_CYCLE_LENGTH).contains(&body.cycle_length) {
        return Err(api_error(CompanionError::Validation(format!(
            "cycleLength must be between 1 and {}",
            MAX_CYCLE_LENGTH
        ))));
    }
    Ok(Json(PredictionResponse {
        dates: predict_next_periods(body.last_period_start, body.cycle_length, body.count),
    }))
}
