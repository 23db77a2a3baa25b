//! Cycle-phase calculator: turns a logged cycle history and "now" into a phase snapshot.
//!
//! Everything here is a pure function of its inputs. The snapshot is recomputed on demand and
//! discarded after use; nothing is cached between calls.
//!
//! Phase policy (cycle day `d`, average cycle length `L`, average period length `P`):
//!
//! | Range | Phase |
//! |-------|-------|
//! | `d ≤ P` | menstrual |
//! | `P < d ≤ L/2 − 2` | follicular |
//! | `L/2 − 2 < d ≤ L/2 + 2` | ovulatory |
//! | `d > L/2 + 2` | luteal |
//!
//! `L/2` is real-valued, so an odd `L` puts the boundary on a half day. Comparisons are done on
//! doubled integers (`2d ≤ L − 4`) to keep that exact.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, CompanionResult};
use crate::shared::CycleRecord;

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;
/// Longest average cycle accepted from callers.
pub const MAX_CYCLE_LENGTH: u32 = 120;
pub const MAX_PERIOD_LENGTH: u32 = 30;
/// Largest client-reported cycle day accepted.
pub const MAX_CYCLE_DAY: u32 = 366;

/// Lateness is flagged once the expected onset is more than this many days behind.
const LATE_GRACE_DAYS: i64 = 2;
/// Minimum number of cycle lengths before irregularity can be judged.
const MIN_CYCLES_FOR_ANALYSIS: usize = 3;
const IRREGULAR_VARIATION_DAYS: f64 = 7.0;
const CONSULT_VARIATION_DAYS: f64 = 15.0;

/// One of the four named segments of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Ovulatory,
        Phase::Luteal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menstrual => "menstrual",
            Phase::Follicular => "follicular",
            Phase::Ovulatory => "ovulatory",
            Phase::Luteal => "luteal",
        }
    }

    /// Parses a phase name. Unknown names return `None`; callers decide the fallback.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "menstrual" => Some(Phase::Menstrual),
            "follicular" => Some(Phase::Follicular),
            "ovulatory" => Some(Phase::Ovulatory),
            "luteal" => Some(Phase::Luteal),
            _ => None,
        }
    }

    /// Short dashboard caption for the phase.
    pub fn caption(&self) -> &'static str {
        match self {
            Phase::Menstrual => "Time for rest and gentle self-care",
            Phase::Follicular => "Energy building, new beginnings",
            Phase::Ovulatory => "Peak energy and confidence",
            Phase::Luteal => "Winding down, preparing for rest",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fertile window as day offsets from the cycle origin and as calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_offset_days: i64,
    pub end_offset_days: i64,
}

/// Derived view of where the user is in the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSnapshot {
    pub phase: Phase,
    /// 1-based day of the current cycle.
    pub cycle_day: u32,
    pub days_until_next: u32,
    pub fertile_window: FertileWindow,
    /// Set once `L − d + 1 < −2` on whole cycle days, so with `L = 28` day 32 is the first
    /// late day. A clock that kept the fractional day would already flag day 31 after midnight.
    pub is_late: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_late: Option<u32>,
    /// Negative once ovulation day has passed.
    pub days_until_ovulation: i64,
    pub next_period_date: NaiveDate,
    pub last_period_start: NaiveDate,
    pub average_cycle_length: u32,
    pub average_period_length: u32,
    /// Symptoms logged against the active cycle.
    #[serde(default)]
    pub symptoms: Vec<String>,
}

/// Average lengths used to place a cycle day into a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleProfile {
    #[serde(default = "default_cycle_length")]
    pub average_cycle_length: u32,
    #[serde(default = "default_period_length")]
    pub average_period_length: u32,
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_period_length() -> u32 {
    DEFAULT_PERIOD_LENGTH
}

impl Default for CycleProfile {
    fn default() -> Self {
        Self {
            average_cycle_length: DEFAULT_CYCLE_LENGTH,
            average_period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

impl CycleProfile {
    /// Rejects lengths outside `1..=MAX_CYCLE_LENGTH` and `1..=MAX_PERIOD_LENGTH`.
    pub fn validate(&self) -> CompanionResult<()> {
        if !(1..=MAX_CYCLE_LENGTH).contains(&self.average_cycle_length) {
            return Err(CompanionError::Validation(format!(
                "averageCycleLength must be between 1 and {}",
                MAX_CYCLE_LENGTH
            )));
        }
        if !(1..=MAX_PERIOD_LENGTH).contains(&self.average_period_length) {
            return Err(CompanionError::Validation(format!(
                "averagePeriodLength must be between 1 and {}",
                MAX_PERIOD_LENGTH
            )));
        }
        Ok(())
    }

    /// Averages the lengths logged on each record; defaults when history is empty.
    pub fn from_history(history: &[CycleRecord]) -> Self {
        if history.is_empty() {
            return Self::default();
        }
        let n = history.len() as f64;
        let cycle = history.iter().map(|r| r.cycle_length_days as f64).sum::<f64>() / n;
        let period = history.iter().map(|r| r.period_length_days as f64).sum::<f64>() / n;
        Self {
            average_cycle_length: (cycle.round() as u32).max(1),
            average_period_length: (period.round() as u32).max(1),
        }
    }
}

/// Places a 1-based cycle day into a phase. Ties at a boundary go to the earlier phase.
pub fn phase_for_day(cycle_day: u32, average_cycle_length: u32, average_period_length: u32) -> Phase {
    let day = cycle_day as i64;
    let doubled_day = 2 * day;
    let l = average_cycle_length.max(1) as i64;
    let p = average_period_length.max(1) as i64;
    if day <= p {
        Phase::Menstrual
    } else if doubled_day <= l - 4 {
        Phase::Follicular
    } else if doubled_day <= l + 4 {
        Phase::Ovulatory
    } else {
        Phase::Luteal
    }
}

/// `origin` shifted by `days`, saturating at the ends of the calendar.
pub(crate) fn offset_date(origin: NaiveDate, days: i64) -> NaiveDate {
    origin
        .checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

fn origin_instant(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Computes the phase snapshot for `now` from the most recent record in `history`.
///
/// Returns `None` when history is empty (tracking has not started). A start date in the
/// future is treated as day 1.
pub fn compute_phase(
    history: &[CycleRecord],
    now: DateTime<Utc>,
    average_cycle_length: u32,
    average_period_length: u32,
) -> Option<PhaseSnapshot> {
    let latest = history.last()?;
    let origin = latest.start_date;

    let elapsed_secs = now.signed_duration_since(origin_instant(origin)).num_seconds();
    let elapsed_days = elapsed_secs.div_euclid(86_400);
    let cycle_day = (elapsed_days + 1).max(1) as u32;
    let phase = phase_for_day(cycle_day, average_cycle_length, average_period_length);

    let snapshot = PhaseSnapshot::assemble(
        origin,
        cycle_day,
        phase,
        average_cycle_length,
        average_period_length,
        latest.symptoms.clone(),
    );

    tracing::debug!(
        target: "pantheon::cycle",
        phase = phase.as_str(),
        cycle_day,
        is_late = snapshot.is_late,
        "Phase snapshot computed"
    );

    Some(snapshot)
}

impl PhaseSnapshot {
    /// Derives the metrics for a known origin, day, and phase.
    ///
    /// [`compute_phase`] passes the phase it computed; callers that already hold a phase
    /// (for instance from a client-side tracker) pass theirs and get consistent arithmetic.
    /// Lengths are clamped to `MAX_CYCLE_LENGTH` and `MAX_PERIOD_LENGTH`; dates saturate.
    pub fn assemble(
        origin: NaiveDate,
        cycle_day: u32,
        phase: Phase,
        average_cycle_length: u32,
        average_period_length: u32,
        symptoms: Vec<String>,
    ) -> Self {
        let l = average_cycle_length.clamp(1, MAX_CYCLE_LENGTH);
        let p = average_period_length.clamp(1, MAX_PERIOD_LENGTH);
        let cycle_day = cycle_day.max(1);

        let signed_until_next = l as i64 - cycle_day as i64 + 1;
        let is_late = signed_until_next < -LATE_GRACE_DAYS;
        let days_late = is_late.then(|| signed_until_next.unsigned_abs() as u32);

        let ovulation_day = (l / 2) as i64;
        let start_offset = (ovulation_day - 5).max(0);
        let end_offset = ovulation_day + 1;

        Self {
            phase,
            cycle_day,
            days_until_next: signed_until_next.max(0) as u32,
            fertile_window: FertileWindow {
                start: offset_date(origin, start_offset),
                end: offset_date(origin, end_offset),
                start_offset_days: start_offset,
                end_offset_days: end_offset,
            },
            is_late,
            days_late,
            days_until_ovulation: ovulation_day - cycle_day as i64,
            next_period_date: offset_date(origin, l as i64),
            last_period_start: origin,
            average_cycle_length: l,
            average_period_length: p,
            symptoms,
        }
    }
}

/// Same as [`compute_phase`] with lengths taken from a profile.
pub fn compute_phase_with_profile(
    history: &[CycleRecord],
    now: DateTime<Utc>,
    profile: &CycleProfile,
) -> Option<PhaseSnapshot> {
    compute_phase(
        history,
        now,
        profile.average_cycle_length,
        profile.average_period_length,
    )
}

/// Next `count` expected onsets after `last_period_start`.
///
/// The step is clamped to `1..=MAX_CYCLE_LENGTH`. Stops early at the end of the calendar.
pub fn predict_next_periods(last_period_start: NaiveDate, cycle_length: u32, count: usize) -> Vec<NaiveDate> {
    let step = Duration::days(cycle_length.clamp(1, MAX_CYCLE_LENGTH) as i64);
    std::iter::successors(Some(last_period_start), |d| d.checked_add_signed(step))
        .skip(1)
        .take(count)
        .collect()
}

/// Day gaps between consecutive logged starts. Out-of-order or same-day pairs are skipped.
pub fn observed_cycle_lengths(history: &[CycleRecord]) -> Vec<u32> {
    history
        .windows(2)
        .filter_map(|pair| {
            let gap = (pair[1].start_date - pair[0].start_date).num_days();
            (gap > 0).then_some(gap as u32)
        })
        .collect()
}

/// Result of [`analyze_irregularity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrregularityReport {
    pub is_irregular: bool,
    /// Largest absolute deviation from the mean length, in days.
    pub variation: f64,
    pub average_length: u32,
    pub recommendation: String,
    pub sufficient_data: bool,
}

/// Judges cycle regularity from recorded lengths. Needs at least three lengths.
pub fn analyze_irregularity(cycle_lengths: &[u32]) -> IrregularityReport {
    if cycle_lengths.len() < MIN_CYCLES_FOR_ANALYSIS {
        return IrregularityReport {
            is_irregular: false,
            variation: 0.0,
            average_length: DEFAULT_CYCLE_LENGTH,
            recommendation: "Track for at least 3 cycles for accurate analysis".to_string(),
            sufficient_data: false,
        };
    }

    let n = cycle_lengths.len() as f64;
    let mean = cycle_lengths.iter().map(|&l| l as f64).sum::<f64>() / n;
    let variation = cycle_lengths
        .iter()
        .map(|&l| (l as f64 - mean).abs())
        .fold(0.0_f64, f64::max);

    let is_irregular = variation > IRREGULAR_VARIATION_DAYS;
    let recommendation = if !is_irregular {
        "Your cycles appear regular"
    } else if variation > CONSULT_VARIATION_DAYS {
        "Consider consulting a healthcare provider about cycle irregularity"
    } else {
        "Some variation is normal, but continue tracking patterns"
    };

    IrregularityReport {
        is_irregular,
        variation,
        average_length: mean.round() as u32,
        recommendation: recommendation.to_string(),
        sufficient_data: true,
    }
}
