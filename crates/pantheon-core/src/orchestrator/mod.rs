//! Routing and cycle-context engine.
//!
//! Leaves first: the emotion classifier and persona catalog, the cycle-phase calculator,
//! the insight advisor over phase snapshots, the router that combines them, and the composer
//! that folds the result into the outbound prompt and the returned reply.

mod composer;
mod cycle;
mod cycle_insight;
mod emotion;
mod persona;

pub use composer::{
    append_insight_notes, compose_prompt, compose_reply, fallback_reply, strip_context,
    system_prompt, TRACKING_OFFER_NOTE,
};
pub use cycle::{
    analyze_irregularity, compute_phase, compute_phase_with_profile, observed_cycle_lengths,
    phase_for_day, predict_next_periods, CycleProfile, FertileWindow, IrregularityReport, Phase,
    PhaseSnapshot, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH, MAX_CYCLE_DAY, MAX_CYCLE_LENGTH,
    MAX_PERIOD_LENGTH,
};
pub(crate) use cycle::offset_date;
pub use cycle_insight::{
    CycleInsightAdvisor, Insight, CYCLE_KEYWORDS, GENERIC_TRACKING_ADVICE, TRACKING_OPT_IN_ADVICE,
};
pub use emotion::{Classify, Emotion, EmotionClassifier, KeywordSet};
pub use persona::{
    catalog, Persona, PersonaId, PersonaRouter, RouteDecision, RouteReason, DISTRESS_SYMPTOMS,
};
