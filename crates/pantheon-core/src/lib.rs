//! pantheon-core: persona routing and cycle-context engine.
//!
//! Classifies a message's tone, picks the persona that should answer (physiological signals
//! first, then topic), computes the current cycle phase from logged start dates, and folds
//! phase guidance into both the outbound prompt and the returned reply. The text generator
//! and the session store are external; this crate never persists anything.

mod companion;
mod config;
mod error;
mod generator;
mod orchestrator;
mod shared;

pub use companion::{
    ChatTurnRequest, ChatTurnResponse, CompanionService, CycleContext, CycleContextSummary,
};
pub use config::{CompanionConfig, LlmMode, DEFAULT_API_URL, DEFAULT_MODEL};
pub use error::{CompanionError, CompanionResult, GeneratorError};
pub use generator::{
    ChatCompletionsGenerator, GenerationRequest, OfflineGenerator, PriorTurn, TextGenerator,
};
pub use shared::{CycleRecord, Message, Role, Session};

// Orchestrator: classifier, catalog, router, cycle calculator, insight advisor, composer
pub use orchestrator::{
    analyze_irregularity, append_insight_notes, catalog, compose_prompt, compose_reply,
    compute_phase, compute_phase_with_profile, fallback_reply, observed_cycle_lengths,
    phase_for_day, predict_next_periods, strip_context, system_prompt, Classify,
    CycleInsightAdvisor, CycleProfile, Emotion, EmotionClassifier, FertileWindow, Insight,
    IrregularityReport, KeywordSet, Persona, PersonaId, PersonaRouter, Phase, PhaseSnapshot,
    RouteDecision, RouteReason, CYCLE_KEYWORDS, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH,
    DISTRESS_SYMPTOMS, GENERIC_TRACKING_ADVICE, MAX_CYCLE_DAY, MAX_CYCLE_LENGTH, MAX_PERIOD_LENGTH,
    TRACKING_OFFER_NOTE, TRACKING_OPT_IN_ADVICE,
};
