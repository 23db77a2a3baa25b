//! Per-turn orchestration: validation, cycle context, routing, prompt enrichment, one
//! generator attempt under a timeout, and reply augmentation.
//!
//! [`CompanionService`] holds only immutable tables and the generator handle. Build it once
//! and share it behind an `Arc`; concurrent turns never contend.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CompanionConfig;
use crate::error::{CompanionError, CompanionResult, GeneratorError};
use crate::generator::{
    ChatCompletionsGenerator, GenerationRequest, OfflineGenerator, PriorTurn, TextGenerator,
};
use crate::orchestrator::{
    append_insight_notes, compose_prompt, compose_reply, compute_phase_with_profile,
    fallback_reply, system_prompt, Classify, CycleInsightAdvisor, CycleProfile, Emotion,
    EmotionClassifier, Insight, Phase, PersonaId, PersonaRouter, PhaseSnapshot,
    DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH, MAX_CYCLE_DAY,
};
use crate::orchestrator::offset_date;
use crate::shared::{CycleRecord, Message};

fn default_cycle_day() -> u32 {
    1
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_period_length() -> u32 {
    DEFAULT_PERIOD_LENGTH
}

/// Client-computed cycle state sent with a turn. Only `phase` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleContext {
    #[serde(alias = "currentPhase")]
    pub phase: String,
    #[serde(default = "default_cycle_day")]
    pub cycle_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_next: Option<u32>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default = "default_cycle_length")]
    pub average_cycle_length: u32,
    #[serde(default = "default_period_length", alias = "periodLength")]
    pub average_period_length: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_period_start: Option<NaiveDate>,
}

impl CycleContext {
    fn profile(&self) -> CycleProfile {
        CycleProfile {
            average_cycle_length: self.average_cycle_length,
            average_period_length: self.average_period_length,
        }
    }

    /// Rejects lengths outside the profile bounds and a cycle day past `MAX_CYCLE_DAY`.
    pub fn validate(&self) -> CompanionResult<()> {
        self.profile().validate()?;
        if self.cycle_day > MAX_CYCLE_DAY {
            return Err(CompanionError::Validation(format!(
                "cycleDay must be at most {}",
                MAX_CYCLE_DAY
            )));
        }
        Ok(())
    }

    /// Snapshot for a recognised phase; `None` for an unknown phase name.
    ///
    /// Without a start date the origin is inferred from `today` and the cycle day.
    pub fn to_snapshot(&self, today: NaiveDate) -> Option<PhaseSnapshot> {
        let phase = Phase::parse(&self.phase)?;
        let cycle_day = self.cycle_day.max(1);
        let origin = self
            .last_period_start
            .unwrap_or_else(|| offset_date(today, 1 - cycle_day as i64));
        let mut snapshot = PhaseSnapshot::assemble(
            origin,
            cycle_day,
            phase,
            self.average_cycle_length,
            self.average_period_length,
            self.symptoms.clone(),
        );
        if let Some(days) = self.days_until_next {
            snapshot.days_until_next = days;
        }
        Some(snapshot)
    }
}

/// Inbound chat turn.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "currentGoddessId")]
    pub current_persona_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default, alias = "menstrualData")]
    pub cycle_data: Option<CycleContext>,
    #[serde(default, alias = "menstrualInsight")]
    pub insight: Option<Insight>,
    /// Raw history; used to compute the snapshot when `cycle_data` is absent.
    #[serde(default)]
    pub cycle_history: Vec<CycleRecord>,
    #[serde(default)]
    pub cycle_profile: Option<CycleProfile>,
    /// Defaults to whether any cycle context came with the turn.
    #[serde(default)]
    pub tracking_enabled: Option<bool>,
}

impl ChatTurnRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Cycle fields echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleContextSummary {
    pub phase: String,
    pub cycle_day: u32,
    pub days_until_next: u32,
}

/// Outbound chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    pub message: String,
    pub detected_emotion: Emotion,
    pub persona_id: PersonaId,
    pub persona_name: String,
    pub switched_persona: bool,
    pub empathy_level: u8,
    pub cycle_context: Option<CycleContextSummary>,
}

/// Cycle state resolved for one turn.
struct ResolvedCycle {
    snapshot: Option<PhaseSnapshot>,
    /// Reported even when the phase name did not parse.
    symptoms: Vec<String>,
    /// Phase name that did not parse; drives the generic guidance fallback.
    unknown_phase: Option<String>,
    summary: Option<CycleContextSummary>,
}

pub struct CompanionService {
    config: CompanionConfig,
    classifier: Box<dyn Classify>,
    router: PersonaRouter,
    advisor: CycleInsightAdvisor,
    generator: Arc<dyn TextGenerator>,
}

impl CompanionService {
    pub fn new(config: CompanionConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            config,
            classifier: Box::new(EmotionClassifier::new()),
            router: PersonaRouter::new(),
            advisor: CycleInsightAdvisor::new(),
            generator,
        }
    }

    /// Picks the generator from the configured mode: live talks to the endpoint, mock stays offline.
    pub fn from_config(config: CompanionConfig) -> Self {
        let generator: Arc<dyn TextGenerator> = if config.is_live() {
            Arc::new(ChatCompletionsGenerator::from_config(&config))
        } else {
            Arc::new(OfflineGenerator)
        };
        tracing::info!(
            target: "pantheon::companion",
            mode = config.llm_mode.as_str(),
            generator = generator.name(),
            "Companion service ready"
        );
        Self::new(config, generator)
    }

    pub fn with_classifier(mut self, classifier: impl Classify + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn advisor(&self) -> &CycleInsightAdvisor {
        &self.advisor
    }

    pub async fn respond(&self, request: ChatTurnRequest) -> CompanionResult<ChatTurnResponse> {
        self.respond_at(request, Utc::now()).await
    }

    /// Runs one turn with an explicit clock.
    pub async fn respond_at(
        &self,
        request: ChatTurnRequest,
        now: DateTime<Utc>,
    ) -> CompanionResult<ChatTurnResponse> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(CompanionError::Validation("Message is required".to_string()));
        }

        let current = request
            .current_persona_id
            .as_deref()
            .and_then(PersonaId::from_str);
        let cycle = Self::resolve_cycle(&request, now)?;
        let tracking_enabled = request
            .tracking_enabled
            .unwrap_or(cycle.summary.is_some());

        let insight = match request.insight.clone() {
            Some(supplied) => supplied,
            None => {
                let derived =
                    self.advisor
                        .analyze_relevance(message, cycle.snapshot.as_ref(), tracking_enabled);
                match (&cycle.snapshot, &cycle.unknown_phase) {
                    (None, Some(key)) if !derived.should_offer_tracking => {
                        self.advisor.guidance_for_key(key)
                    }
                    _ => derived,
                }
            }
        };

        let emotion = self.classifier.classify(message);
        let phase = cycle.snapshot.as_ref().map(|s| s.phase);
        let route = self
            .router
            .select_persona(message, current, phase, &cycle.symptoms);
        let persona = route.persona_id.persona();

        let generation = GenerationRequest {
            system_prompt: system_prompt(&persona, emotion),
            prior_turns: Self::prior_turns(&request.conversation_history, self.config.history_window),
            user_turn: compose_prompt(message, cycle.snapshot.as_ref(), &insight),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let generated = match self.generate(&generation).await {
            Ok(text) => text,
            Err(err) => {
                match err {
                    GeneratorError::Disabled => tracing::debug!(
                        target: "pantheon::generator",
                        persona = route.persona_id.as_str(),
                        "Generator offline; using fallback reply"
                    ),
                    other => tracing::warn!(
                        target: "pantheon::generator",
                        generator = self.generator.name(),
                        error = %other,
                        "Generation failed; using fallback reply"
                    ),
                }
                fallback_reply(route.persona_id, emotion).to_string()
            }
        };

        let guidance = phase
            .map(|p| self.advisor.phase_guidance(p))
            .unwrap_or_default();
        let mut reply = compose_reply(&generated, phase, &guidance);
        if self.config.insight_notes {
            reply = append_insight_notes(&reply, &insight);
        }

        tracing::info!(
            target: "pantheon::companion",
            persona = route.persona_id.as_str(),
            switched = route.switched,
            emotion = emotion.as_str(),
            phase = phase.map(|p| p.as_str()).unwrap_or("none"),
            "Turn composed"
        );

        Ok(ChatTurnResponse {
            message: reply,
            detected_emotion: emotion,
            persona_id: route.persona_id,
            persona_name: persona.name.to_string(),
            switched_persona: route.switched,
            empathy_level: persona.empathy_level,
            cycle_context: cycle.summary,
        })
    }

    /// One attempt under the configured timeout. Blank text counts as a failure.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        let limit = self.config.timeout();
        let text = tokio::time::timeout(limit, self.generator.generate(request))
            .await
            .map_err(|_| GeneratorError::Timeout(limit))??;
        let text = text.trim();
        if text.is_empty() {
            return Err(GeneratorError::EmptyReply);
        }
        Ok(text.to_string())
    }

    fn resolve_cycle(request: &ChatTurnRequest, now: DateTime<Utc>) -> CompanionResult<ResolvedCycle> {
        if let Some(data) = &request.cycle_data {
            data.validate()?;
            let snapshot = data.to_snapshot(now.date_naive());
            let summary = CycleContextSummary {
                phase: data.phase.clone(),
                cycle_day: data.cycle_day,
                days_until_next: snapshot
                    .as_ref()
                    .map(|s| s.days_until_next)
                    .or(data.days_until_next)
                    .unwrap_or(0),
            };
            let unknown_phase = snapshot.is_none().then(|| data.phase.clone());
            return Ok(ResolvedCycle {
                snapshot,
                symptoms: data.symptoms.clone(),
                unknown_phase,
                summary: Some(summary),
            });
        }

        let profile = request
            .cycle_profile
            .unwrap_or_else(|| CycleProfile::from_history(&request.cycle_history));
        if !request.cycle_history.is_empty() {
            profile.validate()?;
        }
        let snapshot = compute_phase_with_profile(&request.cycle_history, now, &profile);
        let summary = snapshot.as_ref().map(|s| CycleContextSummary {
            phase: s.phase.as_str().to_string(),
            cycle_day: s.cycle_day,
            days_until_next: s.days_until_next,
        });
        Ok(ResolvedCycle {
            symptoms: snapshot.as_ref().map(|s| s.symptoms.clone()).unwrap_or_default(),
            snapshot,
            unknown_phase: None,
            summary,
        })
    }

    fn prior_turns(history: &[Message], window: usize) -> Vec<PriorTurn> {
        let start = history.len().saturating_sub(window);
        history[start..]
            .iter()
            .map(|m| PriorTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}
