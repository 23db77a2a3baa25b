//! Integration test: full chat turns through `CompanionService` with stub generators.
//!
//! ## Scenarios
//! 1. Cramps on menstrual day 2 while talking to the strategic persona: switch to nurturing,
//!    care tips appended.
//! 2. Generator hangs past the timeout: deterministic fallback, same metadata.
//! 3. Generator errors or returns blank text: fallback.
//! 4. Symptom talk without tracking: opt-in advice reaches the prompt.
//! 5. Enriched prompt strips back to the original message.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pantheon_core::{
    fallback_reply, strip_context, ChatTurnRequest, CompanionConfig, CompanionService,
    CycleContext, CycleRecord, Emotion, GenerationRequest, GeneratorError, PersonaId,
    TextGenerator, TRACKING_OPT_IN_ADVICE,
};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Stub generators
// ---------------------------------------------------------------------------

struct Fixed {
    reply: &'static str,
    last_user_turn: Mutex<Option<String>>,
}

impl Fixed {
    fn new(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply,
            last_user_turn: Mutex::new(None),
        })
    }
}

#[async_trait]
impl TextGenerator for Fixed {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        *self.last_user_turn.lock().unwrap() = Some(request.user_turn.clone());
        Ok(self.reply.to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct Hanging;

#[async_trait]
impl TextGenerator for Hanging {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}

struct Failing(fn() -> GeneratorError);

#[async_trait]
impl TextGenerator for Failing {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        Err((self.0)())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

struct Blank;

#[async_trait]
impl TextGenerator for Blank {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        Ok("   \n".to_string())
    }

    fn name(&self) -> &'static str {
        "blank"
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cramps_request() -> ChatTurnRequest {
    let mut request = ChatTurnRequest::new("I have bad cramps today");
    request.current_persona_id = Some("strategic".to_string());
    request.cycle_data = Some(CycleContext {
        phase: "menstrual".to_string(),
        cycle_day: 2,
        days_until_next: Some(26),
        symptoms: vec!["cramps".to_string()],
        average_cycle_length: 28,
        average_period_length: 5,
        last_period_start: None,
    });
    request
}

fn short_timeout() -> CompanionConfig {
    let mut config = CompanionConfig::default();
    config.timeout_secs = 1;
    config
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cramps_on_day_two_switches_to_nurturing_with_care_tips() {
    let generator = Fixed::new("I'm so sorry you're hurting.");
    let service = CompanionService::new(CompanionConfig::default(), generator.clone());

    let response = service.respond(cramps_request()).await.unwrap();

    assert_eq!(response.persona_id, PersonaId::Nurturing);
    assert_eq!(response.persona_name, "Demeter");
    assert!(response.switched_persona);
    assert_eq!(response.empathy_level, 10);
    assert!(response.message.starts_with("I'm so sorry you're hurting."));
    assert!(response.message.contains("🌸 Gentle care tips:\n• "));
    assert!(response.message.contains("💖 Remember: Practice self-compassion"));

    let ctx = response.cycle_context.unwrap();
    assert_eq!(ctx.phase, "menstrual");
    assert_eq!(ctx.cycle_day, 2);
    assert_eq!(ctx.days_until_next, 26);

    let user_turn = generator.last_user_turn.lock().unwrap().clone().unwrap();
    assert!(user_turn.contains("[User is in menstrual phase (Day 2/28) – please be extra empathetic"));
    assert!(user_turn.contains("[Symptoms: cramps]"));
}

#[tokio::test]
async fn hanging_generator_falls_back_after_timeout() {
    let service = CompanionService::new(short_timeout(), Arc::new(Hanging));

    let response = service.respond(cramps_request()).await.unwrap();

    assert_eq!(response.persona_id, PersonaId::Nurturing);
    assert_eq!(response.detected_emotion, Emotion::Neutral);
    let canned = fallback_reply(PersonaId::Nurturing, Emotion::Neutral);
    assert!(response.message.starts_with(canned));
    assert!(response.message.contains("Gentle care tips"));
}

#[tokio::test]
async fn generator_errors_and_blank_replies_fall_back() {
    let failing: Vec<Arc<dyn TextGenerator>> = vec![
        Arc::new(Failing(|| GeneratorError::Status(503, "busy".to_string()))),
        Arc::new(Failing(|| GeneratorError::Parse("bad json".to_string()))),
        Arc::new(Blank),
    ];
    for generator in failing {
        let service = CompanionService::new(CompanionConfig::default(), generator);
        let response = service
            .respond(ChatTurnRequest::new("I feel so much stress and I'm worried"))
            .await
            .unwrap();
        assert_eq!(response.persona_id, PersonaId::Peace);
        assert_eq!(response.detected_emotion, Emotion::Anxious);
        assert_eq!(
            response.message,
            fallback_reply(PersonaId::Peace, Emotion::Anxious)
        );
    }
}

#[tokio::test]
async fn symptom_talk_without_tracking_carries_opt_in_advice() {
    let generator = Fixed::new("Let's look into it.");
    let service = CompanionService::new(CompanionConfig::default(), generator.clone());

    let mut request = ChatTurnRequest::new("my period is late again");
    request.current_persona_id = Some("strategic".to_string());
    let response = service.respond(request).await.unwrap();

    assert_eq!(response.persona_id, PersonaId::Strategic);
    assert!(!response.switched_persona);
    assert!(response.cycle_context.is_none());

    let user_turn = generator.last_user_turn.lock().unwrap().clone().unwrap();
    assert_eq!(
        user_turn,
        format!("my period is late again [Advice: {}]", TRACKING_OPT_IN_ADVICE)
    );
    assert_eq!(strip_context(&user_turn), "my period is late again");
}

#[tokio::test]
async fn computed_snapshot_round_trips_through_prompt() {
    let generator = Fixed::new("ok");
    let service = CompanionService::new(CompanionConfig::default(), generator.clone());
    let start = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
    let now = Utc.from_utc_datetime(&start.and_hms_opt(7, 30, 0).unwrap()) + Duration::days(19);

    let mut request = ChatTurnRequest::new("thinking about my family");
    request.cycle_history = vec![
        CycleRecord::new(start - Duration::days(29)),
        CycleRecord::new(start).with_symptoms(["Acne"]),
    ];
    let response = service.respond_at(request, now).await.unwrap();

    assert_eq!(response.persona_id, PersonaId::Loyalty);
    assert_eq!(response.cycle_context.as_ref().unwrap().phase, "luteal");
    assert_eq!(response.message, "ok");

    let user_turn = generator.last_user_turn.lock().unwrap().clone().unwrap();
    assert!(user_turn.contains("[User is in luteal phase (Day 20/28)"));
    assert!(user_turn.contains("[Symptoms: Acne]"));
    assert_eq!(strip_context(&user_turn), "thinking about my family");
}
